//! Streaming DICOM header decoder.
//!
//! This crate turns the raw bytes of one DICOM file into a
//! [`FileRecord`]: a tag-ordered mapping of decoded data elements plus
//! the transfer syntax used to decode them. It handles explicit and
//! implicit VR, both byte orders, nested sequences (with a bounded
//! recursion depth), and two levels of tolerance towards malformed
//! input, selected through [`DecodeOptions`]:
//!
//! - in [`Mode::Strict`] (the default), structural problems and
//!   truncated input fail the file;
//! - in [`Mode::BestEffort`], truncated input yields a partial record
//!   with its truncation flag set, and files without the `DICM` marker
//!   can be salvaged through the `headerless` fallback scan.
//!
//! Decoding one file has no side effects and shares no mutable state,
//! so files may be decoded concurrently without coordination.

pub mod dataset;
pub mod error;
pub mod meta;
pub mod transfer_syntax;

use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmsort_core::{FileRecord, VR};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub use crate::error::{DecodeError, ErrorKind, Result};
pub use crate::transfer_syntax::TransferSyntax;

use crate::dataset::DataSetReader;
use crate::error::{ReadFileSnafu, UnrecognizedStartSnafu, UnsupportedTransferSyntaxSnafu};

/// How much tolerance the decoder has towards malformed input.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Fail the file on any structural problem or truncation.
    #[default]
    Strict,
    /// Return a partially populated record (with its truncation flag
    /// set) when the input ends before the data set does.
    BestEffort,
}

/// Options controlling the decoding of one file.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Strict or best-effort handling of defective input.
    pub mode: Mode,
    /// Attempt an offset-0 heuristic scan when the `DICM` marker is
    /// absent, for legacy files emitted without a preamble.
    pub headerless: bool,
    /// Ceiling on sequence nesting depth.
    pub max_depth: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            mode: Mode::Strict,
            headerless: false,
            max_depth: 16,
        }
    }
}

/// Decode the header of one DICOM file given in memory.
///
/// `source` is the originating path, recorded verbatim in the
/// resulting record; no filesystem access happens here.
pub fn decode_bytes(
    data: &[u8],
    source: impl AsRef<Path>,
    options: &DecodeOptions,
) -> Result<FileRecord> {
    let (mut body, transfer_syntax, start) = match meta::read_file_meta(data) {
        Ok(meta) => {
            let start = meta.data_set_start;
            (meta.elements, meta.transfer_syntax, start)
        }
        Err(DecodeError::MissingMagic) if options.headerless => {
            let uid = sniff_headerless(data)?;
            debug!(
                "no DICM marker in {}; headerless scan guessed {}",
                source.as_ref().display(),
                uid
            );
            (BTreeMap::new(), uid.to_string(), 0)
        }
        Err(e) => return Err(e),
    };

    let ts = TransferSyntax::from_uid(&transfer_syntax)
        .context(UnsupportedTransferSyntaxSnafu {
            uid: transfer_syntax.clone(),
        })?;

    let mut reader = DataSetReader::new(&data[start..], ts, options.max_depth);
    let mut truncated = false;
    loop {
        match reader.next_element() {
            Ok(Some((tag, value))) => {
                // group lengths are decoded for framing but carry no
                // metadata of their own
                if !tag.is_group_length() {
                    body.insert(tag, value);
                }
            }
            Ok(None) => break,
            Err(e) if options.mode == Mode::BestEffort && e.kind() == ErrorKind::Truncation => {
                warn!(
                    "truncated data set in {}: {}",
                    source.as_ref().display(),
                    e
                );
                truncated = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(FileRecord::new(
        source.as_ref(),
        transfer_syntax,
        body,
        truncated,
    ))
}

/// Read and decode the header of one DICOM file from the filesystem.
pub fn decode_file(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<FileRecord> {
    let path = path.as_ref();
    let data = std::fs::read(path).context(ReadFileSnafu { path })?;
    decode_bytes(&data, path, options)
}

/// Guess the transfer syntax of a file without preamble and magic code.
///
/// The first four bytes must look like the tag of an early data element
/// (a small, standard group number); the two bytes after them decide
/// between explicit VR (a valid VR code) and implicit VR (a plausible
/// 32-bit length).
fn sniff_headerless(data: &[u8]) -> Result<&'static str> {
    ensure!(data.len() >= 8, UnrecognizedStartSnafu);
    let group = LittleEndian::read_u16(&data[0..2]);
    ensure!(
        matches!(group, 0x0002 | 0x0008 | 0x0010 | 0x0018 | 0x0020),
        UnrecognizedStartSnafu
    );
    if VR::from_binary([data[4], data[5]]).is_some() {
        return Ok(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
    }
    let len = LittleEndian::read_u32(&data[4..8]) as usize;
    if len == 0xFFFF_FFFF || len <= data.len() - 8 {
        return Ok(transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN);
    }
    UnrecognizedStartSnafu.fail()
}

/// Convenience check used by directory walkers: whether the input
/// starts like something this decoder could read at all.
pub fn looks_like_dicom(data: &[u8], headerless: bool) -> bool {
    (data.len() >= 132 && data[128..132] == meta::DICM_MAGIC_CODE)
        || (headerless && sniff_headerless(data).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmsort_core::{tags, Tag, TagValue};

    /// Append one explicit-LE element with a short length field.
    fn put_short(data: &mut Vec<u8>, tag: Tag, vr: &[u8; 2], value: &[u8]) {
        assert!(value.len() % 2 == 0, "test value must be even-length");
        data.extend_from_slice(&tag.group().to_le_bytes());
        data.extend_from_slice(&tag.element().to_le_bytes());
        data.extend_from_slice(vr);
        data.extend_from_slice(&(value.len() as u16).to_le_bytes());
        data.extend_from_slice(value);
    }

    /// A file meta group declaring the given transfer syntax,
    /// preceded by preamble and magic code.
    fn file_head(ts_uid: &str) -> Vec<u8> {
        let mut uid = ts_uid.as_bytes().to_vec();
        if uid.len() % 2 == 1 {
            uid.push(0);
        }
        let mut meta = Vec::new();
        put_short(&mut meta, tags::TRANSFER_SYNTAX_UID, b"UI", &uid);

        let mut data = vec![0u8; 128];
        data.extend_from_slice(b"DICM");
        put_short(
            &mut data,
            tags::FILE_META_INFORMATION_GROUP_LENGTH,
            b"UL",
            &(meta.len() as u32).to_le_bytes(),
        );
        data.extend_from_slice(&meta);
        data
    }

    #[test]
    fn decodes_explicit_le_data_set() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        put_short(&mut data, tags::MODALITY, b"CS", b"MR");
        put_short(&mut data, tags::SERIES_NUMBER, b"IS", b"5 ");
        put_short(&mut data, tags::INSTANCE_NUMBER, b"IS", b"12");

        let record = decode_bytes(&data, "/tmp/a.dcm", &DecodeOptions::default()).unwrap();
        assert_eq!(record.transfer_syntax(), "1.2.840.10008.1.2.1");
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
        assert_eq!(record.int_value(tags::SERIES_NUMBER), Some(5));
        assert_eq!(record.int_value(tags::INSTANCE_NUMBER), Some(12));
        assert!(!record.is_truncated());
    }

    #[test]
    fn decodes_implicit_le_data_set() {
        let mut data = file_head(transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN);
        // (0008,0060) Modality, 32-bit length, VR from the registry
        data.extend_from_slice(&[0x08, 0x00, 0x60, 0x00, 0x02, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"MR");
        // (0028,0010) Rows = 256, binary US resolved via the registry
        data.extend_from_slice(&[0x28, 0x00, 0x10, 0x00, 0x02, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&256u16.to_le_bytes());

        let record = decode_bytes(&data, "/tmp/b.dcm", &DecodeOptions::default()).unwrap();
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
        assert_eq!(record.int_value(tags::ROWS), Some(256));
    }

    #[test]
    fn decodes_explicit_big_endian_numerics() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_BIG_ENDIAN);
        // (0028,0010) Rows = 256, big endian from here on
        data.extend_from_slice(&[0x00, 0x28, 0x00, 0x10]);
        data.extend_from_slice(b"US");
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&256u16.to_be_bytes());

        let record = decode_bytes(&data, "/tmp/c.dcm", &DecodeOptions::default()).unwrap();
        assert_eq!(record.int_value(tags::ROWS), Some(256));
    }

    #[test]
    fn undefined_length_sequence_round_trip() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        // (0008,1140) SQ, undefined length
        data.extend_from_slice(&[0x08, 0x00, 0x40, 0x11]);
        data.extend_from_slice(b"SQ");
        data.extend_from_slice(&[0x00, 0x00]); // reserved
        data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        for uid in [b"1.2.3.11", b"1.2.3.12"] {
            // item, undefined length, ended by an item delimiter
            data.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
            data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
            put_short(&mut data, tags::SOP_INSTANCE_UID, b"UI", uid);
            data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);
        }
        // sequence delimiter
        data.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let record = decode_bytes(&data, "/tmp/d.dcm", &DecodeOptions::default()).unwrap();
        let items = record.items(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0][&tags::SOP_INSTANCE_UID].value(),
            &TagValue::Str("1.2.3.11".into())
        );
        assert_eq!(
            items[1][&tags::SOP_INSTANCE_UID].value(),
            &TagValue::Str("1.2.3.12".into())
        );
        // the element remembers it was read with an undefined length
        assert!(record
            .element(tags::REFERENCED_IMAGE_SEQUENCE)
            .unwrap()
            .length()
            .is_undefined());
        assert_eq!(
            record.element(tags::REFERENCED_IMAGE_SEQUENCE).unwrap().vr(),
            VR::SQ
        );
    }

    #[test]
    fn defined_length_sequence() {
        let mut item_body = Vec::new();
        put_short(&mut item_body, tags::SOP_INSTANCE_UID, b"UI", b"1.2.3.21");

        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        data.extend_from_slice(&[0x08, 0x00, 0x40, 0x11]);
        data.extend_from_slice(b"SQ");
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&((item_body.len() + 8) as u32).to_le_bytes());
        data.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
        data.extend_from_slice(&(item_body.len() as u32).to_le_bytes());
        data.extend_from_slice(&item_body);

        let record = decode_bytes(&data, "/tmp/e.dcm", &DecodeOptions::default()).unwrap();
        let items = record.items(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn nesting_ceiling_is_enforced() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        // open 4 levels of undefined-length sequence + item, never closing
        for _ in 0..4 {
            data.extend_from_slice(&[0x08, 0x00, 0x40, 0x11]);
            data.extend_from_slice(b"SQ");
            data.extend_from_slice(&[0x00, 0x00]);
            data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
            data.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
            data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        }

        let options = DecodeOptions {
            max_depth: 3,
            ..DecodeOptions::default()
        };
        let err = decode_bytes(&data, "/tmp/f.dcm", &options).unwrap_err();
        assert!(matches!(err, DecodeError::NestingTooDeep { limit: 3 }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn truncation_strict_vs_best_effort() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        put_short(&mut data, tags::MODALITY, b"CS", b"MR");
        // (0020,000E) declares 26 bytes but the file ends after 4
        data.extend_from_slice(&[0x20, 0x00, 0x0E, 0x00]);
        data.extend_from_slice(b"UI");
        data.extend_from_slice(&26u16.to_le_bytes());
        data.extend_from_slice(b"1.2.");

        let err = decode_bytes(&data, "/tmp/g.dcm", &DecodeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncation);

        let options = DecodeOptions {
            mode: Mode::BestEffort,
            ..DecodeOptions::default()
        };
        let record = decode_bytes(&data, "/tmp/g.dcm", &options).unwrap();
        assert!(record.is_truncated());
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
        assert_eq!(record.str_value(tags::SERIES_INSTANCE_UID), None);
    }

    #[test]
    fn headerless_file_strict_fails_best_effort_scans() {
        // no preamble, no magic: data set starts right away
        let mut data = Vec::new();
        put_short(&mut data, tags::MODALITY, b"CS", b"MR");
        put_short(&mut data, tags::SERIES_INSTANCE_UID, b"UI", b"1.2.3.31\0\0");

        let err = decode_bytes(&data, "/tmp/h.dcm", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingMagic));
        assert_eq!(err.kind(), ErrorKind::Format);

        let options = DecodeOptions {
            headerless: true,
            ..DecodeOptions::default()
        };
        let record = decode_bytes(&data, "/tmp/h.dcm", &options).unwrap();
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
        assert_eq!(record.str_value(tags::SERIES_INSTANCE_UID), Some("1.2.3.31"));
    }

    #[test]
    fn headerless_implicit_scan() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x08, 0x00, 0x60, 0x00, 0x02, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"MR");

        let options = DecodeOptions {
            headerless: true,
            ..DecodeOptions::default()
        };
        let record = decode_bytes(&data, "/tmp/i.dcm", &options).unwrap();
        assert_eq!(record.transfer_syntax(), transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN);
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
    }

    #[test]
    fn garbage_is_rejected_even_with_headerless() {
        let data = [0xDEu8, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33];
        let options = DecodeOptions {
            headerless: true,
            ..DecodeOptions::default()
        };
        let err = decode_bytes(&data, "/tmp/j.dcm", &options).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedStart));
    }

    #[test]
    fn group_lengths_are_skipped_from_the_body() {
        let mut data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        put_short(
            &mut data,
            Tag(0x0008, 0x0000),
            b"UL",
            &10u32.to_le_bytes(),
        );
        put_short(&mut data, tags::MODALITY, b"CS", b"MR");

        let record = decode_bytes(&data, "/tmp/k.dcm", &DecodeOptions::default()).unwrap();
        assert!(record.element(Tag(0x0008, 0x0000)).is_none());
        assert_eq!(record.str_value(tags::MODALITY), Some("MR"));
    }

    #[test]
    fn looks_like_dicom_probe() {
        let data = file_head(transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN);
        assert!(looks_like_dicom(&data, false));
        assert!(!looks_like_dicom(b"not dicom at all", true));
    }
}
