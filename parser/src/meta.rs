//! Reader of the DICOM file meta group.
//!
//! The file meta group is always encoded in explicit VR little endian,
//! regardless of the transfer syntax it declares for the rest of the
//! file. Its group length element bounds the group, and its transfer
//! syntax UID element tells the decoder how to read everything after it.

use byteordered::Endianness;
use dcmsort_core::{tags, DataValue, Tag};
use snafu::ensure;
use std::collections::BTreeMap;

use crate::dataset::DataSetReader;
use crate::error::{
    MissingMagicSnafu, MissingTransferSyntaxSnafu, Result, UnexpectedMetaTagSnafu,
};
use crate::transfer_syntax::TransferSyntax;

/// The magic code expected after the 128-byte preamble.
pub const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

/// Offset of the first file meta element: preamble plus magic code.
const META_START: usize = 132;

/// Sequence nesting limit while reading the meta group.
/// Meta elements are all primitive, so any nesting at all is suspect.
const META_MAX_DEPTH: u32 = 1;

/// The decoded file meta group.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    /// The meta group's data elements (sans group length).
    pub elements: BTreeMap<Tag, DataValue>,
    /// The declared transfer syntax UID, already depadded.
    pub transfer_syntax: String,
    /// Offset into the input where the data set proper begins.
    pub data_set_start: usize,
}

/// Check for the 128-byte preamble and `DICM` magic code and decode
/// the file meta group that follows.
pub fn read_file_meta(data: &[u8]) -> Result<FileMeta> {
    ensure!(
        data.len() >= META_START && data[128..META_START] == DICM_MAGIC_CODE,
        MissingMagicSnafu
    );

    let meta_ts = TransferSyntax {
        explicit_vr: true,
        endianness: Endianness::Little,
    };
    let mut reader = DataSetReader::new(&data[META_START..], meta_ts, META_MAX_DEPTH);

    // the group length element must come first; it bounds the group
    let (tag, value) = match reader.next_element()? {
        Some(element) => element,
        None => return MissingTransferSyntaxSnafu.fail(),
    };
    ensure!(
        tag == tags::FILE_META_INFORMATION_GROUP_LENGTH,
        UnexpectedMetaTagSnafu { tag }
    );
    let group_len = value.value().to_int().unwrap_or(0) as usize;
    let end = reader.position() + group_len;

    let mut elements = BTreeMap::new();
    while reader.position() < end {
        match reader.next_element()? {
            Some((tag, value)) => {
                ensure!(tag.group() == 0x0002, UnexpectedMetaTagSnafu { tag });
                elements.insert(tag, value);
            }
            None => break,
        }
    }

    let transfer_syntax = elements
        .get(&tags::TRANSFER_SYNTAX_UID)
        .and_then(|v| v.value().to_str())
        .map(|uid| uid.trim_end_matches(['\0', ' ']).to_string())
        .filter(|uid| !uid.is_empty());
    let transfer_syntax = match transfer_syntax {
        Some(uid) => uid,
        None => return MissingTransferSyntaxSnafu.fail(),
    };

    Ok(FileMeta {
        elements,
        transfer_syntax,
        data_set_start: META_START + reader.position(),
    })
}
