//! The data set reader: a streaming decoder of DICOM data elements
//! over an in-memory byte slice.
//!
//! The reader is parameterized by the transfer syntax's byte order and
//! VR mode, resolves implicit VRs through the tag registry, and parses
//! nested sequences recursively with a bounded depth so that malformed
//! or adversarial nesting surfaces as a format error instead of
//! uncontrolled stack growth.

use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use dcmsort_core::header::{ITEM, ITEM_DELIMITER, SEQUENCE_DELIMITER};
use dcmsort_core::value::{C, Item};
use dcmsort_core::{dictionary, DataElementHeader, DataValue, Length, Tag, TagValue, VR};
use snafu::ensure;
use tracing::warn;

use crate::error::{
    BadValueRepresentationSnafu, NestingTooDeepSnafu, PrematureEndSnafu, Result,
    SequenceEndMismatchSnafu, UnexpectedItemTagSnafu,
};
use crate::transfer_syntax::TransferSyntax;

/// A streaming reader of data elements over a byte slice.
#[derive(Debug)]
pub struct DataSetReader<'a> {
    data: &'a [u8],
    pos: usize,
    explicit_vr: bool,
    endianness: Endianness,
    max_depth: u32,
}

impl<'a> DataSetReader<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8], ts: TransferSyntax, max_depth: u32) -> Self {
        DataSetReader {
            data,
            pos: 0,
            explicit_vr: ts.explicit_vr,
            endianness: ts.endianness,
            max_depth,
        }
    }

    /// The number of bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The current read position, in bytes from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume and return the next `n` bytes,
    /// or fail with a truncation error.
    fn need(&mut self, n: usize) -> Result<&'a [u8]> {
        ensure!(
            n <= self.remaining(),
            PrematureEndSnafu {
                needed: n,
                remaining: self.remaining(),
            }
        );
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.need(2)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.need(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag(group, element))
    }

    /// Decode the tag at the current position without consuming it.
    fn peek_tag(&self) -> Result<Tag> {
        ensure!(
            self.remaining() >= 4,
            PrematureEndSnafu {
                needed: 4_usize,
                remaining: self.remaining(),
            }
        );
        let bytes = &self.data[self.pos..self.pos + 4];
        let (group, element) = match self.endianness {
            Endianness::Little => (
                LittleEndian::read_u16(&bytes[0..2]),
                LittleEndian::read_u16(&bytes[2..4]),
            ),
            Endianness::Big => (
                BigEndian::read_u16(&bytes[0..2]),
                BigEndian::read_u16(&bytes[2..4]),
            ),
        };
        Ok(Tag(group, element))
    }

    /// Read the next data element header: tag, VR, and value length.
    ///
    /// In explicit VR mode the VR code comes from the stream and decides
    /// the width of the length field; in implicit mode the VR is resolved
    /// through the tag registry (unknown tags become UN) and the length
    /// is always 32 bits wide.
    pub fn read_header(&mut self) -> Result<DataElementHeader> {
        let tag = self.read_tag()?;
        ensure!(tag.group() != 0xFFFE, UnexpectedItemTagSnafu { tag });

        if !self.explicit_vr {
            let vr = dictionary::lookup(tag).map(|e| e.vr).unwrap_or(VR::UN);
            let len = self.read_u32()?;
            return Ok(DataElementHeader::new(tag, vr, Length(len)));
        }

        let vr_bytes = self.need(2)?;
        let code = [vr_bytes[0], vr_bytes[1]];
        let vr = match VR::from_binary(code) {
            Some(vr) => vr,
            None if code.iter().all(u8::is_ascii_uppercase) => {
                // an alphabetic code this library does not know:
                // assume a future VR with the long length form
                warn!("unknown VR code {:?} for {}, assuming UN", code, tag);
                VR::UN
            }
            None => return BadValueRepresentationSnafu { tag, code }.fail(),
        };

        let len = if vr.has_short_length() {
            u32::from(self.read_u16()?)
        } else {
            // 2 reserved bytes, then a 32-bit length
            self.need(2)?;
            self.read_u32()?
        };
        Ok(DataElementHeader::new(tag, vr, Length(len)))
    }

    /// Read an item or delimiter header (tag + 32-bit length).
    fn read_item_header(&mut self) -> Result<(Tag, Length)> {
        let tag = self.read_tag()?;
        let len = self.read_u32()?;
        Ok((tag, Length(len)))
    }

    /// Read the next data element, if any input remains.
    pub fn next_element(&mut self) -> Result<Option<(Tag, DataValue)>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        self.read_element(0).map(Some)
    }

    fn read_element(&mut self, depth: u32) -> Result<(Tag, DataValue)> {
        let header = self.read_header()?;
        let value = if header.is_sequence() {
            let items = self.read_items(header.len, depth + 1)?;
            DataValue::new(VR::SQ, header.len, TagValue::Seq(items))
        } else if header.vr == VR::UN && header.len.is_undefined() {
            // an unknown attribute with undefined length must be an
            // item sequence (PS3.5 6.2.2); parse it as one
            let items = self.read_items(header.len, depth + 1)?;
            DataValue::new(VR::UN, header.len, TagValue::Seq(items))
        } else if header.len.is_undefined() {
            // undefined length outside SQ: an encapsulated value
            // (item-framed fragments); keep the raw bytes together
            let bytes = self.read_fragments(depth + 1)?;
            DataValue::new(header.vr, header.len, TagValue::Bytes(bytes))
        } else {
            let len = header.len.0 as usize;
            let bytes = self.need(len)?;
            let value = decode_primitive(header.vr, bytes, self.endianness);
            DataValue::new(header.vr, header.len, value)
        };
        Ok((header.tag, value))
    }

    /// Read the items of a sequence value.
    fn read_items(&mut self, len: Length, depth: u32) -> Result<Vec<Item>> {
        ensure!(
            depth <= self.max_depth,
            NestingTooDeepSnafu {
                limit: self.max_depth,
            }
        );
        let mut items = Vec::new();
        if len.is_undefined() {
            loop {
                let (tag, item_len) = self.read_item_header()?;
                match tag {
                    SEQUENCE_DELIMITER => break,
                    ITEM => items.push(self.read_item(item_len, depth)?),
                    tag => return UnexpectedItemTagSnafu { tag }.fail(),
                }
            }
        } else {
            let end = self.pos + len.0 as usize;
            ensure!(
                end <= self.data.len(),
                PrematureEndSnafu {
                    needed: len.0 as usize,
                    remaining: self.remaining(),
                }
            );
            while self.pos < end {
                let (tag, item_len) = self.read_item_header()?;
                ensure!(tag == ITEM, UnexpectedItemTagSnafu { tag });
                items.push(self.read_item(item_len, depth)?);
            }
            ensure!(
                self.pos == end,
                SequenceEndMismatchSnafu {
                    expected: end,
                    actual: self.pos,
                }
            );
        }
        Ok(items)
    }

    /// Read one sequence item: a nested element mapping.
    fn read_item(&mut self, len: Length, depth: u32) -> Result<Item> {
        let mut item = Item::new();
        if len.is_undefined() {
            loop {
                if self.peek_tag()? == ITEM_DELIMITER {
                    // consume the delimiter header
                    self.read_item_header()?;
                    break;
                }
                let (tag, value) = self.read_element(depth)?;
                item.insert(tag, value);
            }
        } else {
            let end = self.pos + len.0 as usize;
            ensure!(
                end <= self.data.len(),
                PrematureEndSnafu {
                    needed: len.0 as usize,
                    remaining: self.remaining(),
                }
            );
            while self.pos < end {
                let (tag, value) = self.read_element(depth)?;
                item.insert(tag, value);
            }
            ensure!(
                self.pos == end,
                SequenceEndMismatchSnafu {
                    expected: end,
                    actual: self.pos,
                }
            );
        }
        Ok(item)
    }

    /// Read the item-framed fragments of an undefined-length binary value
    /// and return their bytes, concatenated.
    fn read_fragments(&mut self, depth: u32) -> Result<Vec<u8>> {
        ensure!(
            depth <= self.max_depth,
            NestingTooDeepSnafu {
                limit: self.max_depth,
            }
        );
        let mut bytes = Vec::new();
        loop {
            let (tag, len) = self.read_item_header()?;
            match tag {
                SEQUENCE_DELIMITER => break,
                ITEM if len.is_defined() => {
                    bytes.extend_from_slice(self.need(len.0 as usize)?);
                }
                tag => return UnexpectedItemTagSnafu { tag }.fail(),
            }
        }
        Ok(bytes)
    }
}

/// Decode the value bytes of a non-sequence element
/// according to its VR and the active byte order.
///
/// String VRs are trimmed of trailing space/NUL padding and split on
/// the `\` multiplicity separator; the numeric string VRs (IS, DS)
/// additionally parse into integers and floats. Binary bulk VRs stay
/// opaque byte blobs.
pub fn decode_primitive(vr: VR, bytes: &[u8], endianness: Endianness) -> TagValue {
    if bytes.is_empty() {
        return TagValue::Empty;
    }
    match vr {
        VR::IS => decode_int_strings(bytes),
        VR::DS => decode_decimal_strings(bytes),
        _ if vr.is_string() => decode_strings(bytes),
        VR::US => decode_ints(bytes, 2, |b| match endianness {
            Endianness::Little => i64::from(LittleEndian::read_u16(b)),
            Endianness::Big => i64::from(BigEndian::read_u16(b)),
        }),
        VR::SS => decode_ints(bytes, 2, |b| match endianness {
            Endianness::Little => i64::from(LittleEndian::read_i16(b)),
            Endianness::Big => i64::from(BigEndian::read_i16(b)),
        }),
        VR::UL => decode_ints(bytes, 4, |b| match endianness {
            Endianness::Little => i64::from(LittleEndian::read_u32(b)),
            Endianness::Big => i64::from(BigEndian::read_u32(b)),
        }),
        VR::SL => decode_ints(bytes, 4, |b| match endianness {
            Endianness::Little => i64::from(LittleEndian::read_i32(b)),
            Endianness::Big => i64::from(BigEndian::read_i32(b)),
        }),
        VR::SV => decode_ints(bytes, 8, |b| match endianness {
            Endianness::Little => LittleEndian::read_i64(b),
            Endianness::Big => BigEndian::read_i64(b),
        }),
        VR::UV => decode_ints(bytes, 8, |b| match endianness {
            Endianness::Little => LittleEndian::read_u64(b) as i64,
            Endianness::Big => BigEndian::read_u64(b) as i64,
        }),
        VR::FL => decode_floats(bytes, 4, |b| match endianness {
            Endianness::Little => f64::from(LittleEndian::read_f32(b)),
            Endianness::Big => f64::from(BigEndian::read_f32(b)),
        }),
        VR::FD => decode_floats(bytes, 8, |b| match endianness {
            Endianness::Little => LittleEndian::read_f64(b),
            Endianness::Big => BigEndian::read_f64(b),
        }),
        // attribute tags and binary bulk data stay opaque
        _ => TagValue::Bytes(bytes.to_vec()),
    }
}

fn split_components(bytes: &[u8]) -> impl Iterator<Item = &str> {
    // header text is expected to be ASCII/Latin-1; decode lossily and
    // strip the even-length padding the format requires
    let text: &str = std::str::from_utf8(bytes).unwrap_or("");
    text.split('\\').map(|s| s.trim_end_matches([' ', '\0']))
}

fn decode_strings(bytes: &[u8]) -> TagValue {
    let text = String::from_utf8_lossy(bytes);
    let components: C<String> = text
        .split('\\')
        .map(|s| s.trim_end_matches([' ', '\0']).to_string())
        .collect();
    match components.len() {
        1 => {
            let mut components = components;
            TagValue::Str(components.remove(0))
        }
        _ => TagValue::Strs(components),
    }
}

fn decode_int_strings(bytes: &[u8]) -> TagValue {
    let parsed: Option<C<i64>> = split_components(bytes)
        .map(|s| s.trim().parse::<i64>().ok())
        .collect();
    match parsed {
        Some(values) if values.len() == 1 => TagValue::Int(values[0]),
        Some(values) => TagValue::Ints(values),
        // unparseable integer strings stay verbatim
        None => decode_strings(bytes),
    }
}

fn decode_decimal_strings(bytes: &[u8]) -> TagValue {
    let parsed: Option<C<f64>> = split_components(bytes)
        .map(|s| s.trim().parse::<f64>().ok())
        .collect();
    match parsed {
        Some(values) if values.len() == 1 => TagValue::F64(values[0]),
        Some(values) => TagValue::F64s(values),
        None => decode_strings(bytes),
    }
}

fn decode_ints(bytes: &[u8], width: usize, read: impl Fn(&[u8]) -> i64) -> TagValue {
    let values: C<i64> = bytes.chunks_exact(width).map(read).collect();
    match values.len() {
        1 => TagValue::Int(values[0]),
        _ => TagValue::Ints(values),
    }
}

fn decode_floats(bytes: &[u8], width: usize, read: impl Fn(&[u8]) -> f64) -> TagValue {
    let values: C<f64> = bytes.chunks_exact(width).map(read).collect();
    match values.len() {
        1 => TagValue::F64(values[0]),
        _ => TagValue::F64s(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_padding_is_trimmed() {
        assert_eq!(
            decode_primitive(VR::CS, b"MR ", Endianness::Little),
            TagValue::Str("MR".into())
        );
        assert_eq!(
            decode_primitive(VR::UI, b"1.2.3\0", Endianness::Little),
            TagValue::Str("1.2.3".into())
        );
    }

    #[test]
    fn multi_valued_strings_split_on_backslash() {
        let value = decode_primitive(VR::CS, b"ORIGINAL\\PRIMARY\\M ", Endianness::Little);
        match value {
            TagValue::Strs(v) => {
                assert_eq!(v.as_slice(), ["ORIGINAL", "PRIMARY", "M"]);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn integer_and_decimal_strings_parse() {
        assert_eq!(
            decode_primitive(VR::IS, b"17 ", Endianness::Little),
            TagValue::Int(17)
        );
        assert_eq!(
            decode_primitive(VR::DS, b"-12.50", Endianness::Little),
            TagValue::F64(-12.5)
        );
        // a malformed integer string survives as text
        assert_eq!(
            decode_primitive(VR::IS, b"N/A ", Endianness::Little),
            TagValue::Str("N/A".into())
        );
    }

    #[test]
    fn binary_integers_respect_endianness() {
        assert_eq!(
            decode_primitive(VR::US, &[0x01, 0x02], Endianness::Little),
            TagValue::Int(0x0201)
        );
        assert_eq!(
            decode_primitive(VR::US, &[0x01, 0x02], Endianness::Big),
            TagValue::Int(0x0102)
        );
        assert_eq!(
            decode_primitive(VR::UL, &[1, 0, 0, 0, 2, 0, 0, 0], Endianness::Little),
            TagValue::Ints(smallvec::smallvec![1, 2])
        );
    }

    #[test]
    fn floats_decode() {
        assert_eq!(
            decode_primitive(VR::FD, &3.25_f64.to_le_bytes(), Endianness::Little),
            TagValue::F64(3.25)
        );
        assert_eq!(
            decode_primitive(VR::FL, &3.5_f32.to_be_bytes(), Endianness::Big),
            TagValue::F64(3.5)
        );
    }

    #[test]
    fn bulk_data_stays_opaque() {
        assert_eq!(
            decode_primitive(VR::OB, &[1, 2, 3, 4], Endianness::Little),
            TagValue::Bytes(vec![1, 2, 3, 4])
        );
    }

    #[test]
    fn empty_value() {
        assert_eq!(
            decode_primitive(VR::LO, b"", Endianness::Little),
            TagValue::Empty
        );
    }
}
