//! Decoded value types for DICOM data elements.
//!
//! A value is represented as a tagged variant over the kinds of data
//! the header decoder can produce: character data, integers, floating
//! point numbers, opaque byte blobs, and nested item sequences. Each
//! decoded value also remembers the VR and byte length it was read with.

use crate::header::{Length, Tag, VR};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Type alias for a small vector of multi-valued element components.
pub type C<T> = SmallVec<[T; 2]>;

/// One item of a sequence value: a nested, tag-ordered element mapping.
pub type Item = BTreeMap<Tag, DataValue>;

/// A tagged decoded value.
///
/// Multi-valued string and numeric elements (value multiplicity above 1)
/// use the plural variants; single values keep the scalar ones so that
/// the common case stays allocation-light.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// No value (zero-length element).
    Empty,
    /// A single string value.
    Str(String),
    /// A sequence of string values.
    Strs(C<String>),
    /// A single signed integer.
    Int(i64),
    /// A sequence of signed integers.
    Ints(C<i64>),
    /// A single double-precision float.
    F64(f64),
    /// A sequence of double-precision floats.
    F64s(C<f64>),
    /// An opaque binary blob, kept verbatim.
    Bytes(Vec<u8>),
    /// A nested sequence of items (VR SQ).
    Seq(Vec<Item>),
}

impl TagValue {
    /// The number of individual values contained.
    pub fn multiplicity(&self) -> usize {
        match self {
            TagValue::Empty => 0,
            TagValue::Str(_) | TagValue::Int(_) | TagValue::F64(_) => 1,
            TagValue::Strs(v) => v.len(),
            TagValue::Ints(v) => v.len(),
            TagValue::F64s(v) => v.len(),
            TagValue::Bytes(_) => 1,
            TagValue::Seq(items) => items.len(),
        }
    }

    /// Get the first value as a string slice, if this is a string value.
    pub fn to_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s),
            TagValue::Strs(v) => v.first().map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Get the first value as a signed integer, if one can be read.
    ///
    /// Integer-string values (VR IS) decode to the integer variants
    /// upstream, so no string parsing happens here.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(v) => Some(*v),
            TagValue::Ints(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Get the first value as a double-precision float, if one can be read.
    /// Integer values widen losslessly.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            TagValue::F64(v) => Some(*v),
            TagValue::F64s(v) => v.first().copied(),
            TagValue::Int(v) => Some(*v as f64),
            TagValue::Ints(v) => v.first().map(|v| *v as f64),
            _ => None,
        }
    }

    /// Get the nested items, if this is a sequence value.
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            TagValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagValue::Empty => Ok(()),
            TagValue::Str(s) => f.write_str(s),
            TagValue::Strs(v) => f.write_str(&v.join("\\")),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Ints(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join("\\"))
            }
            TagValue::F64(v) => write!(f, "{}", v),
            TagValue::F64s(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join("\\"))
            }
            TagValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            TagValue::Seq(items) => write!(f, "<sequence of {} items>", items.len()),
        }
    }
}

/// A fully decoded data element value, carrying the value representation
/// and byte length it was read with.
#[derive(Debug, Clone, PartialEq)]
pub struct DataValue {
    vr: VR,
    len: Length,
    value: TagValue,
}

impl DataValue {
    /// Create a new decoded value from its parts.
    #[inline]
    pub fn new(vr: VR, len: Length, value: TagValue) -> Self {
        DataValue { vr, len, value }
    }

    /// The value representation the element was decoded with.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The byte length declared by the element header.
    #[inline]
    pub fn length(&self) -> Length {
        self.len
    }

    /// The decoded value.
    #[inline]
    pub fn value(&self) -> &TagValue {
        &self.value
    }

    /// Take the decoded value, discarding VR and length.
    #[inline]
    pub fn into_value(self) -> TagValue {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn scalar_accessors() {
        let v = TagValue::Str("HEAD^3T".to_string());
        assert_eq!(v.to_str(), Some("HEAD^3T"));
        assert_eq!(v.to_int(), None);
        assert_eq!(v.multiplicity(), 1);

        let v = TagValue::Int(42);
        assert_eq!(v.to_int(), Some(42));
        assert_eq!(v.to_f64(), Some(42.0));
    }

    #[test]
    fn multi_valued_accessors() {
        let v = TagValue::Ints(smallvec![3, 5]);
        assert_eq!(v.to_int(), Some(3));
        assert_eq!(v.multiplicity(), 2);
        assert_eq!(v.to_string(), "3\\5");
    }

    #[test]
    fn sequence_accessor() {
        let mut item = Item::new();
        item.insert(
            Tag(0x0008, 0x0060),
            DataValue::new(VR::CS, Length::defined(2), TagValue::Str("MR".into())),
        );
        let v = TagValue::Seq(vec![item.clone(), item]);
        assert_eq!(v.items().map(|i| i.len()), Some(2));
        assert_eq!(v.multiplicity(), 2);
    }
}
