//! The in-memory result of decoding one DICOM file's header.

use crate::header::Tag;
use crate::value::{DataValue, Item, TagValue};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One decoded DICOM file: a tag-ordered mapping of data elements,
/// the path of the originating file, and the transfer syntax UID
/// the data set was decoded with.
///
/// A record is immutable once produced by the decoder. When decoding
/// in best-effort mode, `truncated` reports that the source ended
/// before the data set did and the record holds only the elements
/// read up to that point.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    path: PathBuf,
    transfer_syntax: String,
    body: BTreeMap<Tag, DataValue>,
    truncated: bool,
}

impl FileRecord {
    /// Assemble a record from its parts. Used by the decoder.
    pub fn new(
        path: impl Into<PathBuf>,
        transfer_syntax: impl Into<String>,
        body: BTreeMap<Tag, DataValue>,
        truncated: bool,
    ) -> Self {
        FileRecord {
            path: path.into(),
            transfer_syntax: transfer_syntax.into(),
            body,
            truncated,
        }
    }

    /// The path of the file this record was decoded from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The transfer syntax UID the data set was decoded with.
    #[inline]
    pub fn transfer_syntax(&self) -> &str {
        &self.transfer_syntax
    }

    /// Whether the source ended before the data set did.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The number of data elements in the record.
    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the record holds no data elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Fetch a data element by tag.
    #[inline]
    pub fn element(&self, tag: Tag) -> Option<&DataValue> {
        self.body.get(&tag)
    }

    /// Fetch a data element's value by tag.
    #[inline]
    pub fn value(&self, tag: Tag) -> Option<&TagValue> {
        self.body.get(&tag).map(DataValue::value)
    }

    /// Fetch the first string of an element's value, if it is a string.
    pub fn str_value(&self, tag: Tag) -> Option<&str> {
        self.value(tag).and_then(TagValue::to_str)
    }

    /// Fetch the first integer of an element's value, if one can be read.
    pub fn int_value(&self, tag: Tag) -> Option<i64> {
        self.value(tag).and_then(TagValue::to_int)
    }

    /// Fetch the first float of an element's value, if one can be read.
    /// Decimal-string values (VR DS) decode to floats upstream.
    pub fn f64_value(&self, tag: Tag) -> Option<f64> {
        self.value(tag).and_then(TagValue::to_f64)
    }

    /// Fetch the items of a sequence element, if present.
    pub fn items(&self, tag: Tag) -> Option<&[Item]> {
        self.value(tag).and_then(TagValue::items)
    }

    /// Iterate over the data elements in ascending tag order.
    pub fn iter(&self) -> btree_map::Iter<'_, Tag, DataValue> {
        self.body.iter()
    }
}

impl<'a> IntoIterator for &'a FileRecord {
    type Item = (&'a Tag, &'a DataValue);
    type IntoIter = btree_map::Iter<'a, Tag, DataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.body.iter()
    }
}
