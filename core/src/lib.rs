//! Core value types and the standard attribute dictionary for `dcmsort`.
//!
//! This crate provides the vocabulary shared by the rest of the toolkit:
//!
//! - [`Tag`], [`VR`], and [`Length`], the basic units of a data element;
//! - [`TagValue`] and [`DataValue`], the decoded value model;
//! - [`FileRecord`], the decoded header of one file;
//! - the [`dictionary`] module, a read-only registry of standard
//!   attributes, plus compile-time tag constants in [`tags`].

pub mod dictionary;
pub mod header;
pub mod record;
pub mod tags;
pub mod value;

pub use header::{DataElementHeader, Length, Tag, VR};
pub use record::FileRecord;
pub use value::{DataValue, Item, TagValue};
