//! The standard attribute dictionary (tag registry).
//!
//! The registry is a process-wide, read-only mapping from `(group, element)`
//! tag codes to the attribute's alias, value representation, and value
//! multiplicity. It is lazily initialized behind a singleton on first use
//! and never mutated afterwards, making it safe for concurrent reads.
//!
//! Unknown tags are not an error anywhere in this toolkit: the decoder
//! keeps them under their numeric key with a raw-typed value, so private
//! vendor attributes survive a decode round untouched.

use crate::header::{Tag, VR};
use once_cell::sync::Lazy;
use std::collections::HashMap;

mod entries;

pub use entries::ENTRIES;

/// The declared value multiplicity of an attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Multiplicity {
    /// Exactly one value.
    One,
    /// A fixed number of values.
    Fixed(u32),
    /// One or more values.
    OneOrMore,
    /// A bounded range of values.
    Range(u32, u32),
}

/// A single entry of the attribute dictionary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The attribute's tag.
    pub tag: Tag,
    /// The attribute's alias, in PascalCase as in the standard.
    pub alias: &'static str,
    /// The attribute's value representation.
    pub vr: VR,
    /// The attribute's value multiplicity.
    pub vm: Multiplicity,
}

/// Generic entry served for group length elements (`(gggg,0000)`).
static GROUP_LENGTH_ENTRY: DictionaryEntry = DictionaryEntry {
    tag: Tag(0x0000, 0x0000),
    alias: "GenericGroupLength",
    vr: VR::UL,
    vm: Multiplicity::One,
};

/// Generic entry served for private creator elements.
static PRIVATE_CREATOR_ENTRY: DictionaryEntry = DictionaryEntry {
    tag: Tag(0x0000, 0x0000),
    alias: "PrivateCreator",
    vr: VR::LO,
    vm: Multiplicity::One,
};

/// The singleton dictionary index.
#[derive(Debug)]
pub struct TagRegistry {
    by_tag: HashMap<Tag, &'static DictionaryEntry>,
    by_alias: HashMap<&'static str, &'static DictionaryEntry>,
}

static REGISTRY: Lazy<TagRegistry> = Lazy::new(|| {
    let mut by_tag = HashMap::with_capacity(ENTRIES.len());
    let mut by_alias = HashMap::with_capacity(ENTRIES.len());
    for entry in ENTRIES {
        by_tag.insert(entry.tag, entry);
        by_alias.insert(entry.alias, entry);
    }
    TagRegistry { by_tag, by_alias }
});

/// Retrieve the singleton instance of the tag registry.
#[inline]
pub fn registry() -> &'static TagRegistry {
    &REGISTRY
}

impl TagRegistry {
    /// Look up an attribute by tag.
    ///
    /// Group length and private creator elements, which the standard
    /// defines generically rather than per tag, resolve to shared
    /// generic entries.
    pub fn by_tag(&self, tag: Tag) -> Option<&'static DictionaryEntry> {
        if let Some(entry) = self.by_tag.get(&tag) {
            return Some(entry);
        }
        if tag.is_group_length() {
            return Some(&GROUP_LENGTH_ENTRY);
        }
        if tag.is_private() && (0x0010..=0x00FF).contains(&tag.element()) {
            return Some(&PRIVATE_CREATOR_ENTRY);
        }
        None
    }

    /// Look up an attribute by its alias (e.g. `"PatientName"`).
    pub fn by_alias(&self, alias: &str) -> Option<&'static DictionaryEntry> {
        self.by_alias.get(alias).copied()
    }
}

/// Look up an attribute by tag in the process-wide registry.
///
/// Returns the attribute's alias, VR, and multiplicity,
/// or `None` for tags not covered by the dictionary.
#[inline]
pub fn lookup(tag: Tag) -> Option<&'static DictionaryEntry> {
    registry().by_tag(tag)
}

/// Look up an attribute by alias in the process-wide registry.
#[inline]
pub fn lookup_alias(alias: &str) -> Option<&'static DictionaryEntry> {
    registry().by_alias(alias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    #[test]
    fn can_fetch_standard_attributes() {
        let entry = lookup(tags::PATIENT_NAME).unwrap();
        assert_eq!(entry.alias, "PatientName");
        assert_eq!(entry.vr, VR::PN);
        assert_eq!(entry.vm, Multiplicity::One);

        let entry = lookup(tags::IMAGE_TYPE).unwrap();
        assert_eq!(entry.alias, "ImageType");
        assert_eq!(entry.vr, VR::CS);
        assert_eq!(entry.vm, Multiplicity::OneOrMore);
    }

    #[test]
    fn lookup_by_alias_matches_lookup_by_tag() {
        let entry = lookup_alias("SeriesInstanceUID").unwrap();
        assert_eq!(entry.tag, tags::SERIES_INSTANCE_UID);
        assert_eq!(entry.vr, VR::UI);
    }

    #[test]
    fn generic_entries() {
        let entry = lookup(Tag(0x0008, 0x0000)).unwrap();
        assert_eq!(entry.alias, "GenericGroupLength");
        assert_eq!(entry.vr, VR::UL);

        let entry = lookup(Tag(0x0029, 0x0010)).unwrap();
        assert_eq!(entry.alias, "PrivateCreator");
        assert_eq!(entry.vr, VR::LO);
    }

    #[test]
    fn unknown_tags_are_not_an_error() {
        assert!(lookup(Tag(0x0029, 0x1020)).is_none());
    }
}
