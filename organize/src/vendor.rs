//! Vendor extension profiles consulted by the grouper.
//!
//! Some vendors collapse logically distinct acquisitions into one
//! SeriesInstanceUID; the documented case is Siemens writing multi-echo
//! and multi-volume sequences as a single series. Rather than scattering
//! conditional patches through the grouping code, the tags that make up
//! the acquisition key are data-driven: a profile table keyed by the
//! Manufacturer attribute decides which tags split a series.

use dcmsort_core::{tags, Tag};

/// A vendor profile: which tags sub-partition a series into acquisitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VendorProfile {
    /// Manufacturer identifier fragment this profile applies to,
    /// matched case-insensitively against the Manufacturer attribute.
    pub manufacturer: &'static str,
    /// The tags whose values form the acquisition key, in order.
    pub acquisition_tags: &'static [Tag],
}

/// The profile applied when the manufacturer matches nothing in the table.
///
/// The full three-component key is a safe default: the extra components
/// are sentinel values on files that do not carry the tags, so series
/// from well-behaved vendors still collapse into a single acquisition.
pub static DEFAULT_PROFILE: VendorProfile = VendorProfile {
    manufacturer: "",
    acquisition_tags: &[
        tags::ACQUISITION_NUMBER,
        tags::ECHO_NUMBERS,
        tags::TEMPORAL_POSITION_IDENTIFIER,
    ],
};

/// The vendor profile table.
static PROFILES: &[VendorProfile] = &[
    // Siemens collapses multi-echo/multi-volume output into one series
    VendorProfile {
        manufacturer: "SIEMENS",
        acquisition_tags: &[
            tags::ACQUISITION_NUMBER,
            tags::ECHO_NUMBERS,
            tags::TEMPORAL_POSITION_IDENTIFIER,
        ],
    },
];

/// Select the profile for the given Manufacturer attribute value.
pub fn profile_for(manufacturer: Option<&str>) -> &'static VendorProfile {
    let manufacturer = match manufacturer {
        Some(m) => m.to_ascii_uppercase(),
        None => return &DEFAULT_PROFILE,
    };
    PROFILES
        .iter()
        .find(|p| manufacturer.contains(p.manufacturer))
        .unwrap_or(&DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siemens_matches_case_insensitively() {
        let profile = profile_for(Some("Siemens Healthineers"));
        assert_eq!(profile.manufacturer, "SIEMENS");
        assert_eq!(profile.acquisition_tags.len(), 3);
    }

    #[test]
    fn unknown_vendors_use_the_default() {
        assert_eq!(profile_for(Some("ACME Imaging")), &DEFAULT_PROFILE);
        assert_eq!(profile_for(None), &DEFAULT_PROFILE);
    }
}
