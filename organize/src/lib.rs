//! Organizing decoded DICOM records: grouping into studies, series,
//! and acquisitions, planning destination paths, and building
//! canonical JSON summaries.
//!
//! The crate is pure bookkeeping over [`FileRecord`]s produced by a
//! decoder; it performs no filesystem I/O of its own.
//!
//! [`FileRecord`]: dcmsort_core::FileRecord

pub mod group;
pub mod plan;
pub mod summary;
pub mod vendor;

pub use group::{
    group, group_with_policy, Acquisition, AcquisitionKey, Completeness, GroupedTree,
    GroupingError, GroupingPolicy, Series, Study,
};
pub use plan::{plan, CollisionPolicy, NamingTemplate, PathPlan, PlanError};
pub use summary::{summarize, summarize_to_string, summarize_to_string_pretty};
pub use vendor::{profile_for, VendorProfile};
