//! Partitioning decoded file records into studies, series, and
//! acquisitions.
//!
//! The partition is a hard equality grouping on
//! (StudyInstanceUID, SeriesInstanceUID), with a vendor-driven
//! sub-partition of each series into acquisitions. The tree is built
//! either in one batch or by incremental insertion; both construction
//! orders produce the same tree, because every ordering the tree
//! exposes is recomputed from sort keys rather than insertion history.

use dcmsort_core::{tags, FileRecord};
use smallvec::SmallVec;
use snafu::Snafu;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::warn;

use crate::vendor;

/// Sentinel study key for records with no StudyInstanceUID.
pub const UNKNOWN_STUDY_UID: &str = "unknown.study";
/// Sentinel series key for records with no SeriesInstanceUID.
pub const UNKNOWN_SERIES_UID: &str = "unknown.series";

/// Grouping-level problems, reported to the caller but never fatal
/// for the batch.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GroupingError {
    /// Two records share a SeriesInstanceUID but report different
    /// StudyInstanceUIDs. The offending record is excluded from the tree.
    #[snafu(display(
        "{}: series {} already belongs to study {}, but this file reports study {}",
        path.display(),
        series_uid,
        expected,
        found
    ))]
    InconsistentSeries {
        path: PathBuf,
        series_uid: String,
        expected: String,
        found: String,
    },

    /// A record lacks one of the identifying UIDs and was grouped
    /// under a sentinel key.
    #[snafu(display("{}: missing {}; grouped under a sentinel key", path.display(), attribute))]
    MissingIdentifier {
        path: PathBuf,
        attribute: &'static str,
    },
}

/// Policy knobs for grouping behavior that the format itself does not fix.
#[derive(Debug, Clone, Default)]
pub struct GroupingPolicy {
    /// How a series' expected instance count is derived
    /// for the incompleteness check.
    pub completeness: Completeness,
}

/// The incompleteness detection policy.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Completeness {
    /// A series is incomplete when its observed InstanceNumbers have
    /// gaps, or when fewer instances are present than the declared
    /// ImagesInAcquisition. Contiguity is judged over the observed
    /// min..=max range, so 0-based numbering does not false-positive.
    #[default]
    DeclaredOrContiguous,
    /// Never flag a series as incomplete.
    Off,
}

/// The key sub-partitioning a series into acquisitions: the values of
/// the vendor profile's acquisition tags, with `None` standing in for
/// absent components. Sentinels order before any present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcquisitionKey(SmallVec<[Option<i64>; 3]>);

impl AcquisitionKey {
    fn for_record(record: &FileRecord) -> AcquisitionKey {
        let profile = vendor::profile_for(record.str_value(tags::MANUFACTURER));
        AcquisitionKey(
            profile
                .acquisition_tags
                .iter()
                .map(|&tag| record.int_value(tag))
                .collect(),
        )
    }

    /// The key components in profile tag order.
    pub fn components(&self) -> &[Option<i64>] {
        &self.0
    }
}

/// One acquisition: a totally ordered run of file records
/// sharing an acquisition key within a series.
#[derive(Debug, Clone)]
pub struct Acquisition {
    key: AcquisitionKey,
    records: Vec<FileRecord>,
}

impl Acquisition {
    fn new(key: AcquisitionKey) -> Self {
        Acquisition {
            key,
            records: Vec::new(),
        }
    }

    /// The grouping key of this acquisition.
    pub fn key(&self) -> &AcquisitionKey {
        &self.key
    }

    /// The member records, ordered by InstanceNumber with
    /// (SliceLocation, source path) tie-breaks.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// The AcquisitionNumber shared by this acquisition's records,
    /// if any record carries one.
    pub fn acquisition_number(&self) -> Option<i64> {
        self.records
            .iter()
            .find_map(|r| r.int_value(tags::ACQUISITION_NUMBER))
    }

    fn insert_sorted(&mut self, record: FileRecord) {
        let at = self
            .records
            .partition_point(|r| cmp_records(r, &record) != Ordering::Greater);
        self.records.insert(at, record);
    }

    fn remove_path(&mut self, path: &PathBuf) {
        self.records.retain(|r| r.path() != path.as_path());
    }
}

/// Total order of records within an acquisition: InstanceNumber
/// ascending (absent first), then SliceLocation ascending, then
/// source path lexical order. Independent of insertion order.
fn cmp_records(a: &FileRecord, b: &FileRecord) -> Ordering {
    let instance = (a.int_value(tags::INSTANCE_NUMBER)).cmp(&b.int_value(tags::INSTANCE_NUMBER));
    instance
        .then_with(|| {
            let (sa, sb) = (
                a.f64_value(tags::SLICE_LOCATION),
                b.f64_value(tags::SLICE_LOCATION),
            );
            match (sa, sb) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| a.path().cmp(b.path()))
}

/// One series: identified by SeriesInstanceUID, created lazily on the
/// first record carrying its UID and never destroyed within a run.
///
/// Derived attributes (number, description, modality) come from the
/// first record in the series' own deterministic record order that
/// carries them, so they do not depend on insertion order.
#[derive(Debug, Clone)]
pub struct Series {
    uid: String,
    acquisitions: BTreeMap<AcquisitionKey, Acquisition>,
}

impl Series {
    fn new(uid: String) -> Self {
        Series {
            uid,
            acquisitions: BTreeMap::new(),
        }
    }

    /// The series instance UID.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The series number, from the first record that declares one.
    pub fn number(&self) -> Option<i64> {
        self.records().find_map(|r| r.int_value(tags::SERIES_NUMBER))
    }

    /// The series description.
    pub fn description(&self) -> Option<&str> {
        self.records()
            .find_map(|r| r.str_value(tags::SERIES_DESCRIPTION))
    }

    /// The modality code (e.g. `MR`).
    pub fn modality(&self) -> Option<&str> {
        self.records().find_map(|r| r.str_value(tags::MODALITY))
    }

    /// The instance count the series declares for itself, if any.
    fn declared_count(&self) -> Option<i64> {
        self.records()
            .find_map(|r| r.int_value(tags::IMAGES_IN_ACQUISITION))
    }

    /// The acquisitions of this series, in key order.
    pub fn acquisitions(&self) -> impl Iterator<Item = &Acquisition> {
        self.acquisitions.values()
    }

    /// Iterate over every record in the series.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.acquisitions.values().flat_map(|a| a.records.iter())
    }

    /// The total number of records in the series.
    pub fn record_count(&self) -> usize {
        self.acquisitions.values().map(|a| a.records.len()).sum()
    }

    /// Whether the series looks incomplete under the given policy:
    /// gaps in the observed InstanceNumbers, or fewer instances than
    /// the series declares. Reported, never fatal.
    pub fn is_incomplete(&self, policy: &GroupingPolicy) -> bool {
        if policy.completeness == Completeness::Off {
            return false;
        }
        let numbers: BTreeSet<i64> = self
            .records()
            .filter_map(|r| r.int_value(tags::INSTANCE_NUMBER))
            .collect();
        let (min, max) = match (numbers.iter().next(), numbers.iter().next_back()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => return false,
        };
        // a span too wide for i64 cannot possibly be fully populated
        let span = match max.checked_sub(min).and_then(|d| d.checked_add(1)) {
            Some(span) => span as u64,
            None => return true,
        };
        let gaps = span != numbers.len() as u64;
        let short = self
            .declared_count()
            .is_some_and(|declared| (numbers.len() as i64) < declared);
        gaps || short
    }
}

/// One study: identified by StudyInstanceUID; owns its series.
///
/// Like [`Series`], derived attributes are read from the first record
/// in the study's deterministic record order that carries them.
#[derive(Debug, Clone)]
pub struct Study {
    uid: String,
    series: BTreeMap<String, Series>,
}

impl Study {
    fn new(uid: String) -> Self {
        Study {
            uid,
            series: BTreeMap::new(),
        }
    }

    /// The study instance UID.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The study date, as the raw `YYYYMMDD` string.
    pub fn date(&self) -> Option<&str> {
        self.records().find_map(|r| r.str_value(tags::STUDY_DATE))
    }

    /// The patient name attribute.
    pub fn patient_name(&self) -> Option<&str> {
        self.records().find_map(|r| r.str_value(tags::PATIENT_NAME))
    }

    /// The study description.
    pub fn description(&self) -> Option<&str> {
        self.records()
            .find_map(|r| r.str_value(tags::STUDY_DESCRIPTION))
    }

    /// The series of this study, in UID order.
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.series.values().flat_map(|s| s.records())
    }
}

/// Where a record currently lives in the tree, for idempotent
/// re-insertion by source path.
#[derive(Debug, Clone)]
struct RecordHome {
    study_uid: String,
    series_uid: String,
    key: AcquisitionKey,
}

/// The root collection of studies for one processing run.
///
/// This is the only entity with a lifecycle spanning a monitoring
/// session: new records are merged in incrementally, studies and
/// series accumulate and are never destroyed mid-run.
#[derive(Debug, Clone, Default)]
pub struct GroupedTree {
    studies: BTreeMap<String, Study>,
    series_home: HashMap<String, String>,
    by_path: HashMap<PathBuf, RecordHome>,
    policy: GroupingPolicy,
}

impl GroupedTree {
    /// Create an empty tree with the default policy.
    pub fn new() -> Self {
        GroupedTree::default()
    }

    /// Create an empty tree with the given policy.
    pub fn with_policy(policy: GroupingPolicy) -> Self {
        GroupedTree {
            policy,
            ..GroupedTree::default()
        }
    }

    /// The grouping policy in effect.
    pub fn policy(&self) -> &GroupingPolicy {
        &self.policy
    }

    /// The studies of this tree, in UID order.
    pub fn studies(&self) -> impl Iterator<Item = &Study> {
        self.studies.values()
    }

    /// The total number of records in the tree.
    pub fn record_count(&self) -> usize {
        self.studies
            .values()
            .flat_map(|st| st.series.values())
            .map(Series::record_count)
            .sum()
    }

    /// Whether the tree holds no records.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Merge one record into the tree.
    ///
    /// Inserting a record whose source path is already present replaces
    /// the earlier record, so at-least-once delivery of the same file
    /// cannot duplicate it. A record contradicting the study of an
    /// already-known series is excluded and reported.
    pub fn insert(&mut self, record: FileRecord) -> Result<(), GroupingError> {
        let study_uid = record
            .str_value(tags::STUDY_INSTANCE_UID)
            .unwrap_or(UNKNOWN_STUDY_UID)
            .to_string();
        let series_uid = record
            .str_value(tags::SERIES_INSTANCE_UID)
            .unwrap_or(UNKNOWN_SERIES_UID)
            .to_string();

        if series_uid != UNKNOWN_SERIES_UID {
            if let Some(home) = self.series_home.get(&series_uid) {
                if *home != study_uid {
                    return Err(GroupingError::InconsistentSeries {
                        path: record.path().to_path_buf(),
                        series_uid,
                        expected: home.clone(),
                        found: study_uid,
                    });
                }
            }
        }

        let path = record.path().to_path_buf();
        if let Some(home) = self.by_path.remove(&path) {
            self.evict(&home, &path);
        }

        let key = AcquisitionKey::for_record(&record);
        self.series_home
            .entry(series_uid.clone())
            .or_insert_with(|| study_uid.clone());

        let study = self
            .studies
            .entry(study_uid.clone())
            .or_insert_with(|| Study::new(study_uid.clone()));
        let series = study
            .series
            .entry(series_uid.clone())
            .or_insert_with(|| Series::new(series_uid.clone()));
        series
            .acquisitions
            .entry(key.clone())
            .or_insert_with(|| Acquisition::new(key.clone()))
            .insert_sorted(record);

        self.by_path.insert(
            path,
            RecordHome {
                study_uid,
                series_uid,
                key,
            },
        );
        Ok(())
    }

    /// Remove the record at `path` from its acquisition. Empty
    /// acquisitions are pruned; studies and series stay, per their
    /// accumulate-only lifecycle.
    fn evict(&mut self, home: &RecordHome, path: &PathBuf) {
        if let Some(series) = self
            .studies
            .get_mut(&home.study_uid)
            .and_then(|st| st.series.get_mut(&home.series_uid))
        {
            if let Some(acquisition) = series.acquisitions.get_mut(&home.key) {
                acquisition.remove_path(path);
                if acquisition.records.is_empty() {
                    series.acquisitions.remove(&home.key);
                }
            }
        }
    }
}

/// Group a batch of records into a new tree with the default policy.
///
/// Per-record problems are collected into the returned diagnostics
/// list; they never abort the remaining records.
pub fn group(
    records: impl IntoIterator<Item = FileRecord>,
) -> (GroupedTree, Vec<GroupingError>) {
    group_with_policy(records, GroupingPolicy::default())
}

/// Group a batch of records into a new tree with the given policy.
pub fn group_with_policy(
    records: impl IntoIterator<Item = FileRecord>,
    policy: GroupingPolicy,
) -> (GroupedTree, Vec<GroupingError>) {
    let mut tree = GroupedTree::with_policy(policy);
    let mut diagnostics = Vec::new();
    for record in records {
        if record.str_value(tags::STUDY_INSTANCE_UID).is_none() {
            diagnostics.push(GroupingError::MissingIdentifier {
                path: record.path().to_path_buf(),
                attribute: "StudyInstanceUID",
            });
        }
        if record.str_value(tags::SERIES_INSTANCE_UID).is_none() {
            diagnostics.push(GroupingError::MissingIdentifier {
                path: record.path().to_path_buf(),
                attribute: "SeriesInstanceUID",
            });
        }
        if let Err(e) = tree.insert(record) {
            warn!("{}", e);
            diagnostics.push(e);
        }
    }
    (tree, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmsort_core::{DataValue, Length, Tag, TagValue, VR};
    use std::collections::BTreeMap as Body;

    fn str_el(vr: VR, s: &str) -> DataValue {
        DataValue::new(vr, Length::defined(s.len() as u32), TagValue::Str(s.into()))
    }

    fn int_el(v: i64) -> DataValue {
        DataValue::new(VR::IS, Length::defined(2), TagValue::Int(v))
    }

    struct RecordBuilder {
        body: Body<Tag, DataValue>,
        path: String,
    }

    fn record(path: &str) -> RecordBuilder {
        RecordBuilder {
            body: Body::new(),
            path: path.to_string(),
        }
    }

    impl RecordBuilder {
        fn uid(mut self, study: &str, series: &str) -> Self {
            self.body
                .insert(tags::STUDY_INSTANCE_UID, str_el(VR::UI, study));
            self.body
                .insert(tags::SERIES_INSTANCE_UID, str_el(VR::UI, series));
            self
        }

        fn str(mut self, tag: Tag, value: &str) -> Self {
            self.body.insert(tag, str_el(VR::LO, value));
            self
        }

        fn int(mut self, tag: Tag, value: i64) -> Self {
            self.body.insert(tag, int_el(value));
            self
        }

        fn f64(mut self, tag: Tag, value: f64) -> Self {
            self.body.insert(
                tag,
                DataValue::new(VR::DS, Length::defined(8), TagValue::F64(value)),
            );
            self
        }

        fn build(self) -> FileRecord {
            FileRecord::new(self.path, "1.2.840.10008.1.2.1", self.body, false)
        }
    }

    fn simple(path: &str, study: &str, series: &str, instance: i64) -> FileRecord {
        record(path)
            .uid(study, series)
            .int(tags::INSTANCE_NUMBER, instance)
            .build()
    }

    #[test]
    fn three_files_one_series_one_acquisition() {
        let (tree, diags) = group(vec![
            simple("/d/3.dcm", "ST1", "S1", 3),
            simple("/d/1.dcm", "ST1", "S1", 1),
            simple("/d/2.dcm", "ST1", "S1", 2),
        ]);
        assert!(diags.is_empty());
        let study = tree.studies().next().unwrap();
        assert_eq!(study.uid(), "ST1");
        let series: Vec<_> = study.series().collect();
        assert_eq!(series.len(), 1);
        let acquisitions: Vec<_> = series[0].acquisitions().collect();
        assert_eq!(acquisitions.len(), 1);
        let numbers: Vec<_> = acquisitions[0]
            .records()
            .iter()
            .map(|r| r.int_value(tags::INSTANCE_NUMBER).unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(!series[0].is_incomplete(tree.policy()));
    }

    #[test]
    fn partition_property() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                simple(
                    &format!("/d/{:02}.dcm", i),
                    if i % 2 == 0 { "ST1" } else { "ST2" },
                    &format!("S{}", i % 5),
                    i,
                )
            })
            .collect();
        // series S0..S4 alternate studies per i%2, which makes some
        // series inconsistent; count both kept and excluded records
        let total = records.len();
        let (tree, diags) = group(records);
        assert_eq!(tree.record_count() + diags.len(), total);
    }

    #[test]
    fn distinct_echo_numbers_split_acquisitions() {
        let (tree, diags) = group(vec![
            record("/d/e1a.dcm")
                .uid("ST1", "S1")
                .int(tags::ECHO_NUMBERS, 1)
                .int(tags::INSTANCE_NUMBER, 1)
                .build(),
            record("/d/e2a.dcm")
                .uid("ST1", "S1")
                .int(tags::ECHO_NUMBERS, 2)
                .int(tags::INSTANCE_NUMBER, 1)
                .build(),
            record("/d/e1b.dcm")
                .uid("ST1", "S1")
                .int(tags::ECHO_NUMBERS, 1)
                .int(tags::INSTANCE_NUMBER, 2)
                .build(),
        ]);
        assert!(diags.is_empty());
        let study = tree.studies().next().unwrap();
        let series = study.series().next().unwrap();
        let acquisitions: Vec<_> = series.acquisitions().collect();
        assert_eq!(acquisitions.len(), 2);
        assert_eq!(acquisitions[0].records().len(), 2);
        assert_eq!(acquisitions[1].records().len(), 1);
    }

    #[test]
    fn ordering_ties_break_on_slice_location_then_path() {
        let (tree, _) = group(vec![
            record("/d/b.dcm")
                .uid("ST1", "S1")
                .int(tags::INSTANCE_NUMBER, 1)
                .f64(tags::SLICE_LOCATION, 4.0)
                .build(),
            record("/d/a.dcm")
                .uid("ST1", "S1")
                .int(tags::INSTANCE_NUMBER, 1)
                .f64(tags::SLICE_LOCATION, 2.0)
                .build(),
            record("/d/c.dcm")
                .uid("ST1", "S1")
                .int(tags::INSTANCE_NUMBER, 1)
                .f64(tags::SLICE_LOCATION, 2.0)
                .build(),
        ]);
        let study = tree.studies().next().unwrap();
        let acq = study.series().next().unwrap().acquisitions().next().unwrap();
        let paths: Vec<_> = acq
            .records()
            .iter()
            .map(|r| r.path().to_string_lossy().to_string())
            .collect();
        assert_eq!(paths, vec!["/d/a.dcm", "/d/c.dcm", "/d/b.dcm"]);
    }

    #[test]
    fn inconsistent_series_is_excluded_and_reported() {
        let (tree, diags) = group(vec![
            simple("/d/ok.dcm", "ST1", "S1", 1),
            simple("/d/bad.dcm", "ST2", "S1", 2),
        ]);
        assert_eq!(tree.record_count(), 1);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            &diags[0],
            GroupingError::InconsistentSeries { series_uid, .. } if series_uid == "S1"
        ));
    }

    #[test]
    fn missing_uids_group_under_sentinels() {
        let (tree, diags) = group(vec![record("/d/nouid.dcm")
            .int(tags::INSTANCE_NUMBER, 1)
            .build()]);
        assert_eq!(tree.record_count(), 1);
        assert_eq!(diags.len(), 2);
        let study = tree.studies().next().unwrap();
        assert_eq!(study.uid(), UNKNOWN_STUDY_UID);
    }

    #[test]
    fn reinsertion_is_idempotent() {
        let mut tree = GroupedTree::new();
        tree.insert(simple("/d/1.dcm", "ST1", "S1", 1)).unwrap();
        tree.insert(simple("/d/1.dcm", "ST1", "S1", 1)).unwrap();
        assert_eq!(tree.record_count(), 1);
    }

    #[test]
    fn reinsertion_can_move_a_record() {
        let mut tree = GroupedTree::new();
        tree.insert(
            record("/d/1.dcm")
                .uid("ST1", "S1")
                .int(tags::ECHO_NUMBERS, 1)
                .build(),
        )
        .unwrap();
        // same file decoded again, now with a different echo number
        tree.insert(
            record("/d/1.dcm")
                .uid("ST1", "S1")
                .int(tags::ECHO_NUMBERS, 2)
                .build(),
        )
        .unwrap();
        assert_eq!(tree.record_count(), 1);
        let study = tree.studies().next().unwrap();
        let series = study.series().next().unwrap();
        // the old acquisition was pruned when it became empty
        assert_eq!(series.acquisitions().count(), 1);
    }

    #[test]
    fn incomplete_series_detection() {
        let (tree, _) = group(vec![
            simple("/d/1.dcm", "ST1", "S1", 1),
            simple("/d/3.dcm", "ST1", "S1", 3),
        ]);
        let series = tree.studies().next().unwrap().series().next().unwrap();
        assert!(series.is_incomplete(tree.policy()));

        // declared count higher than what is present
        let (tree, _) = group(vec![record("/d/1.dcm")
            .uid("ST1", "S1")
            .int(tags::INSTANCE_NUMBER, 1)
            .int(tags::IMAGES_IN_ACQUISITION, 5)
            .build()]);
        let series = tree.studies().next().unwrap().series().next().unwrap();
        assert!(series.is_incomplete(tree.policy()));

        // the check is policy, not hard-coded
        let (tree, _) = group_with_policy(
            vec![
                simple("/d/1.dcm", "ST1", "S1", 1),
                simple("/d/3.dcm", "ST1", "S1", 3),
            ],
            GroupingPolicy {
                completeness: Completeness::Off,
            },
        );
        let series = tree.studies().next().unwrap().series().next().unwrap();
        assert!(!series.is_incomplete(tree.policy()));
    }

    #[test]
    fn extreme_instance_numbers_flag_incomplete_without_panicking() {
        let (tree, _) = group(vec![
            simple("/d/lo.dcm", "ST1", "S1", i64::MIN),
            simple("/d/hi.dcm", "ST1", "S1", i64::MAX),
        ]);
        let series = tree.studies().next().unwrap().series().next().unwrap();
        assert!(series.is_incomplete(tree.policy()));
    }

    #[test]
    fn derived_attributes_ignore_insertion_order() {
        let first = record("/d/a.dcm")
            .uid("ST1", "S1")
            .int(tags::INSTANCE_NUMBER, 1)
            .int(tags::SERIES_NUMBER, 5)
            .str(tags::SERIES_DESCRIPTION, "t1_mpr_sag")
            .build();
        let second = record("/d/b.dcm")
            .uid("ST1", "S1")
            .int(tags::INSTANCE_NUMBER, 2)
            .int(tags::SERIES_NUMBER, 7)
            .str(tags::SERIES_DESCRIPTION, "t1_mpr_sag_repeat")
            .build();

        let mut forward = GroupedTree::new();
        forward.insert(first.clone()).unwrap();
        forward.insert(second.clone()).unwrap();
        let mut reversed = GroupedTree::new();
        reversed.insert(second).unwrap();
        reversed.insert(first).unwrap();

        for tree in [&forward, &reversed] {
            let series = tree.studies().next().unwrap().series().next().unwrap();
            // the record that sorts first wins, whichever arrived first
            assert_eq!(series.number(), Some(5));
            assert_eq!(series.description(), Some("t1_mpr_sag"));
        }
    }

    #[test]
    fn series_attributes_come_from_first_carrier() {
        let (tree, _) = group(vec![
            simple("/d/1.dcm", "ST1", "S1", 1),
            record("/d/2.dcm")
                .uid("ST1", "S1")
                .int(tags::INSTANCE_NUMBER, 2)
                .int(tags::SERIES_NUMBER, 5)
                .str(tags::SERIES_DESCRIPTION, "t1_mpr_sag")
                .str(tags::MODALITY, "MR")
                .build(),
        ]);
        let series = tree.studies().next().unwrap().series().next().unwrap();
        assert_eq!(series.number(), Some(5));
        assert_eq!(series.description(), Some("t1_mpr_sag"));
        assert_eq!(series.modality(), Some("MR"));
    }
}
