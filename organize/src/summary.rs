//! Serializing a grouped tree into a canonical JSON summary.
//!
//! The output is deterministic: every collection is emitted in an
//! explicitly sorted order, and no timestamps or other run-dependent
//! data are embedded, so the same tree always serializes to the same
//! bytes. Reproducible output diffs are part of the contract.

use serde_json::{json, Map, Value};

use crate::group::{Acquisition, GroupedTree, Series, Study};

/// Studies ordered by (StudyDate, StudyInstanceUID).
/// An absent date sorts before any present one.
pub(crate) fn sorted_studies(tree: &GroupedTree) -> Vec<&Study> {
    let mut studies: Vec<&Study> = tree.studies().collect();
    studies.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.uid().cmp(b.uid())));
    studies
}

/// Series ordered by (SeriesNumber, SeriesInstanceUID).
pub(crate) fn sorted_series(study: &Study) -> Vec<&Series> {
    let mut series: Vec<&Series> = study.series().collect();
    series.sort_by(|a, b| {
        a.number()
            .cmp(&b.number())
            .then_with(|| a.uid().cmp(b.uid()))
    });
    series
}

fn opt_str(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn acquisition_json(acquisition: &Acquisition) -> Value {
    let key: Vec<Value> = acquisition
        .key()
        .components()
        .iter()
        .map(|c| c.map_or(Value::Null, Value::from))
        .collect();
    let files: Vec<Value> = acquisition
        .records()
        .iter()
        .map(|r| Value::String(r.path().to_string_lossy().into_owned()))
        .collect();
    json!({
        "key": key,
        "count": acquisition.records().len(),
        "files": files,
    })
}

fn series_json(series: &Series, tree: &GroupedTree) -> Value {
    let acquisitions: Vec<Value> = series.acquisitions().map(acquisition_json).collect();
    json!({
        "uid": series.uid(),
        "number": series.number(),
        "description": opt_str(series.description()),
        "modality": opt_str(series.modality()),
        "count": series.record_count(),
        "incomplete": series.is_incomplete(tree.policy()),
        "acquisitions": acquisitions,
    })
}

fn study_json(study: &Study, tree: &GroupedTree) -> Value {
    let series: Vec<Value> = sorted_series(study)
        .into_iter()
        .map(|s| series_json(s, tree))
        .collect();
    json!({
        "date": opt_str(study.date()),
        "patient_name": opt_str(study.patient_name()),
        "description": opt_str(study.description()),
        "series": series,
    })
}

/// Build the canonical JSON summary of a grouped tree.
pub fn summarize(tree: &GroupedTree) -> Value {
    let mut studies = Map::new();
    for study in sorted_studies(tree) {
        studies.insert(study.uid().to_string(), study_json(study, tree));
    }
    json!({ "studies": studies })
}

/// Build the summary and serialize it to a compact JSON string.
/// Byte-identical for identical trees.
pub fn summarize_to_string(tree: &GroupedTree) -> String {
    // infallible: the value contains no non-string map keys
    serde_json::to_string(&summarize(tree)).expect("summary value serializes")
}

/// As [`summarize_to_string`], pretty-printed.
pub fn summarize_to_string_pretty(tree: &GroupedTree) -> String {
    serde_json::to_string_pretty(&summarize(tree)).expect("summary value serializes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{group, GroupedTree};
    use dcmsort_core::{tags, DataValue, FileRecord, Length, TagValue, VR};
    use std::collections::BTreeMap;

    fn record(path: &str, study: &str, series: &str, instance: i64) -> FileRecord {
        let mut body = BTreeMap::new();
        for (tag, value) in [
            (tags::STUDY_INSTANCE_UID, study),
            (tags::SERIES_INSTANCE_UID, series),
        ] {
            body.insert(
                tag,
                DataValue::new(
                    VR::UI,
                    Length::defined(value.len() as u32),
                    TagValue::Str(value.into()),
                ),
            );
        }
        body.insert(
            tags::INSTANCE_NUMBER,
            DataValue::new(VR::IS, Length::defined(2), TagValue::Int(instance)),
        );
        FileRecord::new(path, "1.2.840.10008.1.2.1", body, false)
    }

    fn three_file_tree() -> GroupedTree {
        let (tree, diags) = group(vec![
            record("/d/2.dcm", "ST1", "S1", 2),
            record("/d/1.dcm", "ST1", "S1", 1),
            record("/d/3.dcm", "ST1", "S1", 3),
        ]);
        assert!(diags.is_empty());
        tree
    }

    #[test]
    fn single_series_summary_shape() {
        let summary = summarize(&three_file_tree());
        let series = &summary["studies"]["ST1"]["series"];
        assert_eq!(series.as_array().unwrap().len(), 1);
        assert_eq!(series[0]["uid"], "S1");
        assert_eq!(series[0]["count"], 3);
        assert_eq!(series[0]["incomplete"], false);
        let files = series[0]["acquisitions"][0]["files"].as_array().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], "/d/1.dcm");
    }

    #[test]
    fn serialization_is_byte_identical_across_calls() {
        let tree = three_file_tree();
        assert_eq!(summarize_to_string(&tree), summarize_to_string(&tree));
    }

    #[test]
    fn incremental_and_batch_trees_summarize_identically() {
        let records = vec![
            record("/d/1.dcm", "ST1", "S1", 1),
            record("/d/2.dcm", "ST1", "S2", 1),
            record("/d/3.dcm", "ST2", "S3", 1),
            record("/d/4.dcm", "ST1", "S1", 2),
        ];
        let (batch, _) = group(records.clone());
        let mut incremental = GroupedTree::new();
        // insert in a different order than the batch saw
        for r in records.into_iter().rev() {
            incremental.insert(r).unwrap();
        }
        assert_eq!(
            summarize_to_string(&batch),
            summarize_to_string(&incremental)
        );
    }

    #[test]
    fn studies_are_ordered_by_date_then_uid() {
        let mut older = record("/d/a.dcm", "ST-B", "S1", 1);
        // rebuild with a date attribute
        let mut body: BTreeMap<_, _> = older.iter().map(|(t, v)| (*t, v.clone())).collect();
        body.insert(
            tags::STUDY_DATE,
            DataValue::new(VR::DA, Length::defined(8), TagValue::Str("20200101".into())),
        );
        older = FileRecord::new("/d/a.dcm", "1.2.840.10008.1.2.1", body, false);

        let mut newer = record("/d/b.dcm", "ST-A", "S2", 1);
        let mut body: BTreeMap<_, _> = newer.iter().map(|(t, v)| (*t, v.clone())).collect();
        body.insert(
            tags::STUDY_DATE,
            DataValue::new(VR::DA, Length::defined(8), TagValue::Str("20240101".into())),
        );
        newer = FileRecord::new("/d/b.dcm", "1.2.840.10008.1.2.1", body, false);

        let (tree, _) = group(vec![newer, older]);
        let summary = summarize(&tree);
        let keys: Vec<&String> = summary["studies"].as_object().unwrap().keys().collect();
        // ST-B is older, so it comes first despite its UID sorting later
        assert_eq!(keys, vec!["ST-B", "ST-A"]);
    }
}
