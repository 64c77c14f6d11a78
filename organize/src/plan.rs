//! Planning destination paths for grouped records.
//!
//! The planner is a pure function from a grouped tree and a naming
//! template to an ordered source → destination table. It never touches
//! the filesystem; carrying out the moves or copies is the caller's
//! business.

use dcmsort_core::FileRecord;
use snafu::Snafu;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::group::{Acquisition, GroupedTree, Series, Study};
use crate::summary::{sorted_series, sorted_studies};

/// Substituted for a placeholder whose attribute is absent.
/// A fixed token, so an unresolved placeholder never yields
/// an empty path segment.
pub const FALLBACK_TOKEN: &str = "unknown";

/// What to do when two records expand to the same destination path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Keep the earlier mapping and drop the later one.
    Skip,
    /// The later mapping replaces the earlier one.
    Overwrite,
    /// Disambiguate the later mapping with the lowest unused
    /// numeric suffix.
    #[default]
    Rename,
}

impl FromStr for CollisionPolicy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, PlanError> {
        match s {
            "skip" => Ok(CollisionPolicy::Skip),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "rename" => Ok(CollisionPolicy::Rename),
            _ => BadCollisionPolicySnafu { name: s }.fail(),
        }
    }
}

/// Errors from template parsing and path planning.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PlanError {
    /// The template names a placeholder the planner does not recognize.
    #[snafu(display("Unrecognized placeholder `{{{}}}` in naming template", name))]
    UnknownPlaceholder { name: String },

    /// A `{` in the template is never closed.
    #[snafu(display("Unclosed `{{` in naming template"))]
    UnclosedPlaceholder,

    /// The collision policy name is not one of `skip`, `overwrite`, `rename`.
    #[snafu(display("Unknown collision policy `{}`", name))]
    BadCollisionPolicy { name: String },

    /// A destination collision the active policy could not resolve.
    /// Reserved for policies beyond the three built-in ones;
    /// the built-in policies always resolve.
    #[snafu(display("Unresolvable destination collision at {}", path.display()))]
    UnresolvableCollision { path: PathBuf },
}

/// The attributes a template may reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Field {
    PatientName,
    StudyDate,
    SeriesDescription,
    SeriesNumber,
    AcquisitionNumber,
}

impl Field {
    fn by_name(name: &str) -> Option<Field> {
        match name {
            "PatientName" => Some(Field::PatientName),
            "StudyDate" => Some(Field::StudyDate),
            "SeriesDescription" => Some(Field::SeriesDescription),
            "SeriesNumber" => Some(Field::SeriesNumber),
            "AcquisitionNumber" => Some(Field::AcquisitionNumber),
            _ => None,
        }
    }

    fn resolve(self, study: &Study, series: &Series, acquisition: &Acquisition) -> String {
        let value = match self {
            Field::PatientName => study.patient_name().map(str::to_string),
            Field::StudyDate => study.date().map(str::to_string),
            Field::SeriesDescription => series.description().map(str::to_string),
            Field::SeriesNumber => series.number().map(|n| n.to_string()),
            Field::AcquisitionNumber => acquisition.acquisition_number().map(|n| n.to_string()),
        };
        match value {
            Some(v) if !v.is_empty() => map_unsafe(&v),
            _ => FALLBACK_TOKEN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(Field),
    Separator,
}

/// A parsed naming template.
///
/// The template is a `/`-separated relative path of literal text and
/// `{Placeholder}` references, expanded once per acquisition. Each
/// record lands in the expanded directory under its source file name.
///
/// ```
/// use dcmsort_organize::NamingTemplate;
/// let template: NamingTemplate =
///     "{PatientName}/{StudyDate}/{SeriesNumber}_{SeriesDescription}"
///         .parse()
///         .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    tokens: Vec<Token>,
}

impl FromStr for NamingTemplate {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, PlanError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return UnclosedPlaceholderSnafu.fail(),
                        }
                    }
                    let field =
                        Field::by_name(&name).ok_or(PlanError::UnknownPlaceholder { name })?;
                    tokens.push(Token::Placeholder(field));
                }
                '/' => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Separator);
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Ok(NamingTemplate { tokens })
    }
}

impl NamingTemplate {
    /// The default layout: patient, study date, numbered series,
    /// acquisition.
    pub fn standard() -> Self {
        "{PatientName}/{StudyDate}/{SeriesNumber}_{SeriesDescription}/{AcquisitionNumber}"
            .parse()
            .unwrap()
    }

    fn expand(&self, study: &Study, series: &Series, acquisition: &Acquisition) -> PathBuf {
        let mut path = PathBuf::new();
        let mut segment = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => segment.push_str(&map_unsafe(text)),
                Token::Placeholder(field) => {
                    segment.push_str(&field.resolve(study, series, acquisition))
                }
                Token::Separator => flush_segment(&mut path, &mut segment),
            }
        }
        flush_segment(&mut path, &mut segment);
        path
    }
}

/// Append a finished path segment. The fallback substitution happens
/// here, on the assembled segment, so a safe character contributed by
/// any one token keeps the whole segment.
fn flush_segment(path: &mut PathBuf, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    if segment.chars().all(|c| c == '_' || c == '.') {
        path.push(FALLBACK_TOKEN);
    } else {
        path.push(segment.as_str());
    }
    segment.clear();
}

/// Replace filesystem-unsafe characters, keeping the segment's length.
fn map_unsafe(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Replace filesystem-unsafe characters in one path segment.
/// An all-unsafe segment becomes the fallback token rather than
/// disappearing.
pub fn sanitize(segment: &str) -> String {
    let out = map_unsafe(segment);
    if out.chars().all(|c| c == '_' || c == '.') {
        FALLBACK_TOKEN.to_string()
    } else {
        out
    }
}

/// An ordered source → destination path table.
///
/// Pairs appear in tree traversal order: studies by (date, UID),
/// series by number, acquisitions by key, records by their in-tree
/// order. Each source path appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPlan {
    entries: Vec<(PathBuf, PathBuf)>,
}

impl PathPlan {
    /// The planned (source, destination) pairs, in order.
    pub fn entries(&self) -> &[(PathBuf, PathBuf)] {
        &self.entries
    }

    /// The number of planned moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the destination planned for a source path.
    pub fn destination(&self, source: &Path) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, d)| d.as_path())
    }
}

impl IntoIterator for PathPlan {
    type Item = (PathBuf, PathBuf);
    type IntoIter = std::vec::IntoIter<(PathBuf, PathBuf)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Map every record in the tree to a destination path under the
/// given template. No I/O is performed.
pub fn plan(
    tree: &GroupedTree,
    template: &NamingTemplate,
    policy: CollisionPolicy,
) -> Result<PathPlan, PlanError> {
    let mut entries: Vec<(PathBuf, PathBuf)> = Vec::new();
    // destination -> index into `entries`, for collision handling
    let mut claimed: HashMap<PathBuf, usize> = HashMap::new();

    for study in sorted_studies(tree) {
        for series in sorted_series(study) {
            for acquisition in series.acquisitions() {
                let dir = template.expand(study, series, acquisition);
                for record in acquisition.records() {
                    let destination = dir.join(file_name(record));
                    place(&mut entries, &mut claimed, record, destination, policy);
                }
            }
        }
    }
    Ok(PathPlan { entries })
}

fn place(
    entries: &mut Vec<(PathBuf, PathBuf)>,
    claimed: &mut HashMap<PathBuf, usize>,
    record: &FileRecord,
    destination: PathBuf,
    policy: CollisionPolicy,
) {
    let source = record.path().to_path_buf();
    if !claimed.contains_key(&destination) {
        claimed.insert(destination.clone(), entries.len());
        entries.push((source, destination));
        return;
    }
    match policy {
        CollisionPolicy::Skip => {}
        CollisionPolicy::Overwrite => {
            let at = claimed[&destination];
            entries[at] = (source, destination);
        }
        CollisionPolicy::Rename => {
            // lowest unused suffix, inserted before the extension
            for n in 1.. {
                let candidate = with_suffix(&destination, n);
                if !claimed.contains_key(&candidate) {
                    claimed.insert(candidate.clone(), entries.len());
                    entries.push((source, candidate));
                    return;
                }
            }
        }
    }
}

fn with_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    path.with_file_name(name)
}

fn file_name(record: &FileRecord) -> String {
    record
        .path()
        .file_name()
        .map(|n| sanitize(&n.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_TOKEN.to_string())
}
