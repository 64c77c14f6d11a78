//! Error types for the header decoder.

use dcmsort_core::Tag;
use snafu::Snafu;
use std::path::PathBuf;

/// A coarse classification of decode failures,
/// used to choose recovery behavior per decoding mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input's structure could not be interpreted
    /// (bad magic code, bad VR, bad item framing, nesting too deep).
    /// Fatal for the file in every mode.
    Format,
    /// A declared length exceeds the remaining input.
    /// Fatal in strict mode; in best-effort mode the decoder returns
    /// the partially populated record with its truncation flag set.
    Truncation,
    /// The file could not be read from the filesystem.
    Io,
}

/// The error type for decoding a DICOM file or byte stream.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DecodeError {
    /// The `DICM` magic code is absent after the 128-byte preamble.
    #[snafu(display("Could not find the DICM magic code after the preamble"))]
    MissingMagic,

    /// Headerless fallback was enabled, but the start of the input
    /// does not look like a data element in any native transfer syntax.
    #[snafu(display("Could not recognize a data set at the start of the input"))]
    UnrecognizedStart,

    /// The file meta group does not declare a transfer syntax.
    #[snafu(display("File meta group has no transfer syntax UID"))]
    MissingTransferSyntax,

    /// The declared transfer syntax is not one this decoder can read.
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String },

    /// A two-byte VR code was read that cannot be a value representation.
    #[snafu(display(
        "Bad value representation code {:?} for element tagged {}",
        code,
        tag
    ))]
    BadValueRepresentation { tag: Tag, code: [u8; 2] },

    /// An item or delimiter tag appeared where a data element was expected,
    /// or vice versa.
    #[snafu(display("Unexpected tag {} in sequence framing", tag))]
    UnexpectedItemTag { tag: Tag },

    /// A data element outside group 0002 appeared inside the file meta
    /// group, or the group length element was not first.
    #[snafu(display("Unexpected data element tagged {} in file meta group", tag))]
    UnexpectedMetaTag { tag: Tag },

    /// A defined-length sequence's items do not add up to its declared length.
    #[snafu(display(
        "Inconsistent sequence end: expected end at {} bytes but read {}",
        expected,
        actual
    ))]
    SequenceEndMismatch { expected: usize, actual: usize },

    /// Sequence nesting exceeded the configured ceiling.
    #[snafu(display("Sequence nesting too deep (limit is {})", limit))]
    NestingTooDeep { limit: u32 },

    /// A length field points past the end of the input.
    #[snafu(display(
        "Premature end of input: needed {} more bytes, {} remaining",
        needed,
        remaining
    ))]
    PrematureEnd { needed: usize, remaining: usize },

    /// The source file could not be read.
    #[snafu(display("Could not read file {}: {}", path.display(), source))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DecodeError {
    /// The coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MissingMagic
            | DecodeError::UnrecognizedStart
            | DecodeError::MissingTransferSyntax
            | DecodeError::UnsupportedTransferSyntax { .. }
            | DecodeError::BadValueRepresentation { .. }
            | DecodeError::UnexpectedItemTag { .. }
            | DecodeError::UnexpectedMetaTag { .. }
            | DecodeError::SequenceEndMismatch { .. }
            | DecodeError::NestingTooDeep { .. } => ErrorKind::Format,
            DecodeError::PrematureEnd { .. } => ErrorKind::Truncation,
            DecodeError::ReadFile { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
