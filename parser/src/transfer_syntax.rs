//! Transfer syntax identification.
//!
//! The transfer syntax UID obtained from the file meta group determines
//! the byte order and VR encoding mode of the rest of the stream. Only
//! the three native syntaxes are fully decoded; encapsulated syntaxes
//! (compressed pixel data) still carry an explicit VR little endian data
//! set, so their headers decode fine and the pixel data stays an opaque
//! blob. The deflated syntax compresses the data set itself and is
//! rejected.

use byteordered::Endianness;

/// Implicit VR Little Endian: Default Transfer Syntax for DICOM.
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
/// Explicit VR Little Endian.
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
/// Deflated Explicit VR Little Endian.
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
/// Explicit VR Big Endian (retired, but still found in archives).
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

/// The decoding parameters derived from a transfer syntax UID.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransferSyntax {
    /// Whether data elements carry their VR in the stream.
    pub explicit_vr: bool,
    /// The byte order of binary values.
    pub endianness: Endianness,
}

impl TransferSyntax {
    /// Resolve the decoding parameters for a transfer syntax UID.
    ///
    /// Returns `None` for syntaxes whose data set cannot be decoded
    /// directly (deflated) or UIDs outside the DICOM transfer syntax
    /// family.
    pub fn from_uid(uid: &str) -> Option<TransferSyntax> {
        // trailing NUL padding may survive in a sloppily written meta group
        let uid = uid.trim_end_matches(['\0', ' ']);
        match uid {
            IMPLICIT_VR_LITTLE_ENDIAN => Some(TransferSyntax {
                explicit_vr: false,
                endianness: Endianness::Little,
            }),
            EXPLICIT_VR_LITTLE_ENDIAN => Some(TransferSyntax {
                explicit_vr: true,
                endianness: Endianness::Little,
            }),
            EXPLICIT_VR_BIG_ENDIAN => Some(TransferSyntax {
                explicit_vr: true,
                endianness: Endianness::Big,
            }),
            DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN => None,
            // encapsulated pixel data syntaxes (JPEG family, RLE):
            // the data set proper is explicit VR little endian
            _ if uid.starts_with("1.2.840.10008.1.2.4.") || uid == "1.2.840.10008.1.2.5" => {
                Some(TransferSyntax {
                    explicit_vr: true,
                    endianness: Endianness::Little,
                })
            }
            _ => None,
        }
    }
}
