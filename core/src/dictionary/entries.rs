//! The static attribute entry table backing the tag registry.
//!
//! This is not the full standard dictionary; it covers the file meta
//! group, the identifying and descriptive attributes used for grouping
//! and path planning, and the attributes most commonly found in MR
//! image headers, which is what implicit-VR decoding needs to resolve.

use super::{DictionaryEntry, Multiplicity};
use crate::header::{Tag, VR};

use Multiplicity::{Fixed, One, OneOrMore};

/// The dictionary entries.
#[rustfmt::skip]
pub static ENTRIES: &[DictionaryEntry] = &[
    // group 0002: file meta
    DictionaryEntry { tag: Tag(0x0002, 0x0001), alias: "FileMetaInformationVersion", vr: VR::OB, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0002), alias: "MediaStorageSOPClassUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0003), alias: "MediaStorageSOPInstanceUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0010), alias: "TransferSyntaxUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0012), alias: "ImplementationClassUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0013), alias: "ImplementationVersionName", vr: VR::SH, vm: One },
    DictionaryEntry { tag: Tag(0x0002, 0x0016), alias: "SourceApplicationEntityTitle", vr: VR::AE, vm: One },

    // group 0008: identification and description
    DictionaryEntry { tag: Tag(0x0008, 0x0005), alias: "SpecificCharacterSet", vr: VR::CS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0008, 0x0008), alias: "ImageType", vr: VR::CS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0008, 0x0016), alias: "SOPClassUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0018), alias: "SOPInstanceUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0020), alias: "StudyDate", vr: VR::DA, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0021), alias: "SeriesDate", vr: VR::DA, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0022), alias: "AcquisitionDate", vr: VR::DA, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0023), alias: "ContentDate", vr: VR::DA, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0030), alias: "StudyTime", vr: VR::TM, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0031), alias: "SeriesTime", vr: VR::TM, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0032), alias: "AcquisitionTime", vr: VR::TM, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0033), alias: "ContentTime", vr: VR::TM, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0050), alias: "AccessionNumber", vr: VR::SH, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0060), alias: "Modality", vr: VR::CS, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0070), alias: "Manufacturer", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0080), alias: "InstitutionName", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x0090), alias: "ReferringPhysicianName", vr: VR::PN, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x1010), alias: "StationName", vr: VR::SH, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x1030), alias: "StudyDescription", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x103E), alias: "SeriesDescription", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x1090), alias: "ManufacturerModelName", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0008, 0x1140), alias: "ReferencedImageSequence", vr: VR::SQ, vm: One },

    // group 0010: patient
    DictionaryEntry { tag: Tag(0x0010, 0x0010), alias: "PatientName", vr: VR::PN, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x0020), alias: "PatientID", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x0030), alias: "PatientBirthDate", vr: VR::DA, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x0040), alias: "PatientSex", vr: VR::CS, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x1010), alias: "PatientAge", vr: VR::AS, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x1020), alias: "PatientSize", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0010, 0x1030), alias: "PatientWeight", vr: VR::DS, vm: One },

    // group 0018: acquisition parameters
    DictionaryEntry { tag: Tag(0x0018, 0x0020), alias: "ScanningSequence", vr: VR::CS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0018, 0x0021), alias: "SequenceVariant", vr: VR::CS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0018, 0x0022), alias: "ScanOptions", vr: VR::CS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0018, 0x0023), alias: "MRAcquisitionType", vr: VR::CS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0050), alias: "SliceThickness", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0080), alias: "RepetitionTime", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0081), alias: "EchoTime", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0082), alias: "InversionTime", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0086), alias: "EchoNumbers", vr: VR::IS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0018, 0x0087), alias: "MagneticFieldStrength", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0088), alias: "SpacingBetweenSlices", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x0091), alias: "EchoTrainLength", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x1000), alias: "DeviceSerialNumber", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x1020), alias: "SoftwareVersions", vr: VR::LO, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0018, 0x1030), alias: "ProtocolName", vr: VR::LO, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x1314), alias: "FlipAngle", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0018, 0x5100), alias: "PatientPosition", vr: VR::CS, vm: One },

    // group 0020: relationship
    DictionaryEntry { tag: Tag(0x0020, 0x000D), alias: "StudyInstanceUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x000E), alias: "SeriesInstanceUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0010), alias: "StudyID", vr: VR::SH, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0011), alias: "SeriesNumber", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0012), alias: "AcquisitionNumber", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0013), alias: "InstanceNumber", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0032), alias: "ImagePositionPatient", vr: VR::DS, vm: Fixed(3) },
    DictionaryEntry { tag: Tag(0x0020, 0x0037), alias: "ImageOrientationPatient", vr: VR::DS, vm: Fixed(6) },
    DictionaryEntry { tag: Tag(0x0020, 0x0052), alias: "FrameOfReferenceUID", vr: VR::UI, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0100), alias: "TemporalPositionIdentifier", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x0105), alias: "NumberOfTemporalPositions", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x1002), alias: "ImagesInAcquisition", vr: VR::IS, vm: One },
    DictionaryEntry { tag: Tag(0x0020, 0x1041), alias: "SliceLocation", vr: VR::DS, vm: One },

    // group 0028: image presentation
    DictionaryEntry { tag: Tag(0x0028, 0x0002), alias: "SamplesPerPixel", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0004), alias: "PhotometricInterpretation", vr: VR::CS, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0010), alias: "Rows", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0011), alias: "Columns", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0030), alias: "PixelSpacing", vr: VR::DS, vm: Fixed(2) },
    DictionaryEntry { tag: Tag(0x0028, 0x0100), alias: "BitsAllocated", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0101), alias: "BitsStored", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0102), alias: "HighBit", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x0103), alias: "PixelRepresentation", vr: VR::US, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x1050), alias: "WindowCenter", vr: VR::DS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0028, 0x1051), alias: "WindowWidth", vr: VR::DS, vm: OneOrMore },
    DictionaryEntry { tag: Tag(0x0028, 0x1052), alias: "RescaleIntercept", vr: VR::DS, vm: One },
    DictionaryEntry { tag: Tag(0x0028, 0x1053), alias: "RescaleSlope", vr: VR::DS, vm: One },

    // group 7FE0: pixel data
    DictionaryEntry { tag: Tag(0x7FE0, 0x0010), alias: "PixelData", vr: VR::OW, vm: One },
];
