use thiserror::Error;

/// The single error type shared by every fallible operation in the
/// workspace. Mount-phase errors abort the mount and propagate to the
/// caller unchanged; query-phase errors distinguish a missing entry
/// (`FileNotFound`) from an entry of the wrong kind (`NotRegularFile`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("I/O failure on the underlying device")]
    IoFailure,

    #[error("invalid header signature")]
    InvalidSignature,

    #[error("header byte order mark is not 0xFFFE")]
    WrongByteOrder,

    #[error("sector shift does not match the major version")]
    InvalidSectorShift,

    #[error("mini sector shift is not 6")]
    InvalidMiniSectorShift,

    #[error("mini stream cutoff size is not 4096")]
    InvalidMiniCutoff,

    #[error("unsupported major version")]
    UnsupportedMajorVersion,

    #[error("unsupported minor version")]
    UnsupportedMinorVersion,

    #[error("header CLSID is not all zeroes")]
    InvalidClsid,

    #[error("header reserved field is not all zeroes")]
    InvalidReservedField,

    #[error("number of directory sectors must be zero for version 3")]
    InvalidNumberOfDirectorySectors,

    #[error("corrupted container file")]
    CorruptedFile,

    #[error("mini FAT header fields are inconsistent")]
    MiniFatHeaderInconsistent,

    #[error("name exceeds 32 UTF-16 code points")]
    Exceeds32Utf16CodePoints,

    #[error("name contains illegal characters")]
    ContainsIllegalCharacters,

    #[error("name exceeds 62 bytes")]
    Exceeds62Bytes,

    #[error("raw name field exceeds 64 bytes")]
    Exceeds64Bytes,

    #[error("raw name length is not a multiple of 2")]
    NotMultipleOf2,

    #[error("raw name is not null terminated")]
    NotNullTerminated,

    #[error("file not found")]
    FileNotFound,

    #[error("not a regular file")]
    NotRegularFile,
}
