//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::container::Container;
use crate::types::TypeTag;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// buffer does not start with a known magic number
    #[error("file does not appear to be PTC format")]
    InvalidMagic,

    /// an SD header was found without a container following it
    #[error("SD header is not followed by a PETC container")]
    MissingContainerMagic,

    /// bare container carries a type code this library does not know
    #[error("unrecognized file type ({0})")]
    UnknownTypeCode(String),

    /// payload length disagrees with the fixed size of its type
    #[error("{tag} payload must be {expected} bytes, found {actual}")]
    InvalidPayloadSize {
        tag: TypeTag,
        expected: usize,
        actual: usize,
    },

    /// buffer ended before the structure it describes
    #[error("buffer is truncated")]
    Truncated,

    /// hex text could not be decoded
    #[error("invalid hex string ({0})")]
    InvalidHex(String),

    /// an index or channel value is outside of its domain
    #[error("{what} out of range ({value}, maximum {max})")]
    OutOfRange {
        what: &'static str,
        value: usize,
        max: usize,
    },

    /// a 2D character address resolved past the end of the tile
    #[error("cell index {0} is outside of the 64 cell character")]
    CellOutsideTile(usize),

    /// the SD file hash did not match, the decoded container is still available
    #[error("SD file hash is invalid")]
    Integrity(Box<Container>),

    /// container type has no transcoder, or is not the type requested
    #[error("unimplemented file type ({0:?})")]
    UnsupportedType(Option<TypeTag>),

    /// string slot holds a code that is not part of the character table
    #[error("encoded string contains invalid character ({code} at {position})")]
    InvalidCode { code: u16, position: usize },

    /// string slot has data after its declared length
    #[error("encoded string is too long (expected {0} chars)")]
    DataAfterLength(usize),

    /// content holds a character that can not be represented in a single byte
    #[error("string contains illegal char (codepoint {character} at {position})")]
    IllegalCharacter { character: u32, position: usize },

    /// string slot content is longer than 256 characters
    #[error("string too long ({0})")]
    StringTooLong(usize),

    /// program package mask has bits above the 45 known package slots
    #[error("invalid package mask ({0:#x})")]
    InvalidPackageMask(u64),

    /// embedded package resource is not of the type its slot requires
    #[error("package slot {bit} expects {expected}, found {actual:?}")]
    PackageTypeMismatch {
        bit: u8,
        expected: TypeTag,
        actual: Option<TypeTag>,
    },
}

impl Error {
    pub(crate) fn out_of_range(what: &'static str, value: usize, max: usize) -> Self {
        Error::OutOfRange { what, value, max }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

/// Fails with [`Error::OutOfRange`] when `value` is above `max`
pub(crate) fn check_range(what: &'static str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(Error::out_of_range(what, value, max));
    }
    Ok(())
}
