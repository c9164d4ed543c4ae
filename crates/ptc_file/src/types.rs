//! Base types for structure of PTC files.

use binrw::{BinRead, BinWrite};
use derive_more::derive::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the SD header in bytes, including its magic
pub const SD_HEADER_SIZE: usize = 36;

/// Size of the `PETC` magic plus the type code
pub const CONTAINER_HEADER_SIZE: usize = 12;

/// Magic number of an SD file
pub const SD_MAGIC: &[u8; 4] = b"PX01";

/// Magic number of a bare container
pub const CONTAINER_MAGIC: &[u8; 4] = b"PETC";

/// The kind of resource stored in a container
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeTag {
    /// Program text, optionally packaged with other resources
    #[display("PRG")]
    Program,
    /// 256 character tiles
    #[display("CHR")]
    CharacterBank,
    /// 256 colors
    #[display("COL")]
    Palette,
    /// A single string variable
    #[display("MEM")]
    StringSlot,
    /// A full screen bitmap
    #[display("GRP")]
    Bitmap,
    /// A 64x64 tile map
    #[display("SCR")]
    TileMap,
}

impl TypeTag {
    /// Every type, in a stable order
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Program,
        TypeTag::CharacterBank,
        TypeTag::Palette,
        TypeTag::StringSlot,
        TypeTag::Bitmap,
        TypeTag::TileMap,
    ];

    /// The 8 character code stored after the `PETC` magic
    pub const fn code(&self) -> &'static [u8; 8] {
        match self {
            TypeTag::Program => b"0300RPRG",
            TypeTag::CharacterBank => b"0100RCHR",
            TypeTag::Palette => b"0100RCOL",
            TypeTag::StringSlot => b"0200RMEM",
            TypeTag::Bitmap => b"0100RGRP",
            TypeTag::TileMap => b"0100RSCR",
        }
    }

    /// Look up a type by its on-disk code, `None` if the code is unknown
    pub fn from_code(code: &[u8]) -> Option<TypeTag> {
        Self::ALL.into_iter().find(|tag| tag.code() == code)
    }

    /// Payload size in bytes, `None` for the variable sized program
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeTag::Program => None,
            TypeTag::CharacterBank => Some(8192),
            TypeTag::Palette => Some(512),
            TypeTag::StringSlot => Some(516),
            TypeTag::Bitmap => Some(49152),
            TypeTag::TileMap => Some(8192),
        }
    }
}

/// SD file header
///
/// Precedes the container when a resource is stored as a file. All data is stored in little
/// endian format.
#[derive(BinRead, BinWrite, Debug, Clone, Default, PartialEq, Eq)]
#[brw(magic = b"PX01", little)]
pub struct SdHeader {
    /// The size of the contents following this header
    pub file_size: u32,

    /// Unknown purpose, kept as read
    pub mystery: [u8; 4],

    /// Internal file name, ASCII `[A-Z0-9]{0,8}` padded with zeroes
    pub file_name: [u8; 8],

    /// MD5 digest of the container, see [`crate::hash`]
    pub hash: [u8; 16],

    /// Whether the hash has been checked: unknown, valid or invalid
    #[brw(ignore)]
    pub hash_valid: Option<bool>,
}

impl SdHeader {
    /// The internal file name without its padding
    pub fn name(&self) -> String {
        let end = self
            .file_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.file_name.len());
        String::from_utf8_lossy(&self.file_name[..end]).into_owned()
    }

    /// Replace the internal file name, truncating to 8 bytes
    pub fn set_name(&mut self, name: &str) {
        self.file_name = [0; 8];
        for (slot, byte) in self.file_name.iter_mut().zip(name.bytes()) {
            *slot = byte;
        }
    }
}

/// Bare container header
///
/// The `PETC` magic followed by the type code of the payload.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"PETC", little)]
pub struct ContainerHeader {
    /// The raw type code, see [`TypeTag::code`]
    pub type_code: [u8; 8],
}

impl ContainerHeader {
    pub fn new(tag: TypeTag) -> Self {
        Self {
            type_code: *tag.code(),
        }
    }

    /// The type this header declares, if known
    pub fn type_tag(&self) -> Option<TypeTag> {
        TypeTag::from_code(&self.type_code)
    }
}
