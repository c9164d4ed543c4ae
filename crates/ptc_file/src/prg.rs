//! Program (`PRG`) resources
//!
//! A program is latin-1 text, optionally packaged together with other resources. Which
//! resources are present is given by a 45-bit package mask at the start of the payload; each set
//! bit is followed, in ascending order, by a bare container of the type that bit requires.
//!
//! | Offset   | Size | Contents                                      |
//! |----------|------|-----------------------------------------------|
//! | 0        | 4    | package mask, low 32 bits                     |
//! | 4        | 4    | package mask, high 13 bits                    |
//! | 8        | 4    | text length in bytes                          |
//! | 12       | n    | text                                          |
//! | 12 + n   | ...  | packaged bare containers, then any trailer    |

use binrw::BinWrite;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;
use std::io::{Cursor, Write};
use tracing::{instrument, trace};

use crate::container::{Container, DecodeOptions};
use crate::error::{check_range, Error, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::{ContainerHeader, TypeTag, CONTAINER_HEADER_SIZE, CONTAINER_MAGIC};

/// Number of package slots a program can carry
pub const PACKAGE_BITS: usize = 45;

const PROGRAM_HEADER_SIZE: usize = 12;
const MASK_HIGH_LIMIT: u32 = 1 << (PACKAGE_BITS - 32);

const fn package_slot(bit: usize) -> TypeTag {
    match bit {
        0 => TypeTag::StringSlot,
        1..=2 => TypeTag::CharacterBank,
        3..=5 => TypeTag::Palette,
        6..=9 => TypeTag::Bitmap,
        10..=11 => TypeTag::TileMap,
        _ => TypeTag::CharacterBank,
    }
}

/// The resource type each package mask bit carries
pub const PACKAGE_SLOTS: [TypeTag; PACKAGE_BITS] = {
    let mut slots = [TypeTag::CharacterBank; PACKAGE_BITS];
    let mut bit = 0;
    while bit < PACKAGE_BITS {
        slots[bit] = package_slot(bit);
        bit += 1;
    }
    slots
};

/// Program text with its packaged resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Program text, every character must be at most `U+00FF`
    pub content: String,

    /// Packaged resources, keyed by package mask bit
    pub embedded: IndexMap<u8, Container>,

    /// Bytes after the last packaged resource, kept as read
    pub trailer: Vec<u8>,
}

impl Program {
    pub fn new(content: impl Into<String>) -> Self {
        Program {
            content: content.into(),
            ..Default::default()
        }
    }

    /// The package mask describing [`Program::embedded`]
    pub fn package_mask(&self) -> Result<u64> {
        self.embedded.keys().try_fold(0u64, |mask, &bit| {
            check_range("package slot", bit as usize, PACKAGE_BITS - 1)?;
            Ok(mask | 1 << bit)
        })
    }

    /// Package a resource into a slot, replacing whatever it held
    pub fn embed<T: Transcode>(&mut self, bit: u8, resource: &T) -> Result<()> {
        let expected = slot_type(bit)?;
        if T::TYPE != expected {
            return Err(Error::PackageTypeMismatch {
                bit,
                expected,
                actual: Some(T::TYPE),
            });
        }

        self.embedded.insert(bit, resource.to_container(None)?);
        Ok(())
    }

    /// Decode the resource packaged in a slot, if any
    pub fn unpack<T: Transcode>(&self, bit: u8) -> Result<Option<T>> {
        self.embedded.get(&bit).map(Container::cast::<T>).transpose()
    }

    fn encode_text(&self) -> Result<Vec<u8>> {
        self.content
            .chars()
            .enumerate()
            .map(|(position, c)| {
                u8::try_from(u32::from(c)).map_err(|_| Error::IllegalCharacter {
                    character: c.into(),
                    position,
                })
            })
            .collect()
    }
}

fn slot_type(bit: u8) -> Result<TypeTag> {
    PACKAGE_SLOTS
        .get(bit as usize)
        .copied()
        .ok_or(Error::out_of_range("package slot", bit as usize, PACKAGE_BITS - 1))
}

impl Transcode for Program {
    const TYPE: TypeTag = TypeTag::Program;

    #[instrument(skip_all, fields(size = payload.len()), err)]
    fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < PROGRAM_HEADER_SIZE {
            return Err(Error::Truncated);
        }

        let mut reader = Cursor::new(payload);
        let mask_low = reader.read_u32::<LittleEndian>()?;
        let mask_high = reader.read_u32::<LittleEndian>()?;
        let text_length = reader.read_u32::<LittleEndian>()? as usize;

        let mask = (mask_high as u64) << 32 | mask_low as u64;
        if mask_high >= MASK_HIGH_LIMIT {
            return Err(Error::InvalidPackageMask(mask));
        }

        let text_end = PROGRAM_HEADER_SIZE
            .checked_add(text_length)
            .filter(|&end| end <= payload.len())
            .ok_or(Error::Truncated)?;
        let content = payload[PROGRAM_HEADER_SIZE..text_end]
            .iter()
            .map(|&b| b as char)
            .collect();

        let mut embedded = IndexMap::new();
        let mut offset = text_end;
        for (bit, &expected) in PACKAGE_SLOTS.iter().enumerate() {
            if mask & (1 << bit) == 0 {
                continue;
            }

            let size = expected
                .fixed_size()
                .ok_or(Error::UnsupportedType(Some(expected)))?
                + CONTAINER_HEADER_SIZE;
            let packed = payload
                .get(offset..offset + size)
                .ok_or(Error::Truncated)?;
            if &packed[..4] != CONTAINER_MAGIC {
                return Err(Error::MissingContainerMagic);
            }

            let container = Container::decode(packed, DecodeOptions::default())?;
            if container.type_tag != Some(expected) {
                return Err(Error::PackageTypeMismatch {
                    bit: bit as u8,
                    expected,
                    actual: container.type_tag,
                });
            }

            trace!(bit, tag = %expected, offset, "unpacked resource");
            embedded.insert(bit as u8, container);
            offset += size;
        }

        Ok(Program {
            content,
            embedded,
            trailer: payload[offset..].to_vec(),
        })
    }

    #[instrument(skip_all, fields(packages = self.embedded.len()), err)]
    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mask = self.package_mask()?;
        let text = self.encode_text()?;

        let mut bits: Vec<u8> = self.embedded.keys().copied().collect();
        bits.sort_unstable();

        let mut out = Cursor::new(Vec::with_capacity(PROGRAM_HEADER_SIZE + text.len()));
        out.write_u32::<LittleEndian>(mask as u32)?;
        out.write_u32::<LittleEndian>((mask >> 32) as u32)?;
        out.write_u32::<LittleEndian>(text.len() as u32)?;
        out.write_all(&text)?;

        for bit in bits {
            let expected = slot_type(bit)?;
            let container = &self.embedded[&bit];
            if container.type_tag != Some(expected) {
                return Err(Error::PackageTypeMismatch {
                    bit,
                    expected,
                    actual: container.type_tag,
                });
            }
            expect_payload_size(expected, &container.payload)?;

            trace!(bit, tag = %expected, "packing resource");
            ContainerHeader::new(expected).write(&mut out)?;
            out.write_all(&container.payload)?;
        }

        out.write_all(&self.trailer)?;
        Ok(out.into_inner())
    }
}
