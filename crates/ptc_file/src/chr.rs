//! Character bank (`CHR`) resources
//!
//! A bank holds 256 characters of 64 cells each. Every cell is a 4-bit index into one 16 color
//! page of a [`Palette`]. On disk two cells share a byte, low nibble first.

use crate::col::Palette;
use crate::color::Color;
use crate::error::{check_range, Error, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::TypeTag;

/// Number of characters in a bank
pub const CHARACTERS: usize = 256;

/// Number of cells in a character
pub const CELLS: usize = 64;

const PACKED_CHARACTER_SIZE: usize = CELLS / 2;

/// A single character, one palette index per cell
pub type Character = [u8; CELLS];

/// 256 characters of packed 4-bit palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterBank {
    characters: Vec<Character>,
}

impl Default for CharacterBank {
    fn default() -> Self {
        Self {
            characters: vec![[0; CELLS]; CHARACTERS],
        }
    }
}

impl CharacterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells of a character
    pub fn character(&self, index: usize) -> Result<&Character> {
        check_range("character index", index, CHARACTERS - 1)?;
        Ok(&self.characters[index])
    }

    /// Mutable cells of a character
    ///
    /// Cells are not checked until the bank is encoded, which fails for any cell above 15.
    pub fn character_mut(&mut self, index: usize) -> Result<&mut Character> {
        check_range("character index", index, CHARACTERS - 1)?;
        Ok(&mut self.characters[index])
    }

    /// Resolve a 2D address to a cell index
    ///
    /// Addresses are `y * 64 + x` with both axes accepting 0-63, which only lands inside the
    /// 64 cells of a character on the first row.
    fn cell(character: usize, x: usize, y: usize) -> Result<usize> {
        check_range("character index", character, CHARACTERS - 1)?;
        check_range("x index", x, 63)?;
        check_range("y index", y, 63)?;

        let cell = y * 64 + x;
        if cell >= CELLS {
            return Err(Error::CellOutsideTile(cell));
        }
        Ok(cell)
    }

    /// Palette index of a cell
    pub fn get(&self, character: usize, x: usize, y: usize) -> Result<u8> {
        let cell = Self::cell(character, x, y)?;
        Ok(self.characters[character][cell])
    }

    /// Set the palette index of a cell
    pub fn set(&mut self, character: usize, x: usize, y: usize, color: u8) -> Result<()> {
        let cell = Self::cell(character, x, y)?;
        check_range("color index", color as usize, 15)?;
        self.characters[character][cell] = color;
        Ok(())
    }

    /// Resolve every cell of a character through one 16 color page of a palette
    pub fn character_with_palette(
        &self,
        character: usize,
        palette: &Palette,
        page: usize,
    ) -> Result<[Color; CELLS]> {
        check_range("character index", character, CHARACTERS - 1)?;
        check_range("palette page", page, 15)?;

        let base = page * 16;
        let mut out = [Color::default(); CELLS];
        for (color, &cell) in out.iter_mut().zip(self.characters[character].iter()) {
            let index = cell as usize + base;
            *color = *palette
                .get(index)
                .ok_or(Error::OutOfRange {
                    what: "palette index",
                    value: index,
                    max: palette.len() - 1,
                })?;
        }
        Ok(out)
    }
}

impl Transcode for CharacterBank {
    const TYPE: TypeTag = TypeTag::CharacterBank;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        expect_payload_size(Self::TYPE, payload)?;

        let characters = payload
            .chunks_exact(PACKED_CHARACTER_SIZE)
            .map(|packed| {
                let mut character = [0; CELLS];
                for (i, byte) in packed.iter().enumerate() {
                    character[i * 2] = byte & 0xF;
                    character[i * 2 + 1] = (byte >> 4) & 0xF;
                }
                character
            })
            .collect();

        Ok(CharacterBank { characters })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(CHARACTERS * PACKED_CHARACTER_SIZE);
        for character in &self.characters {
            for &cell in character {
                check_range("color index", cell as usize, 15)?;
            }
            out.extend(
                character
                    .chunks_exact(2)
                    .map(|pair| (pair[1] << 4) | pair[0]),
            );
        }
        Ok(out)
    }
}
