//! Palette (`COL`) resources
//!

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use derive_more::derive::{Deref, Index};
use std::io::Cursor;

use crate::color::Color;
use crate::error::{check_range, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::TypeTag;

/// Number of colors in a palette
pub const PALETTE_COLORS: usize = 256;

/// 256 colors, indexed by palette slot
#[derive(Debug, Clone, PartialEq, Eq, Deref, Index)]
pub struct Palette {
    #[deref]
    #[index]
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![Color::default(); PALETTE_COLORS],
        }
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the color in a palette slot
    pub fn set_color(&mut self, index: usize, color: Color) -> Result<()> {
        check_range("palette index", index, PALETTE_COLORS - 1)?;
        self.colors[index] = color;
        Ok(())
    }

    /// Mutable access to a palette slot
    pub fn color_mut(&mut self, index: usize) -> Result<&mut Color> {
        check_range("palette index", index, PALETTE_COLORS - 1)?;
        Ok(&mut self.colors[index])
    }
}

impl Transcode for Palette {
    const TYPE: TypeTag = TypeTag::Palette;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        expect_payload_size(Self::TYPE, payload)?;

        let mut reader = Cursor::new(payload);
        let colors = (0..PALETTE_COLORS)
            .map(|_| Ok(Color::from_raw(reader.read_u16::<LittleEndian>()?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Palette { colors })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(PALETTE_COLORS * 2);
        for color in &self.colors {
            out.write_u16::<LittleEndian>(color.to_raw())?;
        }
        Ok(out)
    }
}
