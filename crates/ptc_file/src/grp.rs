//! Bitmap (`GRP`) resources
//!
//! A 256x192 image of palette indices. The payload is not in raster order: the screen is
//! split into 3 layers of 4 columns, each column holding 8x8 characters of 8x8 pixels.

use crate::col::Palette;
use crate::color::Color;
use crate::error::{check_range, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::TypeTag;

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 192;

const PIXELS: usize = WIDTH * HEIGHT;

/// Visit every `(payload, raster)` index pair of the block layout
///
/// Format documented at <https://petitcomputer.fandom.com/wiki/GRP_File_Format_(External)>
fn for_each_block_pixel(mut f: impl FnMut(usize, usize)) {
    for l in 0..3 {
        for k in 0..4 {
            for j in 0..8 {
                for i in 0..8 {
                    for y in 0..8 {
                        for x in 0..8 {
                            let payload = l * 16384 + k * 4096 + j * 512 + i * 64 + y * 8 + x;
                            let raster = l * 16384 + k * 64 + j * 2048 + i * 8 + y * 256 + x;
                            f(payload, raster);
                        }
                    }
                }
            }
        }
    }
}

/// A full screen bitmap in raster order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    image: Vec<u8>,
}

impl Default for Bitmap {
    fn default() -> Self {
        Self {
            image: vec![0; PIXELS],
        }
    }
}

impl Bitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels in raster order, `y * 256 + x`
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    fn pixel(x: usize, y: usize) -> Result<usize> {
        check_range("pixel x index", x, WIDTH - 1)?;
        check_range("pixel y index", y, HEIGHT - 1)?;
        Ok(y * WIDTH + x)
    }

    /// Palette index of a pixel
    pub fn get(&self, x: usize, y: usize) -> Result<u8> {
        Ok(self.image[Self::pixel(x, y)?])
    }

    /// Set the palette index of a pixel
    pub fn set(&mut self, x: usize, y: usize, color: u8) -> Result<()> {
        let pixel = Self::pixel(x, y)?;
        self.image[pixel] = color;
        Ok(())
    }

    /// Resolve every pixel through a palette, in raster order
    pub fn image_with_palette(&self, palette: &Palette) -> Vec<Color> {
        self.image
            .iter()
            .map(|&index| palette[index as usize])
            .collect()
    }
}

impl Transcode for Bitmap {
    const TYPE: TypeTag = TypeTag::Bitmap;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        expect_payload_size(Self::TYPE, payload)?;

        let mut image = vec![0; PIXELS];
        for_each_block_pixel(|from, to| image[to] = payload[from]);

        Ok(Bitmap { image })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut out = vec![0; PIXELS];
        for_each_block_pixel(|to, from| out[to] = self.image[from]);

        Ok(out)
    }
}
