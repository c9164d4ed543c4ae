//! Color conversion between `COLSET`-style 8-bit channels and the raw palette format
//!
//! Petit Computer stores colors as 16 bits: 5 bits of red, 5 of blue and 6 of green. `COLSET`
//! and `COLREAD` take 8-bit channels, so setting a channel loses precision. The low bits that
//! `COLREAD` reports are not zero but depend on which range the original value fell in, so
//! the stored channel is `value & mask` combined with a range code.
//!
//! The raw format as a little endian `u16` is `GBBBBBGG GGGRRRRR`, with the bits of each
//! channel ordered `04321054 32143210`: a BGR555 word with the lowest green bit on top.

use crate::error::{check_range, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive upper bounds of the ranges that select the 3 low bits of red and blue
const RED_BLUE_RANGES: [u8; 8] = [23, 55, 95, 127, 159, 199, 231, 255];

/// Inclusive upper bounds of the ranges that select the 2 low bits of green
const GREEN_RANGES: [u8; 4] = [43, 127, 211, 255];

fn range_code(value: u8, upper_bounds: &[u8]) -> u8 {
    upper_bounds
        .iter()
        .position(|&max| value <= max)
        .unwrap_or(upper_bounds.len() - 1) as u8
}

/// Quantize an 8-bit red or blue channel the way `COLSET` stores it
pub fn quantize_5(value: u8) -> u8 {
    (value & 0b1111_1000) | range_code(value, &RED_BLUE_RANGES)
}

/// Quantize an 8-bit green channel the way `COLSET` stores it
pub fn quantize_6(value: u8) -> u8 {
    (value & 0b1111_1100) | range_code(value, &GREEN_RANGES)
}

/// A palette color
///
/// Channels are kept as `COLREAD` would report them. Setting a channel is lossy and later
/// reads return the quantized value, not the input.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Create a color from 8-bit channels, as `COLSET` would
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        let mut color = Color::default();
        color.set(Some(red), Some(green), Some(blue));
        color
    }

    /// Decode the raw 16-bit palette format
    pub fn from_raw(raw: u16) -> Self {
        let green = ((raw >> 4) & 0b111110) | ((raw >> 15) & 0b1);

        let mut color = Color::default();
        color.set_red(((raw & 0b11111) as u8) << 3);
        color.set_blue((((raw >> 10) & 0b11111) as u8) << 3);
        color.set_green((green as u8) << 2);
        color
    }

    /// Create a color from six hex digits in red, green, blue order
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex).map_err(|_| Error::InvalidHex(hex.to_owned()))?;
        let [red, green, blue] = bytes[..] else {
            return Err(Error::InvalidHex(hex.to_owned()));
        };
        Ok(Color::new(red, green, blue))
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn set_red(&mut self, red: u8) {
        self.red = quantize_5(red);
    }

    pub fn set_green(&mut self, green: u8) {
        self.green = quantize_6(green);
    }

    pub fn set_blue(&mut self, blue: u8) {
        self.blue = quantize_5(blue);
    }

    /// Set any of the 8-bit channels, leaving `None` channels untouched
    pub fn set(&mut self, red: Option<u8>, green: Option<u8>, blue: Option<u8>) {
        if let Some(red) = red {
            self.set_red(red);
        }
        if let Some(green) = green {
            self.set_green(green);
        }
        if let Some(blue) = blue {
            self.set_blue(blue);
        }
    }

    /// Red as stored by the hardware, 0-31
    pub fn raw_red(&self) -> u8 {
        self.red >> 3
    }

    /// Green as stored by the hardware, 0-63
    pub fn raw_green(&self) -> u8 {
        self.green >> 2
    }

    /// Blue as stored by the hardware, 0-31
    pub fn raw_blue(&self) -> u8 {
        self.blue >> 3
    }

    pub fn set_raw_red(&mut self, red: u8) -> Result<()> {
        check_range("raw red channel", red as usize, 31)?;
        self.set_red(red << 3);
        Ok(())
    }

    pub fn set_raw_green(&mut self, green: u8) -> Result<()> {
        check_range("raw green channel", green as usize, 63)?;
        self.set_green(green << 2);
        Ok(())
    }

    pub fn set_raw_blue(&mut self, blue: u8) -> Result<()> {
        check_range("raw blue channel", blue as usize, 31)?;
        self.set_blue(blue << 3);
        Ok(())
    }

    /// Set any of the raw channels, leaving `None` channels untouched
    ///
    /// Nothing is changed unless every given channel is in range.
    pub fn set_raw(&mut self, red: Option<u8>, green: Option<u8>, blue: Option<u8>) -> Result<()> {
        check_range("raw red channel", red.unwrap_or_default() as usize, 31)?;
        check_range("raw green channel", green.unwrap_or_default() as usize, 63)?;
        check_range("raw blue channel", blue.unwrap_or_default() as usize, 31)?;

        if let Some(red) = red {
            self.set_raw_red(red)?;
        }
        if let Some(green) = green {
            self.set_raw_green(green)?;
        }
        if let Some(blue) = blue {
            self.set_raw_blue(blue)?;
        }
        Ok(())
    }

    /// Encode to the raw 16-bit palette format
    pub fn to_raw(&self) -> u16 {
        let green = self.raw_green() as u16;

        self.raw_red() as u16
            | (self.raw_blue() as u16) << 10
            | (green & 0b111110) << 4
            | (green & 0b1) << 15
    }

    /// The stored channels as six lowercase hex digits
    pub fn to_hex(&self) -> String {
        hex::encode([self.red, self.green, self.blue])
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}
