//! String slot (`MEM`) resources
//!
//! A single string variable of up to 256 characters. Each character is stored as a little
//! endian `u16` code from [`CODES`], followed by the character count at offset 512.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;
use widestring::U16String;

use crate::error::{Error, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::TypeTag;

/// Maximum number of characters in a string slot
pub const MAX_CHARACTERS: usize = 256;

const LENGTH_OFFSET: usize = MAX_CHARACTERS * 2;

/// Stored code of every character byte, indexed by byte
///
/// The codes are the Unicode code points of the glyphs in the console font: ASCII controls,
/// full-width forms in place of printable ASCII, and half-width kana rendered as full-width
/// katakana.
#[rustfmt::skip]
pub const CODES: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007,
    0x0008, 0x0009, 0x000A, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    0x0010, 0x0011, 0x0012, 0x0013, 0x0014, 0x0015, 0x0016, 0x0017,
    0x0018, 0x0019, 0x001A, 0x001B, 0x001C, 0x001D, 0x001E, 0x001F,
    0x0020, 0xFF01, 0x201D, 0xFF03, 0xFF04, 0xFF05, 0xFF06, 0x2019,
    0xFF08, 0xFF09, 0xFF0A, 0xFF0B, 0xFF0C, 0xFF0D, 0xFF0E, 0xFF0F,
    0xFF10, 0xFF11, 0xFF12, 0xFF13, 0xFF14, 0xFF15, 0xFF16, 0xFF17,
    0xFF18, 0xFF19, 0xFF1A, 0xFF1B, 0xFF1C, 0xFF1D, 0xFF1E, 0xFF1F,
    0xFF20, 0xFF21, 0xFF22, 0xFF23, 0xFF24, 0xFF25, 0xFF26, 0xFF27,
    0xFF28, 0xFF29, 0xFF2A, 0xFF2B, 0xFF2C, 0xFF2D, 0xFF2E, 0xFF2F,
    0xFF30, 0xFF31, 0xFF32, 0xFF33, 0xFF34, 0xFF35, 0xFF36, 0xFF37,
    0xFF38, 0xFF39, 0xFF3A, 0xFF3B, 0xFFE5, 0xFF3D, 0xFF3E, 0xFF3F,
    0xFF40, 0xFF41, 0xFF42, 0xFF43, 0xFF44, 0xFF45, 0xFF46, 0xFF47,
    0xFF48, 0xFF49, 0xFF4A, 0xFF4B, 0xFF4C, 0xFF4D, 0xFF4E, 0xFF4F,
    0xFF50, 0xFF51, 0xFF52, 0xFF53, 0xFF54, 0xFF55, 0xFF56, 0xFF57,
    0xFF58, 0xFF59, 0xFF5A, 0xFF5B, 0xFF5C, 0xFF5D, 0xFF5E, 0xFF5F,
    0x0080, 0x0081, 0x0082, 0x0083, 0x0084, 0x0085, 0x0086, 0x0087,
    0x0088, 0x0089, 0x008A, 0x008B, 0x008C, 0x008D, 0x008E, 0x008F,
    0x0090, 0x0091, 0x0092, 0x0093, 0x0094, 0x0095, 0x0096, 0x0097,
    0x0098, 0x0099, 0x009A, 0x009B, 0x009C, 0x009D, 0x009E, 0x009F,
    0x00A0, 0x3002, 0x300C, 0x300D, 0x3001, 0x30FB, 0x30F2, 0x30A1,
    0x30A3, 0x30A5, 0x30A7, 0x30A9, 0x30E3, 0x30E5, 0x30E7, 0x30C3,
    0xFF70, 0x30A2, 0x30A4, 0x30A6, 0x30A8, 0x30AA, 0x30AB, 0x30AD,
    0x30AF, 0x30B1, 0x30B3, 0x30B5, 0x30B7, 0x30B9, 0x30BB, 0x30BD,
    0x30BF, 0x30C1, 0x30C4, 0x30C6, 0x30C8, 0x30CA, 0x30CB, 0x30CC,
    0x30CD, 0x30CE, 0x30CF, 0x30D2, 0x30D5, 0x30D8, 0x30DB, 0x30DE,
    0x30DF, 0x30E0, 0x30E1, 0x30E2, 0x30E4, 0x30E6, 0x30E8, 0x30E9,
    0x30EA, 0x30EB, 0x30EC, 0x30ED, 0x30EF, 0x30F3, 0x309B, 0x309C,
    0x00E0, 0x00E1, 0x00E2, 0x00E3, 0x00E4, 0x00E5, 0x00E6, 0x00E7,
    0x00E8, 0x00E9, 0x00EA, 0x00EB, 0x00EC, 0x00ED, 0x00EE, 0x00EF,
    0x00F0, 0x00F1, 0x00F2, 0x00F3, 0x00F4, 0x00F5, 0x00F6, 0x00F7,
    0x00F8, 0x00F9, 0x00FA, 0x00FB, 0x00FC, 0x00FD, 0x00FE, 0x00FF,
];

/// The character byte a stored code stands for, if any
pub fn byte_for_code(code: u16) -> Option<u8> {
    CODES.iter().position(|&c| c == code).map(|byte| byte as u8)
}

/// The stored code of a character byte
pub fn code_for_byte(byte: u8) -> u16 {
    CODES[byte as usize]
}

/// A string variable
///
/// Every character of the content is in the range U+0000 to U+00FF, one per byte of the
/// console's character set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringSlot {
    content: String,
}

impl StringSlot {
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let mut slot = StringSlot::default();
        slot.set_content(content)?;
        Ok(slot)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content, failing if it is longer than 256 characters
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let count = content.chars().count();
        if count > MAX_CHARACTERS {
            return Err(Error::StringTooLong(count));
        }
        self.content = content;
        Ok(())
    }

    /// The content as the console displays it
    pub fn to_unicode(&self) -> Result<String> {
        let codes = self
            .content
            .chars()
            .enumerate()
            .map(|(position, c)| character_byte(c, position).map(code_for_byte))
            .collect::<Result<Vec<_>>>()?;

        Ok(U16String::from_vec(codes).to_string_lossy())
    }
}

fn character_byte(c: char, position: usize) -> Result<u8> {
    u8::try_from(u32::from(c)).map_err(|_| Error::IllegalCharacter {
        character: c.into(),
        position,
    })
}

impl Transcode for StringSlot {
    const TYPE: TypeTag = TypeTag::StringSlot;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        expect_payload_size(Self::TYPE, payload)?;

        let mut reader = Cursor::new(payload);
        reader.set_position(LENGTH_OFFSET as u64);
        let length = reader.read_u32::<LittleEndian>()? as usize;
        reader.set_position(0);

        let mut content = String::with_capacity(length.min(MAX_CHARACTERS));
        for position in 0..MAX_CHARACTERS {
            let code = reader.read_u16::<LittleEndian>()?;
            if position >= length {
                if code != 0 {
                    return Err(Error::DataAfterLength(length));
                }
                continue;
            }

            let byte = byte_for_code(code).ok_or(Error::InvalidCode { code, position })?;
            content.push(char::from(byte));
        }

        Ok(StringSlot { content })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let count = self.content.chars().count();
        if count > MAX_CHARACTERS {
            return Err(Error::StringTooLong(count));
        }

        let mut out = Cursor::new(vec![0u8; LENGTH_OFFSET + 4]);
        for (position, c) in self.content.chars().enumerate() {
            out.write_u16::<LittleEndian>(code_for_byte(character_byte(c, position)?))?;
        }

        out.set_position(LENGTH_OFFSET as u64);
        out.write_u32::<LittleEndian>(count as u32)?;

        Ok(out.into_inner())
    }
}
