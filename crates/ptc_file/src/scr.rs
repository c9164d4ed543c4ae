//! Tile map (`SCR`) resources
//!
//! A 64x64 grid of tiles. On disk the grid is stored as four 32x32 quadrants, each tile as a
//! little endian `u16`.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{check_range, Error, Result};
use crate::registry::{expect_payload_size, Transcode};
use crate::types::TypeTag;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 64;

const TILES: usize = WIDTH * HEIGHT;

const CHARACTER_MASK: u16 = 0b0000_0011_1111_1111;
const FLIP_H: u16 = 0b0000_0100_0000_0000;
const FLIP_V: u16 = 0b0000_1000_0000_0000;

/// Visit every `(payload byte offset, tile slot)` pair of the quadrant layout
fn for_each_quadrant_tile(mut f: impl FnMut(usize, usize)) {
    for j in 0..2 {
        for i in 0..2 {
            for y in 0..32 {
                for x in 0..32 {
                    let offset = j * 4096 + i * 2048 + y * 64 + x * 2;
                    let slot = j * 2048 + y * 64 + i * 32 + x;
                    f(offset, slot);
                }
            }
        }
    }
}

/// A single tile of a tile map
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TileFields"))]
pub struct Tile {
    character: u16,
    palette: u16,
    /// Mirror the character horizontally
    pub flip_h: bool,
    /// Mirror the character vertically
    pub flip_v: bool,
}

/// Unchecked shape of a [`Tile`], deserialized then passed through [`Tile::new`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TileFields {
    character: u16,
    palette: u16,
    flip_h: bool,
    flip_v: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<TileFields> for Tile {
    type Error = Error;

    fn try_from(value: TileFields) -> Result<Self> {
        Tile::new(value.character, value.palette, value.flip_h, value.flip_v)
    }
}

impl Tile {
    pub fn new(character: u16, palette: u16, flip_h: bool, flip_v: bool) -> Result<Self> {
        let mut tile = Tile {
            flip_h,
            flip_v,
            ..Default::default()
        };
        tile.set_character(character)?;
        tile.set_palette(palette)?;
        Ok(tile)
    }

    /// Decode the raw tile word
    ///
    /// The palette field is read as `(raw >> 12) & 0xF000`, which is zero for every 16-bit
    /// word. Files written by other tools round trip only while their palette bits are clear.
    pub fn from_raw(raw: u16) -> Self {
        Tile {
            character: raw & CHARACTER_MASK,
            palette: (raw >> 12) & 0b1111_0000_0000_0000,
            flip_h: (raw & FLIP_H) == FLIP_H,
            flip_v: (raw & FLIP_V) == FLIP_V,
        }
    }

    /// Encode the raw tile word, failing if the palette does not fit in the top 4 bits
    pub fn to_raw(&self) -> Result<u16> {
        check_range("tile character index", self.character as usize, 1023)?;

        let mut raw = self.character as u32 | (self.palette as u32) << 12;
        if self.flip_h {
            raw |= FLIP_H as u32;
        }
        if self.flip_v {
            raw |= FLIP_V as u32;
        }

        u16::try_from(raw).map_err(|_| Error::out_of_range("tile raw value", raw as usize, 0xFFFF))
    }

    /// Decode four hex digits of the big endian raw word
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex).map_err(|_| Error::InvalidHex(hex.to_owned()))?;
        let [high, low] = bytes[..] else {
            return Err(Error::InvalidHex(hex.to_owned()));
        };
        Ok(Tile::from_raw(u16::from_be_bytes([high, low])))
    }

    /// The raw word as four hex digits, big endian
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_raw()?.to_be_bytes()))
    }

    pub fn character(&self) -> u16 {
        self.character
    }

    pub fn palette(&self) -> u16 {
        self.palette
    }

    pub fn set_character(&mut self, character: u16) -> Result<()> {
        check_range("tile character index", character as usize, 1023)?;
        self.character = character;
        Ok(())
    }

    pub fn set_palette(&mut self, palette: u16) -> Result<()> {
        check_range("tile palette index", palette as usize, 1023)?;
        self.palette = palette;
        Ok(())
    }
}

/// A 64x64 grid of tiles in row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    tiles: Vec<Tile>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self {
            tiles: vec![Tile::default(); TILES],
        }
    }
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles in row order, `y * 64 + x`
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn slot(x: usize, y: usize) -> Result<usize> {
        check_range("x index", x, WIDTH - 1)?;
        check_range("y index", y, HEIGHT - 1)?;
        Ok(y * WIDTH + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Tile> {
        Ok(self.tiles[Self::slot(x, y)?])
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> Result<()> {
        let slot = Self::slot(x, y)?;
        self.tiles[slot] = tile;
        Ok(())
    }
}

impl Transcode for TileMap {
    const TYPE: TypeTag = TypeTag::TileMap;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        expect_payload_size(Self::TYPE, payload)?;

        let mut tiles = vec![Tile::default(); TILES];
        for_each_quadrant_tile(|offset, slot| {
            tiles[slot] = Tile::from_raw(LittleEndian::read_u16(&payload[offset..]));
        });

        Ok(TileMap { tiles })
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut out = vec![0; TILES * 2];
        let mut failure = None;
        for_each_quadrant_tile(|offset, slot| match self.tiles[slot].to_raw() {
            Ok(raw) => LittleEndian::write_u16(&mut out[offset..], raw),
            Err(e) => {
                failure.get_or_insert(e);
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::registry::Transcode;
    use crate::scr::{Tile, TileMap};

    #[test]
    fn decode_tile_fields() {
        let tile = Tile::from_raw(0b0000_1101_0010_1010);

        assert_eq!(tile.character(), 0b01_0010_1010);
        assert!(tile.flip_h);
        assert!(tile.flip_v);
        assert_eq!(tile.palette(), 0);
    }

    #[test]
    fn palette_bits_are_not_decoded() {
        assert_eq!(Tile::from_raw(0xF000).palette(), 0);
        assert_eq!(Tile::from_raw(0x3000).palette(), 0);
    }

    #[test]
    fn encode_tile_fields() -> Result<()> {
        let tile = Tile::new(1023, 5, true, false)?;
        assert_eq!(tile.to_raw()?, 0x5000 | 0x0400 | 0x03FF);
        assert_eq!(tile.to_hex()?, "57ff");

        Ok(())
    }

    #[test]
    fn encode_palette_past_sixteen_bits() -> Result<()> {
        let tile = Tile::new(0, 16, false, false)?;
        assert!(matches!(tile.to_raw(), Err(Error::OutOfRange { .. })));

        Ok(())
    }

    #[test]
    fn encode_rejects_wide_character() {
        // only reachable by building the fields directly
        let tile = Tile {
            character: 0x0C00,
            ..Default::default()
        };

        assert!(matches!(
            tile.to_raw(),
            Err(Error::OutOfRange { value: 0x0C00, max: 1023, .. })
        ));
        assert!(tile.to_hex().is_err());

        let mut map = TileMap::new();
        map.tiles[0] = tile;
        assert!(matches!(map.encode_payload(), Err(Error::OutOfRange { .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_is_range_checked() {
        use crate::scr::TileFields;

        let fields = |character| TileFields {
            character,
            palette: 0,
            flip_h: true,
            flip_v: false,
        };

        assert_eq!(Tile::try_from(fields(1023)).ok(), Tile::new(1023, 0, true, false).ok());
        assert!(matches!(
            Tile::try_from(fields(0x0C00)),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn tile_setters_are_range_checked() {
        assert!(Tile::new(1024, 0, false, false).is_err());
        assert!(Tile::new(0, 1024, false, false).is_err());
        assert!(Tile::new(1023, 1023, false, false).is_ok());
    }

    #[test]
    fn hex() -> Result<()> {
        let tile = Tile::from_hex("0c01")?;
        assert_eq!(tile.character(), 1);
        assert!(tile.flip_h && tile.flip_v);
        assert_eq!(tile.to_hex()?, "0c01");

        assert!(Tile::from_hex("0c").is_err());

        Ok(())
    }

    #[test]
    fn decode_quadrants() -> Result<()> {
        let mut payload = vec![0u8; 8192];
        // second tile of the top left quadrant
        payload[2] = 0x01;
        // first tile of the top right quadrant
        payload[2048] = 0x02;
        // first tile of the bottom left quadrant
        payload[4096] = 0x03;
        // last tile of the bottom right quadrant
        payload[8190] = 0xFF;
        payload[8191] = 0x0F;

        let map = TileMap::decode_payload(&payload)?;
        assert_eq!(map.get(1, 0)?.character(), 1);
        assert_eq!(map.get(32, 0)?.character(), 2);
        assert_eq!(map.get(0, 32)?.character(), 3);

        let last = map.get(63, 63)?;
        assert_eq!(last.character(), 1023);
        assert!(last.flip_h && last.flip_v);

        assert_eq!(map.encode_payload()?, payload);

        Ok(())
    }

    #[test]
    fn decode_wrong_size() {
        assert!(matches!(
            TileMap::decode_payload(&[0; 8190]),
            Err(Error::InvalidPayloadSize { .. })
        ));
    }

    #[test]
    fn access_is_range_checked() -> Result<()> {
        let mut map = TileMap::new();
        map.set(63, 63, Tile::new(9, 0, false, true)?)?;

        assert_eq!(map.get(63, 63)?.character(), 9);
        assert_eq!(map.tiles()[4095].character(), 9);
        assert!(map.get(64, 0).is_err());
        assert!(map.set(0, 64, Tile::default()).is_err());

        Ok(())
    }
}
