use ptc_file::error::{Error, Result};
use ptc_file::mem::CODES;
use ptc_file::{
    Bitmap, CharacterBank, Color, Container, DecodeOptions, EncodeOptions, Palette, Program,
    Resource, SdHeader, StringSlot, Tile, TileMap, Transcode, TypeTag,
};
use tracing::info;
use tracing_test::traced_test;

fn named(name: &str) -> SdHeader {
    let mut header = SdHeader::default();
    header.set_name(name);
    header.mystery = [0x00, 0x00, 0x10, 0x00];
    header
}

fn verified() -> DecodeOptions {
    DecodeOptions::builder().verify(true).build()
}

/// Write a resource as an SD file, read it back with verification and write it again
fn validate_file_round_trip<T>(name: &str, resource: &T) -> Result<T>
where
    T: Transcode + PartialEq + std::fmt::Debug,
{
    info!("round tripping {} as {name}", T::TYPE);

    let bytes = resource.to_bytes(Some(named(name)), EncodeOptions::default())?;
    assert_eq!(&bytes[..4], b"PX01");
    assert_eq!(&bytes[36..40], b"PETC");
    assert_eq!(&bytes[40..48], T::TYPE.code());

    let mut container = Container::decode(&bytes, verified())?;
    let header = container.header.clone().unwrap_or_default();
    assert_eq!(header.name(), name);
    assert_eq!(header.hash_valid, Some(true));

    let decoded = container.cast::<T>()?;
    assert_eq!(&decoded, resource);

    assert_eq!(container.encode(EncodeOptions::default())?, bytes);
    assert_eq!(decoded.to_bytes(Some(header), EncodeOptions::default())?, bytes);

    Ok(decoded)
}

#[traced_test]
#[test]
fn character_bank_file() -> Result<()> {
    let mut bank = CharacterBank::new();
    for character in 0..256 {
        for x in 0..64 {
            bank.set(character, x, 0, ((character + x) % 16) as u8)?;
        }
    }

    validate_file_round_trip("BGF0", &bank)?;
    Ok(())
}

#[traced_test]
#[test]
fn palette_file() -> Result<()> {
    let mut palette = Palette::new();
    for index in 0..256 {
        let value = index as u8;
        palette.set_color(index, Color::new(value, 255 - value, value.wrapping_mul(7)))?;
    }

    let decoded = validate_file_round_trip("COL0", &palette)?;
    assert_eq!(decoded[255], Color::new(255, 0, 255u8.wrapping_mul(7)));

    Ok(())
}

#[traced_test]
#[test]
fn bitmap_file() -> Result<()> {
    let mut bitmap = Bitmap::new();
    for (i, pixel) in bitmap.image_mut().iter_mut().enumerate() {
        *pixel = (i % 251) as u8;
    }

    validate_file_round_trip("GRP0", &bitmap)?;
    Ok(())
}

#[traced_test]
#[test]
fn tile_map_file() -> Result<()> {
    let mut map = TileMap::new();
    for y in 0..64 {
        for x in 0..64 {
            let tile = Tile::new(((y * 64 + x) % 1024) as u16, 0, x % 2 == 0, y % 3 == 0)?;
            map.set(x, y, tile)?;
        }
    }

    validate_file_round_trip("SCU0", &map)?;
    Ok(())
}

#[traced_test]
#[test]
fn string_slot_file() -> Result<()> {
    let slot = StringSlot::new("HELLO, WORLD")?;
    let decoded = validate_file_round_trip("MEM", &slot)?;

    // printable ASCII is shown as full-width forms, space is kept
    assert_eq!(
        decoded.to_unicode()?,
        "\u{ff28}\u{ff25}\u{ff2c}\u{ff2c}\u{ff2f}\u{ff0c} \u{ff37}\u{ff2f}\u{ff32}\u{ff2c}\u{ff24}"
    );

    Ok(())
}

#[traced_test]
#[test]
fn string_slot_with_every_character() -> Result<()> {
    let mut payload = Vec::with_capacity(516);
    for code in CODES {
        payload.extend_from_slice(&code.to_le_bytes());
    }
    payload.extend_from_slice(&256u32.to_le_bytes());

    let slot = StringSlot::decode_payload(&payload)?;
    let bytes: Vec<u32> = slot.content().chars().map(u32::from).collect();
    assert_eq!(bytes, (0..=255).collect::<Vec<u32>>());

    assert_eq!(slot.encode_payload()?, payload);
    validate_file_round_trip("ALLCHARS", &slot)?;

    Ok(())
}

#[traced_test]
#[test]
fn program_file_with_package() -> Result<()> {
    let mut bank = CharacterBank::new();
    bank.set(1, 1, 0, 1)?;
    let mut palette = Palette::new();
    palette.set_color(1, Color::from_hex("ff8000")?)?;

    let mut program = Program::new("ACLS\rCHRINIT \"BGU0\"\r");
    program.embed(1, &bank)?;
    program.embed(3, &palette)?;

    let decoded = validate_file_round_trip("GAME", &program)?;
    assert_eq!(decoded.unpack::<CharacterBank>(1)?, Some(bank));
    assert_eq!(decoded.unpack::<Palette>(3)?, Some(palette));

    Ok(())
}

#[traced_test]
#[test]
fn bare_container_round_trip() -> Result<()> {
    let map = TileMap::new();
    let bytes = map.to_bytes(None, EncodeOptions::builder().sd_header(false).build())?;
    assert_eq!(bytes.len(), 12 + 8192);
    assert_eq!(&bytes[..12], b"PETC0100RSCR");

    let container = Container::decode(&bytes, DecodeOptions::default())?;
    assert_eq!(container.header, None);
    assert_eq!(container.resource()?, Resource::TileMap(map));

    Ok(())
}

#[traced_test]
#[test]
fn corrupted_file_fails_verification() -> Result<()> {
    let mut bytes = Palette::new().to_bytes(Some(named("COL1")), EncodeOptions::default())?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    match Container::decode(&bytes, verified()) {
        Err(Error::Integrity(container)) => {
            assert_eq!(container.type_tag, Some(TypeTag::Palette));
            assert!(container.cast::<Palette>().is_ok());
        }
        other => panic!("expected integrity error, got {other:?}"),
    }

    assert!(Palette::from_bytes(&bytes, DecodeOptions::default()).is_ok());

    Ok(())
}

#[traced_test]
#[test]
fn wrong_payload_size_in_file() -> Result<()> {
    let mut container = Container::new(TypeTag::Bitmap, vec![0; 100]);
    let bytes = container.encode(EncodeOptions::default())?;

    assert!(matches!(
        Bitmap::from_bytes(&bytes, verified()),
        Err(Error::InvalidPayloadSize {
            tag: TypeTag::Bitmap,
            expected: 49152,
            actual: 100
        })
    ));

    Ok(())
}
