use ptc_file::error::{Error, Result};
use ptc_file::{
    parse_buffer, EncodeOptions, ForeignParser, Palette, ParsedFile, PtcFile, Resource, SdHeader,
    StringSlot, Transcode, TypeTag,
};
use tracing_test::traced_test;

/// Stands in for the SmileBASIC side, accepting anything with its magic
struct SmileBasic;

impl ForeignParser for SmileBasic {
    type Output = usize;

    fn parse(&self, buf: &[u8]) -> Result<usize> {
        if buf.starts_with(b"\x01\x00") {
            Ok(buf.len())
        } else {
            Err(Error::InvalidMagic)
        }
    }
}

#[traced_test]
#[test]
fn parse_sd_file() -> Result<()> {
    let slot = StringSlot::new("SAVE")?;
    let bytes = slot.to_bytes(Some(SdHeader::default()), EncodeOptions::default())?;

    match parse_buffer(&bytes, true, &SmileBasic)? {
        ParsedFile::Ptc(PtcFile { header, resource }) => {
            assert_eq!(header.and_then(|h| h.hash_valid), Some(true));
            assert_eq!(resource, Resource::StringSlot(slot));
        }
        ParsedFile::Foreign(_) => panic!("parsed as foreign file"),
    }

    Ok(())
}

#[traced_test]
#[test]
fn parse_bare_container() -> Result<()> {
    let bytes = Palette::new().to_bytes(None, EncodeOptions::builder().sd_header(false).build())?;

    let parsed = parse_buffer(&bytes, false, &SmileBasic)?;
    assert_eq!(
        parsed,
        ParsedFile::Ptc(PtcFile {
            header: None,
            resource: Resource::Palette(Palette::new()),
        })
    );

    Ok(())
}

#[traced_test]
#[test]
fn parse_foreign_file() -> Result<()> {
    let parsed = parse_buffer(b"\x01\x00\x00\x00BASIC", false, &SmileBasic)?;
    assert_eq!(parsed, ParsedFile::Foreign(9));

    assert!(matches!(
        parse_buffer(b"JUNK", false, &SmileBasic),
        Err(Error::InvalidMagic)
    ));
    assert!(matches!(
        parse_buffer(b"", false, &SmileBasic),
        Err(Error::InvalidMagic)
    ));

    Ok(())
}

#[traced_test]
#[test]
fn parse_unknown_type_in_sd_file() -> Result<()> {
    let mut bytes =
        StringSlot::default().to_bytes(Some(SdHeader::default()), EncodeOptions::default())?;
    bytes[40..48].copy_from_slice(b"0100RXYZ");

    assert!(matches!(
        parse_buffer(&bytes, false, &SmileBasic),
        Err(Error::UnsupportedType(None))
    ));
    assert!(matches!(
        parse_buffer(&bytes, true, &SmileBasic),
        Err(Error::UnsupportedType(None))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn parse_with_bad_hash() -> Result<()> {
    let mut bytes = Palette::new().to_bytes(Some(SdHeader::default()), EncodeOptions::default())?;
    bytes[20] ^= 0xFF;

    assert!(matches!(
        parse_buffer(&bytes, true, &SmileBasic),
        Err(Error::Integrity(container)) if container.type_tag == Some(TypeTag::Palette)
    ));
    assert!(parse_buffer(&bytes, false, &SmileBasic).is_ok());

    Ok(())
}
