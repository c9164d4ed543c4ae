//! Reading and writing the container framing shared by every resource type
//!

use binrw::{BinRead, BinWrite};
use bon::Builder;
use std::io::{Cursor, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::hash;
use crate::types::{
    ContainerHeader, SdHeader, TypeTag, CONTAINER_HEADER_SIZE, CONTAINER_MAGIC, SD_HEADER_SIZE,
    SD_MAGIC,
};

/// Options for how a container should be read
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct DecodeOptions {
    /// Check the SD header hash against the payload
    #[builder(default)]
    pub verify: bool,
}

/// Options for how a container should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct EncodeOptions {
    /// Emit an SD header in front of the container
    ///
    /// The header's `file_size` is written as stored and never recomputed. A header created for
    /// a container that had none carries `file_size = 0`; set it on [`Container::header`]
    /// beforehand if readers depend on it.
    #[builder(default = true)]
    pub sd_header: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { sd_header: true }
    }
}

/// A tagged payload, optionally wrapped in an SD header
///
/// ```
/// # fn doit() -> ptc_file::error::Result<()>
/// # {
/// use ptc_file::{Container, DecodeOptions, EncodeOptions, TypeTag};
///
/// let mut container = Container::new(TypeTag::Palette, vec![0; 512]);
/// let bytes = container.encode(EncodeOptions::default())?;
///
/// let decoded = Container::decode(&bytes, DecodeOptions::builder().verify(true).build())?;
/// assert_eq!(decoded.type_tag, Some(TypeTag::Palette));
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// The SD header, if read from or written to an SD file
    pub header: Option<SdHeader>,

    /// The resource type, `None` if an SD file carried an unknown type code
    pub type_tag: Option<TypeTag>,

    /// Contents after the SD header, `PETC` magic and type code
    pub payload: Vec<u8>,
}

impl Container {
    /// Create a bare container
    pub fn new(tag: TypeTag, payload: Vec<u8>) -> Self {
        Self {
            header: None,
            type_tag: Some(tag),
            payload,
        }
    }

    /// Attach an SD header to this container
    pub fn with_header(mut self, header: SdHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// Parse either an SD file or a bare container
    #[instrument(skip(buf), fields(size = buf.len()), err)]
    pub fn decode(buf: &[u8], options: DecodeOptions) -> Result<Container> {
        let magic = buf.get(..4).ok_or(Error::InvalidMagic)?;

        if magic == SD_MAGIC {
            Self::decode_sd(buf, options)
        } else if magic == CONTAINER_MAGIC {
            Self::decode_bare(buf)
        } else {
            Err(Error::InvalidMagic)
        }
    }

    fn decode_sd(buf: &[u8], options: DecodeOptions) -> Result<Container> {
        if buf.len() < SD_HEADER_SIZE + CONTAINER_HEADER_SIZE {
            return Err(Error::Truncated);
        }

        let mut reader = Cursor::new(buf);
        let mut header = SdHeader::read(&mut reader)?;
        let framing =
            ContainerHeader::read(&mut reader).map_err(|_| Error::MissingContainerMagic)?;
        let type_tag = framing.type_tag();
        let payload = buf[SD_HEADER_SIZE + CONTAINER_HEADER_SIZE..].to_vec();

        debug!(name = %header.name(), ?type_tag, "read sd file");

        if options.verify {
            let tag = type_tag.ok_or(Error::UnsupportedType(None))?;
            if !hash::verify(&mut header, tag, &payload) {
                return Err(Error::Integrity(Box::new(Container {
                    header: Some(header),
                    type_tag,
                    payload,
                })));
            }
        }

        Ok(Container {
            header: Some(header),
            type_tag,
            payload,
        })
    }

    fn decode_bare(buf: &[u8]) -> Result<Container> {
        if buf.len() < CONTAINER_HEADER_SIZE {
            return Err(Error::Truncated);
        }

        let framing = ContainerHeader::read(&mut Cursor::new(buf))?;
        let type_tag = framing.type_tag().ok_or_else(|| {
            Error::UnknownTypeCode(String::from_utf8_lossy(&framing.type_code).into_owned())
        })?;

        debug!(?type_tag, "read bare container");

        Ok(Container::new(type_tag, buf[CONTAINER_HEADER_SIZE..].to_vec()))
    }

    /// Serialize the container
    ///
    /// When an SD header is requested its hash is recomputed over the current payload first,
    /// creating a default header if this container had none. Every other header field,
    /// `file_size` included, is written exactly as stored.
    #[instrument(skip(self), fields(size = self.payload.len()), err)]
    pub fn encode(&mut self, options: EncodeOptions) -> Result<Vec<u8>> {
        let tag = self.type_tag.ok_or(Error::UnsupportedType(None))?;

        let mut out = Cursor::new(Vec::with_capacity(
            SD_HEADER_SIZE + CONTAINER_HEADER_SIZE + self.payload.len(),
        ));

        if options.sd_header {
            let header = self.header.get_or_insert_with(SdHeader::default);
            hash::stamp(header, tag, &self.payload);
            header.write(&mut out)?;
        }

        ContainerHeader::new(tag).write(&mut out)?;
        out.write_all(&self.payload)?;

        Ok(out.into_inner())
    }
}
