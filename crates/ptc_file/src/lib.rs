//! This library handles reading and creating the resource files used by *Petit Computer*.
//!
//! # PTC File Format Documentation
//!
//! Every resource (programs, character banks, palettes, string variables, bitmaps and tile maps)
//! is stored in a **container**: the `PETC` magic, an 8 character type code and the payload. When a
//! resource is exchanged as a file the container is preceded by an **SD header**.
//!
//! ## SD Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "PX01"                                            |
//! | 0x0004         | File Size              | 4 bytes: Size of everything after this header              |
//! | 0x0008         | Unknown                | 4 bytes: Preserved as read                                 |
//! | 0x000C         | File Name              | 8 bytes: ASCII name, padded with zeroes                    |
//! | 0x0014         | Hash                   | 16 bytes: MD5 digest, see [`hash`]                         |
//!
//! ## Container
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "PETC"                                            |
//! | 0x0004         | Type Code              | 8 bytes: See table below                                   |
//! | 0x000C         | Payload                | Fixed size per type, except for programs                   |
//!
//! ### Type Codes
//!
//! | Code       | Resource                        | Payload size | Module      |
//! |------------|---------------------------------|--------------|-------------|
//! | `0300RPRG` | Program                         | variable     | [`prg`]     |
//! | `0100RCHR` | Character bank                  | 8192         | [`chr`]     |
//! | `0100RCOL` | Palette                         | 512          | [`col`]     |
//! | `0200RMEM` | String slot                     | 516          | [`mem`]     |
//! | `0100RGRP` | Bitmap                          | 49152        | [`grp`]     |
//! | `0100RSCR` | Tile map                        | 8192         | [`scr`]     |
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Colors**: 15-bit, 5 bits red, 6 bits green (one of them split off), 5 bits blue, see
//!   [`color`]
//!

pub mod chr;
pub mod col;
pub mod color;
pub mod container;
pub mod error;
pub mod grp;
pub mod hash;
pub mod mem;
pub mod prg;
pub mod registry;
pub mod scr;
pub mod types;

pub use chr::CharacterBank;
pub use col::Palette;
pub use color::Color;
pub use container::{Container, DecodeOptions, EncodeOptions};
pub use grp::Bitmap;
pub use mem::StringSlot;
pub use prg::Program;
pub use registry::{Registry, Resource, Transcode};
pub use scr::{Tile, TileMap};
pub use types::{SdHeader, TypeTag};

use tracing::{debug, instrument};

use crate::error::Result;
use crate::types::{CONTAINER_MAGIC, SD_MAGIC};

/// A parser for files that are not PTC resources
///
/// [`parse_buffer`] hands it every buffer that does not start with a PTC magic number.
pub trait ForeignParser {
    type Output;

    fn parse(&self, buf: &[u8]) -> Result<Self::Output>;
}

/// A decoded PTC resource together with the SD header it was read with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtcFile {
    pub header: Option<SdHeader>,
    pub resource: Resource,
}

/// The result of [`parse_buffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFile<F> {
    Ptc(PtcFile),
    Foreign(F),
}

/// Decode any PTC file, falling back to `foreign` for everything else
#[instrument(skip(buf, foreign), fields(size = buf.len()), err)]
pub fn parse_buffer<P: ForeignParser>(
    buf: &[u8],
    verify: bool,
    foreign: &P,
) -> Result<ParsedFile<P::Output>> {
    let magic = buf.get(..4);
    if magic != Some(&SD_MAGIC[..]) && magic != Some(&CONTAINER_MAGIC[..]) {
        debug!("not a PTC file, using foreign parser");
        return foreign.parse(buf).map(ParsedFile::Foreign);
    }

    let container = Container::decode(buf, DecodeOptions::builder().verify(verify).build())?;
    let resource = container.resource()?;

    Ok(ParsedFile::Ptc(PtcFile {
        header: container.header,
        resource,
    }))
}
