//! Dispatch from a container's type tag to the resource type that understands its payload
//!

use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::{debug, instrument};

use crate::chr::CharacterBank;
use crate::col::Palette;
use crate::container::{Container, DecodeOptions, EncodeOptions};
use crate::error::{Error, Result};
use crate::grp::Bitmap;
use crate::mem::StringSlot;
use crate::prg::Program;
use crate::scr::TileMap;
use crate::types::{SdHeader, TypeTag};

/// A resource type that can be read from and written to a container payload
pub trait Transcode: Sized {
    /// The type tag of containers holding this resource
    const TYPE: TypeTag;

    /// Decode a payload, without any framing
    fn decode_payload(payload: &[u8]) -> Result<Self>;

    /// Encode to a payload, without any framing
    fn encode_payload(&self) -> Result<Vec<u8>>;

    /// Decode the payload of a container, which must hold this type
    fn from_container(container: &Container) -> Result<Self> {
        if container.type_tag != Some(Self::TYPE) {
            return Err(Error::UnsupportedType(container.type_tag));
        }
        Self::decode_payload(&container.payload)
    }

    /// Wrap the encoded payload in a container
    fn to_container(&self, header: Option<SdHeader>) -> Result<Container> {
        Ok(Container {
            header,
            type_tag: Some(Self::TYPE),
            payload: self.encode_payload()?,
        })
    }

    /// Decode an SD file or bare container holding this type
    fn from_bytes(buf: &[u8], options: DecodeOptions) -> Result<Self> {
        Self::from_container(&Container::decode(buf, options)?)
    }

    /// Encode to an SD file or bare container
    fn to_bytes(&self, header: Option<SdHeader>, options: EncodeOptions) -> Result<Vec<u8>> {
        self.to_container(header)?.encode(options)
    }
}

/// Fails unless the payload has the fixed size of its type
pub(crate) fn expect_payload_size(tag: TypeTag, payload: &[u8]) -> Result<()> {
    match tag.fixed_size() {
        Some(expected) if payload.len() != expected => Err(Error::InvalidPayloadSize {
            tag,
            expected,
            actual: payload.len(),
        }),
        _ => Ok(()),
    }
}

/// Any decoded resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Program(Program),
    CharacterBank(CharacterBank),
    Palette(Palette),
    StringSlot(StringSlot),
    Bitmap(Bitmap),
    TileMap(TileMap),
}

macro_rules! resource_from {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Resource {
                fn from(value: $variant) -> Self {
                    Resource::$variant(value)
                }
            }
        )+
    };
}

resource_from!(Program, CharacterBank, Palette, StringSlot, Bitmap, TileMap);

impl Resource {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Resource::Program(_) => TypeTag::Program,
            Resource::CharacterBank(_) => TypeTag::CharacterBank,
            Resource::Palette(_) => TypeTag::Palette,
            Resource::StringSlot(_) => TypeTag::StringSlot,
            Resource::Bitmap(_) => TypeTag::Bitmap,
            Resource::TileMap(_) => TypeTag::TileMap,
        }
    }

    pub fn encode_payload(&self) -> Result<Vec<u8>> {
        match self {
            Resource::Program(r) => r.encode_payload(),
            Resource::CharacterBank(r) => r.encode_payload(),
            Resource::Palette(r) => r.encode_payload(),
            Resource::StringSlot(r) => r.encode_payload(),
            Resource::Bitmap(r) => r.encode_payload(),
            Resource::TileMap(r) => r.encode_payload(),
        }
    }

    /// Wrap the encoded payload in a container
    pub fn to_container(&self, header: Option<SdHeader>) -> Result<Container> {
        Ok(Container {
            header,
            type_tag: Some(self.type_tag()),
            payload: self.encode_payload()?,
        })
    }
}

/// How to decode one type of resource
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub tag: TypeTag,
    /// Payload size in bytes, `None` if variable
    pub fixed_size: Option<usize>,
    decode: fn(&[u8]) -> Result<Resource>,
}

fn decode_as<T: Transcode + Into<Resource>>(payload: &[u8]) -> Result<Resource> {
    T::decode_payload(payload).map(Into::into)
}

/// Table of the resource types that containers can be cast to
///
/// [`Registry::default`] knows every [`TypeTag`]. [`Registry::global`] is built once on first
/// use and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: IndexMap<TypeTag, RegistryEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry
            .register::<Program>()
            .register::<CharacterBank>()
            .register::<Palette>()
            .register::<StringSlot>()
            .register::<Bitmap>()
            .register::<TileMap>();
        registry
    }
}

impl Registry {
    /// A registry that can not cast anything
    pub fn empty() -> Self {
        Registry {
            entries: IndexMap::with_capacity(TypeTag::ALL.len()),
        }
    }

    /// The shared registry of all built in types
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::default)
    }

    /// Add a resource type, replacing any earlier entry for its tag
    pub fn register<T: Transcode + Into<Resource>>(&mut self) -> &mut Self {
        self.entries.insert(
            T::TYPE,
            RegistryEntry {
                tag: T::TYPE,
                fixed_size: T::TYPE.fixed_size(),
                decode: decode_as::<T>,
            },
        );
        self
    }

    pub fn entry(&self, tag: TypeTag) -> Option<&RegistryEntry> {
        self.entries.get(&tag)
    }

    /// Registered types in registration order
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.entries.keys().copied()
    }

    /// Decode a container into the resource type registered for its tag
    #[instrument(skip_all, fields(tag = ?container.type_tag), err)]
    pub fn cast(&self, container: &Container) -> Result<Resource> {
        let entry = container
            .type_tag
            .and_then(|tag| self.entries.get(&tag))
            .ok_or(Error::UnsupportedType(container.type_tag))?;

        debug!(size = container.payload.len(), "casting container");
        (entry.decode)(&container.payload)
    }
}

impl Container {
    /// Decode this container as a specific resource type
    pub fn cast<T: Transcode>(&self) -> Result<T> {
        T::from_container(self)
    }

    /// Decode this container with the global registry
    pub fn resource(&self) -> Result<Resource> {
        Registry::global().cast(self)
    }
}
