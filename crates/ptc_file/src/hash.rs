//! Integrity hash of SD files.
//!
//! The hash is an MD5 digest over `"PETITCOM"`, the `"PETC"` magic, the type code and the
//! payload, in that order. It only guards against accidental corruption.

use md5::{Digest, Md5};
use tracing::{instrument, warn};

use crate::types::{SdHeader, TypeTag, CONTAINER_MAGIC};

const DOMAIN: &[u8; 8] = b"PETITCOM";

/// Compute the digest stored in the SD header for a payload
pub fn hash(tag: TypeTag, payload: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(DOMAIN);
    hasher.update(CONTAINER_MAGIC);
    hasher.update(tag.code());
    hasher.update(payload);

    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Compare the header's digest against the payload, recording the outcome in the header
#[instrument(skip(header, payload), fields(size = payload.len()))]
pub fn verify(header: &mut SdHeader, tag: TypeTag, payload: &[u8]) -> bool {
    let valid = hash(tag, payload) == header.hash;
    if !valid {
        warn!("hash mismatch for {}", header.name());
    }
    header.hash_valid = Some(valid);
    valid
}

/// Recompute the header's digest for a payload that is about to be written
pub fn stamp(header: &mut SdHeader, tag: TypeTag, payload: &[u8]) {
    header.hash = hash(tag, payload);
    header.hash_valid = Some(true);
}
