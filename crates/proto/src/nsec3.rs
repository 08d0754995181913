//! The NSEC3 iterated hash primitive (`SPEC_FULL.md` section 4.2).
//!
//! `H(name) = iter(SHA1(name || salt), iterations)`, where `iter`
//! re-hashes `prev || salt` with SHA-1 `iterations` additional times. The
//! owner name of an NSEC3 RR is the base32hex (RFC 4648, lowercase, no
//! padding) encoding of this digest, with the zone apex appended.

use data_encoding::BASE32HEX_NOPAD;
use ring::digest;

use crate::error::{ProtoError, ProtoResult};
use crate::rr::domain::Name;

/// RFC 5155 section 3.1.3: the top bit of the 24-bit iterations field is
/// reserved; iterations must fit in 23 bits.
pub const MAX_ITERATIONS: u32 = 0x7f_ffff;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Nsec3HashAlgorithm {
    Sha1,
}

impl Nsec3HashAlgorithm {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Nsec3HashAlgorithm::Sha1),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Nsec3HashAlgorithm::Sha1 => 1,
        }
    }
}

/// The canonical wire-format bytes of `name`: fully expanded, lowercased
/// labels, no compression. This is the "x" that gets hashed — RFC 5155
/// section 5 note 2 ("original unexpanded form" for wildcards is honored
/// automatically since we never expand `*` here).
fn canonical_wire(name: &Name) -> Vec<u8> {
    let mut buf = Vec::with_capacity(name.wire_len());
    for label in name.iter() {
        let lower = label.to_lowercase();
        buf.push(lower.len() as u8);
        buf.extend_from_slice(&lower);
    }
    buf.push(0);
    buf
}

/// Computes `H(name)` with the given salt and iteration count, returning
/// the raw 20-byte SHA-1 digest (not yet base32hex-encoded).
pub fn hash(name: &Name, salt: &[u8], iterations: u32) -> ProtoResult<[u8; 20]> {
    if iterations > MAX_ITERATIONS {
        return Err(ProtoError::Nsec3IterationsTooLarge(iterations));
    }
    let mut input = canonical_wire(name);
    input.extend_from_slice(salt);
    let mut digest_bytes = sha1(&input);

    for _ in 0..iterations {
        let mut next = Vec::with_capacity(digest_bytes.len() + salt.len());
        next.extend_from_slice(&digest_bytes);
        next.extend_from_slice(salt);
        digest_bytes = sha1(&next);
    }
    Ok(digest_bytes)
}

fn sha1(input: &[u8]) -> [u8; 20] {
    let d = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, input);
    let mut out = [0u8; 20];
    out.copy_from_slice(d.as_ref());
    out
}

/// Base32hex-encodes a digest, lowercase, matching RFC 5155's owner-name
/// encoding (`data_encoding`'s `BASE32HEX_NOPAD` upper-cases by default).
pub fn base32hex_lower(digest: &[u8]) -> String {
    BASE32HEX_NOPAD.encode(digest).to_ascii_lowercase()
}

/// Decodes a base32hex owner-name label back into raw hash bytes, for
/// comparing a queried hash against NSEC3 owner labels stored in the tree.
pub fn base32hex_decode(label: &[u8]) -> ProtoResult<Vec<u8>> {
    let upper: Vec<u8> = label.iter().map(u8::to_ascii_uppercase).collect();
    BASE32HEX_NOPAD
        .decode(&upper)
        .map_err(|_| ProtoError::UnexpectedEof("nsec3 base32hex label"))
}

/// Hashes `name` and returns the owner name `<base32hex(H(name))>.<apex>`.
pub fn hashed_owner_name(name: &Name, apex: &Name, salt: &[u8], iterations: u32) -> ProtoResult<Name> {
    let digest = hash(name, salt, iterations)?;
    let label = base32hex_lower(&digest);
    let label_name = Name::parse(&label, None)?;
    label_name.concat(apex)
}
