//! Wire-format encoding, with DNS name compression (RFC 1035 section 4.1.4).

use std::collections::HashMap;

use crate::error::{ProtoError, ProtoResult};
use crate::rr::domain::Name;

/// The largest offset a compression pointer can address.
const MAX_POINTER_OFFSET: usize = 0x3fff;

/// Accumulates wire bytes for a `Message`, tracking previously emitted
/// names so later occurrences of the same suffix can be compressed into a
/// two-byte pointer, mirroring hickory's `BinEncoder`.
pub struct BinEncoder {
    buf: Vec<u8>,
    name_offsets: HashMap<Vec<Box<[u8]>>, u16>,
    canonical_names: bool,
}

impl BinEncoder {
    pub fn new() -> Self {
        BinEncoder {
            buf: Vec::new(),
            name_offsets: HashMap::new(),
            canonical_names: false,
        }
    }

    /// An encoder that never compresses and always lowercases names, for
    /// producing the canonical form DNSSEC signatures are computed over.
    pub fn canonical() -> Self {
        BinEncoder {
            buf: Vec::new(),
            name_offsets: HashMap::new(),
            canonical_names: true,
        }
    }

    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn emit_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn emit_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn emit_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn emit_vec(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Emits a length-prefixed character-string (RFC 1035 section 3.3),
    /// used for TXT rdata segments.
    pub fn emit_character_string(&mut self, bytes: &[u8]) -> ProtoResult<()> {
        if bytes.len() > 255 {
            return Err(ProtoError::LabelTooLong(bytes.len()));
        }
        self.emit_u8(bytes.len() as u8);
        self.emit_vec(bytes);
        Ok(())
    }

    /// Reserves two bytes for a length field to be backpatched once the
    /// caller knows how much it wrote (used for RDLENGTH).
    pub fn start_length_prefixed(&mut self) -> usize {
        let pos = self.buf.len();
        self.emit_u16(0);
        pos
    }

    pub fn commit_length_prefixed(&mut self, start: usize) -> ProtoResult<()> {
        let len = self.buf.len() - start - 2;
        if len > u16::MAX as usize {
            return Err(ProtoError::MalformedRdata(crate::rr::RecordType::Unknown(0)));
        }
        let len_bytes = (len as u16).to_be_bytes();
        self.buf[start] = len_bytes[0];
        self.buf[start + 1] = len_bytes[1];
        Ok(())
    }

    /// Emits `name`, compressing against previously emitted names when
    /// possible and allowed, then recording every suffix of `name` (down
    /// to, but excluding, the root) at the offset it starts.
    pub fn emit_name(&mut self, name: &Name, compress: bool) -> ProtoResult<()> {
        let mut remaining: Vec<Box<[u8]>> = name.iter().map(|l| l.to_lowercase()).collect();

        loop {
            if remaining.is_empty() {
                self.emit_u8(0);
                return Ok(());
            }

            if compress && !self.canonical_names {
                if let Some(&offset) = self.name_offsets.get(&remaining) {
                    self.emit_u16(0xc000 | offset);
                    return Ok(());
                }
            }

            if self.offset() <= MAX_POINTER_OFFSET {
                self.name_offsets.insert(remaining.clone(), self.offset() as u16);
            }

            let label = remaining.remove(0);
            self.emit_u8(label.len() as u8);
            self.emit_vec(&label);
        }
    }
}

impl Default for BinEncoder {
    fn default() -> Self {
        Self::new()
    }
}
