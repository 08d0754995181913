//! Wire-format decoding, with DNS name-compression-pointer following.

use crate::error::{ProtoError, ProtoResult};
use crate::rr::domain::{Label, Name};

/// RFC 1035 section 4.1.4: a compression pointer is the two high bits set
/// plus a 14-bit offset.
const POINTER_FLAG: u8 = 0xc0;
/// Defends against pointer loops: no legitimate message needs this many
/// indirections to resolve a name.
const MAX_POINTER_HOPS: usize = 32;

/// A cursor over a full DNS message buffer. Kept as a `&[u8]` plus position
/// (not an iterator) so name decompression can seek backward and resume.
pub struct BinDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BinDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        BinDecoder { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn peek(&self, field: &'static str) -> ProtoResult<u8> {
        self.buf.get(self.pos).copied().ok_or(ProtoError::UnexpectedEof(field))
    }

    pub fn read_u8(&mut self) -> ProtoResult<u8> {
        let v = self.peek("u8")?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> ProtoResult<u16> {
        if self.remaining() < 2 {
            return Err(ProtoError::UnexpectedEof("u16"));
        }
        let v = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> ProtoResult<u32> {
        if self.remaining() < 4 {
            return Err(ProtoError::UnexpectedEof("u32"));
        }
        let b = &self.buf[self.pos..self.pos + 4];
        let v = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 4;
        Ok(v)
    }

    pub fn read_slice(&mut self, len: usize, field: &'static str) -> ProtoResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtoError::UnexpectedEof(field));
        }
        let s = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }

    /// Reads a length-prefixed character-string.
    pub fn read_character_string(&mut self) -> ProtoResult<Box<[u8]>> {
        let len = self.read_u8()? as usize;
        Ok(self.read_slice(len, "character-string")?.into())
    }

    /// Decodes a name, following at most `MAX_POINTER_HOPS` compression
    /// pointers. Pointers may only point strictly backward, which combined
    /// with the hop limit rules out loops.
    pub fn read_name(&mut self) -> ProtoResult<Name> {
        self.read_name_inner().map(|(name, _)| name)
    }

    /// As [`Self::read_name`], but rejects any name that uses a
    /// compression pointer. Used for the question section's QNAME, which
    /// RFC 1035 section 4.1.4 compression never needs (nothing precedes
    /// it) and `spec.md` section 6 requires rejecting as `FORMERR`.
    pub fn read_name_uncompressed(&mut self) -> ProtoResult<Name> {
        let (name, used_pointer) = self.read_name_inner()?;
        if used_pointer {
            return Err(ProtoError::UnexpectedCompressionPointer);
        }
        Ok(name)
    }

    fn read_name_inner(&mut self) -> ProtoResult<(Name, bool)> {
        let mut labels: Vec<Label> = Vec::new();
        let mut cursor = self.pos;
        let mut hops = 0usize;
        let mut advanced_past: Option<usize> = None;
        let mut used_pointer = false;

        loop {
            let len_byte = *self.buf.get(cursor).ok_or(ProtoError::UnexpectedEof("name label length"))?;

            if len_byte == 0 {
                cursor += 1;
                if advanced_past.is_none() {
                    advanced_past = Some(cursor);
                }
                break;
            } else if len_byte & POINTER_FLAG == POINTER_FLAG {
                let hi = (len_byte & !POINTER_FLAG) as usize;
                let lo = *self.buf.get(cursor + 1).ok_or(ProtoError::UnexpectedEof("name pointer"))? as usize;
                let target = (hi << 8) | lo;
                if advanced_past.is_none() {
                    advanced_past = Some(cursor + 2);
                }
                if target >= cursor {
                    return Err(ProtoError::BadCompressionPointer);
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(ProtoError::BadCompressionPointer);
                }
                used_pointer = true;
                cursor = target;
            } else if len_byte & POINTER_FLAG != 0 {
                return Err(ProtoError::UnexpectedCompressionPointer);
            } else {
                let len = len_byte as usize;
                let start = cursor + 1;
                let end = start + len;
                let bytes = self.buf.get(start..end).ok_or(ProtoError::UnexpectedEof("name label"))?;
                labels.push(Label::new(bytes)?);
                cursor = end;
            }
        }

        self.pos = advanced_past.unwrap_or(cursor);
        Ok((Name::from_labels(labels)?, used_pointer))
    }
}
