//! RDATA encode/decode, dispatched on `RecordType`.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{ProtoError, ProtoResult};
use crate::rr::domain::Name;
use crate::rr::rdata::{Dnskey, Ds, Mx, Nsec, Nsec3, Nsec3Param, RData, Rrsig, Soa, Srv, TypeBitMaps};
use crate::rr::record_type::RecordType;
use crate::serialize::binary::decoder::BinDecoder;
use crate::serialize::binary::encoder::BinEncoder;

pub fn encode_rdata(encoder: &mut BinEncoder, rdata: &RData) -> ProtoResult<()> {
    match rdata {
        RData::A(addr) => encoder.emit_vec(&addr.octets()),
        RData::AAAA(addr) => encoder.emit_vec(&addr.octets()),
        RData::Ns(name) => encoder.emit_name(name, true)?,
        RData::Cname(name) => encoder.emit_name(name, true)?,
        RData::Ptr(name) => encoder.emit_name(name, true)?,
        RData::Soa(soa) => {
            encoder.emit_name(&soa.mname, true)?;
            encoder.emit_name(&soa.rname, true)?;
            encoder.emit_u32(soa.serial);
            encoder.emit_u32(soa.refresh);
            encoder.emit_u32(soa.retry);
            encoder.emit_u32(soa.expire);
            encoder.emit_u32(soa.minimum);
        }
        RData::Mx(mx) => {
            encoder.emit_u16(mx.preference);
            encoder.emit_name(&mx.exchange, true)?;
        }
        RData::Srv(srv) => {
            encoder.emit_u16(srv.priority);
            encoder.emit_u16(srv.weight);
            encoder.emit_u16(srv.port);
            // SRV targets must not be compressed, per RFC 2782.
            encoder.emit_name(&srv.target, false)?;
        }
        RData::Txt(segments) => {
            for seg in segments {
                encoder.emit_character_string(seg)?;
            }
        }
        RData::Ds(ds) => {
            encoder.emit_u16(ds.key_tag);
            encoder.emit_u8(ds.algorithm);
            encoder.emit_u8(ds.digest_type);
            encoder.emit_vec(&ds.digest);
        }
        RData::Rrsig(sig) => {
            encoder.emit_u16(sig.type_covered.to_u16());
            encoder.emit_u8(sig.algorithm);
            encoder.emit_u8(sig.labels);
            encoder.emit_u32(sig.original_ttl);
            encoder.emit_u32(sig.sig_expiration);
            encoder.emit_u32(sig.sig_inception);
            encoder.emit_u16(sig.key_tag);
            // RRSIG owner/signer names are never compressed (RFC 4034 s.6.2).
            encoder.emit_name(&sig.signer_name, false)?;
            encoder.emit_vec(&sig.signature);
        }
        RData::Nsec(nsec) => {
            encoder.emit_name(&nsec.next_domain_name, false)?;
            encoder.emit_vec(&nsec.type_bit_maps.to_wire());
        }
        RData::Dnskey(key) => {
            let mut flags = 0u16;
            if key.zone_key {
                flags |= 0x0100;
            }
            if key.secure_entry_point {
                flags |= 0x0001;
            }
            encoder.emit_u16(flags);
            encoder.emit_u8(key.protocol);
            encoder.emit_u8(key.algorithm);
            encoder.emit_vec(&key.public_key);
        }
        RData::Nsec3(n) => {
            encoder.emit_u8(n.hash_algorithm);
            encoder.emit_u8(n.flags);
            encoder.emit_u16(n.iterations);
            encoder.emit_u8(n.salt.len() as u8);
            encoder.emit_vec(&n.salt);
            encoder.emit_u8(n.next_hashed_owner.len() as u8);
            encoder.emit_vec(&n.next_hashed_owner);
            encoder.emit_vec(&n.type_bit_maps.to_wire());
        }
        RData::Nsec3Param(p) => {
            encoder.emit_u8(p.hash_algorithm);
            encoder.emit_u8(p.flags);
            encoder.emit_u16(p.iterations);
            encoder.emit_u8(p.salt.len() as u8);
            encoder.emit_vec(&p.salt);
        }
        RData::Unknown { data, .. } => encoder.emit_vec(data),
    }
    Ok(())
}

/// Decodes `rdlength` bytes of rdata for `rtype`, starting at the decoder's
/// current position. Name-bearing types are decoded through the shared
/// decoder (not the isolated rdata slice) since they may carry compression
/// pointers back into the rest of the message.
pub fn decode_rdata(decoder: &mut BinDecoder, rtype: RecordType, rdlength: usize) -> ProtoResult<RData> {
    let rdata_start = decoder.position();
    let rdata = match rtype {
        RecordType::A => {
            let b = decoder.read_slice(4, "A rdata")?;
            RData::A(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
        }
        RecordType::AAAA => {
            let b = decoder.read_slice(16, "AAAA rdata")?;
            let mut octets = [0u8; 16];
            octets.copy_from_slice(b);
            RData::AAAA(Ipv6Addr::from(octets))
        }
        RecordType::NS => RData::Ns(decoder.read_name()?),
        RecordType::CNAME => RData::Cname(decoder.read_name()?),
        RecordType::PTR => RData::Ptr(decoder.read_name()?),
        RecordType::SOA => {
            let mname = decoder.read_name()?;
            let rname = decoder.read_name()?;
            RData::Soa(Soa {
                mname,
                rname,
                serial: decoder.read_u32()?,
                refresh: decoder.read_u32()?,
                retry: decoder.read_u32()?,
                expire: decoder.read_u32()?,
                minimum: decoder.read_u32()?,
            })
        }
        RecordType::MX => RData::Mx(Mx {
            preference: decoder.read_u16()?,
            exchange: decoder.read_name()?,
        }),
        RecordType::SRV => RData::Srv(Srv {
            priority: decoder.read_u16()?,
            weight: decoder.read_u16()?,
            port: decoder.read_u16()?,
            target: decoder.read_name()?,
        }),
        RecordType::TXT => {
            let mut segments = Vec::new();
            while decoder.position() < rdata_start + rdlength {
                segments.push(decoder.read_character_string()?);
            }
            RData::Txt(segments)
        }
        RecordType::DS => RData::Ds(Ds {
            key_tag: decoder.read_u16()?,
            algorithm: decoder.read_u8()?,
            digest_type: decoder.read_u8()?,
            digest: decoder.read_slice(rdata_start + rdlength - decoder.position(), "DS digest")?.into(),
        }),
        RecordType::RRSIG => {
            let type_covered = RecordType::from_u16(decoder.read_u16()?);
            let algorithm = decoder.read_u8()?;
            let labels = decoder.read_u8()?;
            let original_ttl = decoder.read_u32()?;
            let sig_expiration = decoder.read_u32()?;
            let sig_inception = decoder.read_u32()?;
            let key_tag = decoder.read_u16()?;
            let signer_name = decoder.read_name()?;
            let remaining = rdata_start + rdlength - decoder.position();
            let signature = decoder.read_slice(remaining, "RRSIG signature")?.into();
            RData::Rrsig(Rrsig {
                type_covered,
                algorithm,
                labels,
                original_ttl,
                sig_expiration,
                sig_inception,
                key_tag,
                signer_name,
                signature,
            })
        }
        RecordType::NSEC => {
            let next_domain_name = decoder.read_name()?;
            let remaining = rdata_start + rdlength - decoder.position();
            let bitmap = decoder.read_slice(remaining, "NSEC bitmap")?;
            RData::Nsec(Nsec {
                next_domain_name,
                type_bit_maps: TypeBitMaps::from_wire(bitmap),
            })
        }
        RecordType::DNSKEY => {
            let flags = decoder.read_u16()?;
            let protocol = decoder.read_u8()?;
            let algorithm = decoder.read_u8()?;
            let remaining = rdata_start + rdlength - decoder.position();
            let public_key = decoder.read_slice(remaining, "DNSKEY public key")?.into();
            RData::Dnskey(Dnskey {
                zone_key: flags & 0x0100 != 0,
                secure_entry_point: flags & 0x0001 != 0,
                protocol,
                algorithm,
                public_key,
            })
        }
        RecordType::NSEC3 => {
            let hash_algorithm = decoder.read_u8()?;
            let flags = decoder.read_u8()?;
            let iterations = decoder.read_u16()?;
            let salt_len = decoder.read_u8()? as usize;
            let salt = decoder.read_slice(salt_len, "NSEC3 salt")?.into();
            let hash_len = decoder.read_u8()? as usize;
            let next_hashed_owner = decoder.read_slice(hash_len, "NSEC3 next hashed owner")?.into();
            let remaining = rdata_start + rdlength - decoder.position();
            let bitmap = decoder.read_slice(remaining, "NSEC3 bitmap")?;
            RData::Nsec3(Nsec3 {
                hash_algorithm,
                flags,
                iterations,
                salt,
                next_hashed_owner,
                type_bit_maps: TypeBitMaps::from_wire(bitmap),
            })
        }
        RecordType::NSEC3PARAM => {
            let hash_algorithm = decoder.read_u8()?;
            let flags = decoder.read_u8()?;
            let iterations = decoder.read_u16()?;
            let salt_len = decoder.read_u8()? as usize;
            let salt = decoder.read_slice(salt_len, "NSEC3PARAM salt")?.into();
            RData::Nsec3Param(Nsec3Param {
                hash_algorithm,
                flags,
                iterations,
                salt,
            })
        }
        other => RData::Unknown {
            rtype: other,
            data: decoder.read_slice(rdlength, "unknown rdata")?.into(),
        },
    };

    let consumed = decoder.position() - rdata_start;
    if consumed != rdlength {
        return Err(ProtoError::MalformedRdata(rtype));
    }
    Ok(rdata)
}

pub fn decode_name_only(decoder: &mut BinDecoder) -> ProtoResult<Name> {
    decoder.read_name()
}
