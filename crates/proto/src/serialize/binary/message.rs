//! Full `Message` encode/decode: header, question, and the three RR
//! sections, plus the EDNS(0) OPT pseudo-RR carried in Additional.

use crate::error::{ProtoError, ProtoResult};
use crate::op::edns::Edns;
use crate::op::header::Header;
use crate::op::message::{Message, Query};
use crate::rr::{DNSClass, Record, RecordType};
use crate::serialize::binary::decoder::BinDecoder;
use crate::serialize::binary::encoder::BinEncoder;
use crate::serialize::binary::record_data::{decode_rdata, encode_rdata};

pub fn encode_message(message: &Message) -> ProtoResult<Vec<u8>> {
    let mut msg = message.clone();
    msg.finalize_counts();

    let mut header_bytes = Vec::with_capacity(12);
    msg.header.write(&mut header_bytes);

    let mut encoder = BinEncoder::new();
    encoder.emit_vec(&header_bytes);

    for q in &msg.queries {
        encoder.emit_name(&q.name, true)?;
        encoder.emit_u16(q.query_type.to_u16());
        encoder.emit_u16(q.query_class.to_u16());
    }
    for r in &msg.answers {
        encode_record(&mut encoder, r)?;
    }
    for r in &msg.authorities {
        encode_record(&mut encoder, r)?;
    }
    for r in &msg.additionals {
        encode_record(&mut encoder, r)?;
    }
    if let Some(edns) = &msg.edns {
        encode_opt(&mut encoder, edns, msg.header.response_code.to_u16() as u8)?;
    }

    Ok(encoder.into_bytes())
}

fn encode_record(encoder: &mut BinEncoder, record: &Record) -> ProtoResult<()> {
    encoder.emit_name(record.name(), true)?;
    encoder.emit_u16(record.record_type().to_u16());
    encoder.emit_u16(record.dns_class().to_u16());
    encoder.emit_u32(record.ttl());
    let len_pos = encoder.start_length_prefixed();
    encode_rdata(encoder, record.rdata())?;
    encoder.commit_length_prefixed(len_pos)?;
    Ok(())
}

fn encode_opt(encoder: &mut BinEncoder, edns: &Edns, extended_rcode: u8) -> ProtoResult<()> {
    encoder.emit_u8(0); // root name
    encoder.emit_u16(RecordType::OPT.to_u16());
    encoder.emit_u16(edns.opt_class());
    encoder.emit_u32(edns.opt_ttl(extended_rcode));
    encoder.emit_u16(0); // no options carried
    Ok(())
}

pub fn decode_message(bytes: &[u8]) -> ProtoResult<Message> {
    let header = Header::read(bytes)?;
    let mut decoder = BinDecoder::new(bytes);
    decoder.read_slice(12, "header")?;

    let mut queries = Vec::with_capacity(header.question_count as usize);
    for _ in 0..header.question_count {
        // RFC 1035 section 4.1.4: nothing precedes the question section, so
        // its QNAME has no legitimate use for a compression pointer.
        let name = decoder.read_name_uncompressed()?;
        let query_type = RecordType::from_u16(decoder.read_u16()?);
        let query_class = DNSClass::from_u16(decoder.read_u16()?);
        queries.push(Query::new(name, query_type, query_class));
    }

    let answers = decode_records(&mut decoder, header.answer_count)?;
    let authorities = decode_records(&mut decoder, header.authority_count)?;
    let (additionals, edns) = decode_additional(&mut decoder, header.additional_count)?;

    Ok(Message {
        header,
        queries,
        answers,
        authorities,
        additionals,
        edns,
    })
}

fn decode_records(decoder: &mut BinDecoder, count: u16) -> ProtoResult<Vec<Record>> {
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(decode_record(decoder)?);
    }
    Ok(out)
}

fn decode_record(decoder: &mut BinDecoder) -> ProtoResult<Record> {
    let name = decoder.read_name()?;
    let rtype = RecordType::from_u16(decoder.read_u16()?);
    let class = DNSClass::from_u16(decoder.read_u16()?);
    let ttl = decoder.read_u32()?;
    let rdlength = decoder.read_u16()? as usize;
    let rdata = decode_rdata(decoder, rtype, rdlength)?;
    Ok(Record::new(name, class, ttl, rdata))
}

/// The Additional section may hold a single OPT pseudo-RR mixed in with
/// ordinary records; this splits it out into `Message::edns`.
fn decode_additional(decoder: &mut BinDecoder, count: u16) -> ProtoResult<(Vec<Record>, Option<Edns>)> {
    let mut additionals = Vec::new();
    let mut edns = None;
    for _ in 0..count {
        let start = decoder.position();
        let name = decoder.read_name()?;
        let rtype = RecordType::from_u16(decoder.read_u16()?);
        let class = decoder.read_u16()?;
        let ttl = decoder.read_u32()?;
        let rdlength = decoder.read_u16()? as usize;
        if rtype == RecordType::OPT {
            if !name.is_root() {
                return Err(ProtoError::MalformedRdata(RecordType::OPT));
            }
            decoder.read_slice(rdlength, "OPT options")?;
            edns = Some(Edns::from_opt_fields(class, ttl));
        } else {
            let dns_class = DNSClass::from_u16(class);
            let rdata = decode_rdata(decoder, rtype, rdlength)?;
            additionals.push(Record::new(name, dns_class, ttl, rdata));
        }
        debug_assert!(decoder.position() > start);
    }
    Ok((additionals, edns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::domain::Name;
    use crate::rr::rdata::{RData, Soa};

    fn soa_record(owner: &Name) -> Record {
        Record::new(
            owner.clone(),
            DNSClass::IN,
            3600,
            RData::Soa(Soa {
                mname: Name::parse("ns1.example.com.", None).unwrap(),
                rname: Name::parse("hostmaster.example.com.", None).unwrap(),
                serial: 2024010101,
                refresh: 7200,
                retry: 3600,
                expire: 1209600,
                minimum: 3600,
            }),
        )
    }

    #[test]
    fn query_roundtrips() {
        let name = Name::parse("www.example.com.", None).unwrap();
        let query = Query::new(name.clone(), RecordType::A, DNSClass::IN);
        let message = Message::new_query(7, query);
        let bytes = encode_message(&message).unwrap();
        let decoded = decode_message(&bytes).unwrap();
        assert_eq!(decoded.header.id, 7);
        assert_eq!(decoded.queries.len(), 1);
        assert_eq!(decoded.queries[0].name, name);
    }

    #[test]
    fn response_with_answer_and_edns_roundtrips() {
        let owner = Name::parse("example.com.", None).unwrap();
        let query = Query::new(owner.clone(), RecordType::SOA, DNSClass::IN);
        let mut message = Message::new_query(99, query);
        message.header.is_response = true;
        message.header.authoritative = true;
        message.answers.push(soa_record(&owner));
        message.edns = Some(Edns::new(4096, true));

        let bytes = encode_message(&message).unwrap();
        let decoded = decode_message(&bytes).unwrap();

        assert_eq!(decoded.answers.len(), 1);
        assert!(decoded.header.authoritative);
        let edns = decoded.edns.unwrap();
        assert!(edns.dnssec_ok);
        assert_eq!(edns.max_payload, 4096);
        match decoded.answers[0].rdata() {
            RData::Soa(soa) => assert_eq!(soa.serial, 2024010101),
            other => panic!("expected SOA rdata, got {other:?}"),
        }
    }

    #[test]
    fn repeated_owner_names_compress_response_smaller_than_naive() {
        let owner = Name::parse("example.com.", None).unwrap();
        let query = Query::new(owner.clone(), RecordType::NS, DNSClass::IN);
        let mut message = Message::new_query(1, query);
        for host in ["ns1", "ns2", "ns3"] {
            message.answers.push(Record::new(
                owner.clone(),
                DNSClass::IN,
                3600,
                RData::Ns(Name::parse(&format!("{host}.example.com."), None).unwrap()),
            ));
        }
        let bytes = encode_message(&message).unwrap();
        // Three repeats of a 13-byte owner name plus three NS targets sharing
        // the same suffix: compression should keep this well under the
        // fully-uncompressed worst case of a few hundred bytes.
        assert!(bytes.len() < 150, "expected compression, got {} bytes", bytes.len());

        let decoded = decode_message(&bytes).unwrap();
        assert_eq!(decoded.answers.len(), 3);
    }

    #[test]
    fn compressed_qname_is_rejected() {
        // Hand-build a message whose question name is a pointer back into
        // the header — nonsensical on the wire, but exercises the same
        // rejection path a malicious or buggy compressor could trigger.
        let mut bytes = vec![0u8; 12]; // header, all zero (question_count wrong but unread)
        bytes[4] = 0;
        bytes[5] = 1; // QDCOUNT = 1
        bytes.push(0xc0);
        bytes.push(0x00); // pointer to offset 0
        bytes.extend_from_slice(&RecordType::A.to_u16().to_be_bytes());
        bytes.extend_from_slice(&DNSClass::IN.to_u16().to_be_bytes());

        let err = decode_message(&bytes).unwrap_err();
        assert!(matches!(err, ProtoError::UnexpectedCompressionPointer));
    }
}
