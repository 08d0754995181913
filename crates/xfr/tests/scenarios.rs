//! Scenario-level tests exercising the state machine, the stream
//! assembler, the probe classifier, and the persistence sinks together,
//! the way `Coordinator` wires them at runtime (without the tokio event
//! loop itself, which only does socket I/O around this logic).

use std::time::{Duration, Instant};

use nsd_proto::op::header::{Header, OpCode, ResponseCode};
use nsd_proto::op::message::{Message, Query};
use nsd_proto::rr::rdata::Soa;
use nsd_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use nsd_xfr::sink::{Changeset, CountingReloadRequester, DiffLogSink, ReloadRequester, VecDiffLogSink};
use nsd_xfr::{probe::classify_probe_reply, probe::ProbeOutcome, state::IoIntent, state::XfrEvent, state::XfrState, state::ZoneXfr, stream::StreamAssembler};
use nsd_xfr::config::{Master, ZoneXfrConfig};

fn zone_name() -> Name {
    Name::parse("example.com.", None).unwrap()
}

fn soa(serial: u32, refresh: u32, retry: u32, expire: u32) -> Soa {
    Soa {
        mname: Name::parse("ns1.example.com.", None).unwrap(),
        rname: Name::parse("hostmaster.example.com.", None).unwrap(),
        serial,
        refresh,
        retry,
        expire,
        minimum: 300,
    }
}

fn soa_record(s: &Soa) -> Record {
    Record::new(zone_name(), DNSClass::IN, 3600, RData::Soa(s.clone()))
}

fn a_record(label: &str) -> Record {
    Record::new(Name::parse(label, None).unwrap(), DNSClass::IN, 3600, RData::A(std::net::Ipv4Addr::new(192, 0, 2, 10)))
}

fn one_master_config() -> ZoneXfrConfig {
    ZoneXfrConfig {
        zone: zone_name(),
        masters: vec![Master {
            address: "10.0.0.1:53".parse().unwrap(),
            tsig: None,
            axfr_only: false,
        }],
        notify: vec![],
    }
}

fn probe_reply(id: u16, answers: Vec<Record>, truncated: bool) -> Message {
    let mut header = Header::new_query(id);
    header.is_response = true;
    header.op_code = OpCode::Query;
    header.response_code = ResponseCode::NoError;
    header.truncated = truncated;
    Message {
        header,
        queries: vec![Query { name: zone_name(), query_type: RecordType::SOA, query_class: DNSClass::IN }],
        answers,
        authorities: vec![],
        additionals: vec![],
        edns: None,
    }
}

fn apply_changeset(sink: &VecDiffLogSink, reload: &CountingReloadRequester, assembler: &StreamAssembler) {
    let new_soa = assembler.new_soa().expect("stream completed with a terminal SOA");
    let changeset = Changeset {
        zone: zone_name(),
        kind: assembler.kind().unwrap(),
        old_serial: None,
        new_serial: new_soa.serial,
        deleted: assembler.deleted().to_vec(),
        added: assembler.added().to_vec(),
    };
    sink.append(&changeset).unwrap();
    reload.request_reload(&zone_name()).unwrap();
}

#[test]
fn ixfr_catch_up_applies_a_single_udp_packet_delta() {
    let mut xfr = ZoneXfr::new(one_master_config());
    let t0 = Instant::now();
    xfr.poll(XfrEvent::ZoneLoaded { soa: soa(10, 100, 30, 1000) }, t0);

    let action = xfr.poll(XfrEvent::TimerFired, t0 + Duration::from_secs(100));
    assert_eq!(action.intent, IoIntent::SendUdpProbe { master: 0 });

    let new_soa = soa(11, 100, 30, 1000);
    let reply = probe_reply(42, vec![soa_record(&new_soa), soa_record(&soa(10, 100, 30, 1000))], false);
    let outcome = classify_probe_reply(42, xfr.current_serial().map(nsd_proto::Serial::new), &reply);
    assert_eq!(outcome, ProbeOutcome::BeginStream);
    xfr.poll(XfrEvent::Probe(outcome), t0 + Duration::from_secs(100));

    let mut assembler = StreamAssembler::new();
    assembler.track_tsig(true).unwrap();
    let packet = vec![
        soa_record(&new_soa),
        soa_record(&soa(10, 100, 30, 1000)),
        a_record("old.example.com."),
        soa_record(&new_soa),
        a_record("new.example.com."),
        soa_record(&new_soa),
    ];
    assembler.feed(&packet).unwrap();
    assert!(assembler.is_complete());

    let sink = VecDiffLogSink::new();
    let reload = CountingReloadRequester::new();
    apply_changeset(&sink, &reload, &assembler);

    let final_action = xfr.poll(XfrEvent::StreamComplete { new_soa: new_soa.clone() }, t0 + Duration::from_secs(101));
    assert_eq!(xfr.state(), XfrState::Ok);
    assert_eq!(xfr.current_serial(), Some(11));
    assert!(final_action.notify_out);

    assert_eq!(sink.entries().len(), 1);
    assert_eq!(sink.entries()[0].new_serial, 11);
    assert_eq!(reload.requests(), vec![zone_name()]);
}

#[test]
fn axfr_fallback_streams_over_multiple_tcp_messages() {
    let mut xfr = ZoneXfr::new(one_master_config());
    let t0 = Instant::now();
    xfr.poll(XfrEvent::ZoneLoaded { soa: soa(10, 100, 30, 1000) }, t0);
    xfr.poll(XfrEvent::TimerFired, t0 + Duration::from_secs(100));

    let new_soa = soa(11, 100, 30, 1000);
    // Probe replies truncated, so the secondary falls back to TCP.
    let reply = probe_reply(7, vec![soa_record(&new_soa), soa_record(&soa(10, 100, 30, 1000))], true);
    let outcome = classify_probe_reply(7, xfr.current_serial().map(nsd_proto::Serial::new), &reply);
    assert_eq!(outcome, ProbeOutcome::RetryTcp);
    let action = xfr.poll(XfrEvent::Probe(outcome), t0 + Duration::from_secs(100));
    assert_eq!(action.intent, IoIntent::OpenTcp { master: 0 });

    // Second record in the first message is not a SOA: this is AXFR, not IXFR.
    let mut assembler = StreamAssembler::new();
    assembler.track_tsig(true).unwrap();
    assembler.feed(&[soa_record(&new_soa), a_record("www.example.com.")]).unwrap();
    assert!(!assembler.is_complete());

    assembler.track_tsig(false).unwrap();
    assembler.feed(&[a_record("mail.example.com.")]).unwrap();
    assert!(!assembler.is_complete());

    assembler.track_tsig(false).unwrap();
    assembler.feed(&[a_record("ns1.example.com."), soa_record(&new_soa)]).unwrap();
    assert!(assembler.is_complete());
    assert_eq!(assembler.kind(), Some(nsd_xfr::stream::TransferKind::Axfr));
    assert_eq!(assembler.added().len(), 3);

    let sink = VecDiffLogSink::new();
    let reload = CountingReloadRequester::new();
    apply_changeset(&sink, &reload, &assembler);

    xfr.poll(XfrEvent::StreamComplete { new_soa: new_soa.clone() }, t0 + Duration::from_secs(105));
    assert_eq!(xfr.state(), XfrState::Ok);
    assert_eq!(xfr.current_serial(), Some(11));
    assert_eq!(sink.entries()[0].kind, nsd_xfr::stream::TransferKind::Axfr);
}

#[test]
fn a_zone_that_cannot_refresh_crosses_into_expired_and_keeps_probing() {
    let mut xfr = ZoneXfr::new(one_master_config());
    let t0 = Instant::now();
    xfr.poll(XfrEvent::ZoneLoaded { soa: soa(10, 1, 1, 4) }, t0);
    let t1 = t0 + Duration::from_secs(1);
    let action = xfr.poll(XfrEvent::TimerFired, t1);
    assert_eq!(xfr.state(), XfrState::Refreshing);
    assert_eq!(action.intent, IoIntent::SendUdpProbe { master: 0 });

    // Every attempt fails; by the time `expire` (4s after acquisition)
    // has elapsed the zone is no longer servable authoritatively.
    let t_past_expire = t0 + Duration::from_secs(10);
    let action = xfr.poll(XfrEvent::Probe(ProbeOutcome::NextMaster), t_past_expire);
    assert_eq!(xfr.state(), XfrState::Expired);
    assert_ne!(action.intent, IoIntent::None);

    // Recovery: a later probe lands the newer serial and the zone comes back.
    let recovered = soa(11, 1, 1, 4);
    let final_action = xfr.poll(XfrEvent::StreamComplete { new_soa: recovered }, t_past_expire + Duration::from_secs(1));
    assert_eq!(xfr.state(), XfrState::Ok);
    assert!(final_action.notify_out);
}
