//! Classifies the reply to an IXFR probe sent over UDP (`spec.md` section
//! 4.4 step 3): a probe carries the secondary's current SOA in the
//! Authority section, and the reply tells us whether to apply a stream,
//! fall back to TCP, or treat the zone as already up to date.

use nsd_proto::op::header::ResponseCode;
use nsd_proto::op::message::Message;
use nsd_proto::rr::rdata::Soa;
use nsd_proto::rr::RData;
use nsd_proto::Serial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Single SOA in the answer, serial not newer than what we hold: the
    /// zone is already current.
    UpToDate,
    /// Truncated, or fewer than two records in the answer: retry the same
    /// master over TCP.
    RetryTcp,
    /// Reply id/RCODE mismatch, or some other malformed reply: move on to
    /// the next configured master.
    NextMaster,
    /// Enough of a reply to start streaming in the same message.
    BeginStream,
}

fn first_soa(message: &Message) -> Option<&Soa> {
    message.answers.iter().find_map(|r| match r.rdata() {
        RData::Soa(soa) => Some(soa),
        _ => None,
    })
}

/// `query_id` and `held_serial` are the probe's own query id and the
/// secondary's currently-held serial for this zone (`None` if no SOA has
/// ever been acquired).
pub fn classify_probe_reply(query_id: u16, held_serial: Option<Serial>, reply: &Message) -> ProbeOutcome {
    if reply.header.id != query_id || reply.header.response_code != ResponseCode::NoError {
        return ProbeOutcome::NextMaster;
    }
    if reply.header.truncated || reply.answers.len() < 2 {
        // A single-SOA answer still needs to be checked for "up to date"
        // before falling back to TCP, since that is a legitimate 1-record
        // reply, not a truncated one.
        if !reply.header.truncated && reply.answers.len() == 1 {
            if let Some(soa) = first_soa(reply) {
                let reply_serial = Serial::new(soa.serial);
                let current = held_serial.unwrap_or(Serial::new(0));
                if !current.is_less_than(reply_serial) {
                    return ProbeOutcome::UpToDate;
                }
            }
        }
        return ProbeOutcome::RetryTcp;
    }
    ProbeOutcome::BeginStream
}
