//! Crate-wide error type for wire-format parsing and the NSEC3/TSIG
//! primitives that live in this crate.

use thiserror::Error;

/// Errors produced while parsing or constructing DNS wire data.
///
/// Every variant here maps to a well defined outcome further up the stack
/// (an RCODE in the resolver, a dropped XFR stream in the coordinator); see
/// the error taxonomy in `SPEC_FULL.md` section 7.
#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("label exceeds 63 octets: {0}")]
    LabelTooLong(usize),

    #[error("name exceeds 255 wire octets")]
    NameTooLong,

    #[error("compression pointer found where a name must be uncompressed")]
    UnexpectedCompressionPointer,

    #[error("compression pointer points forward or outside the message")]
    BadCompressionPointer,

    #[error("unexpected end of buffer while decoding {0}")]
    UnexpectedEof(&'static str),

    #[error("unknown record type {0}")]
    UnknownRecordType(u16),

    #[error("unknown dns class {0}")]
    UnknownDnsClass(u16),

    #[error("unknown opcode {0}")]
    UnknownOpCode(u8),

    #[error("rdata for type {0:?} has the wrong length")]
    MalformedRdata(crate::rr::RecordType),

    #[error("NSEC3 iterations {0} exceed the maximum of 0x7fffff")]
    Nsec3IterationsTooLarge(u32),

    #[error("TSIG signature verification failed")]
    TsigVerificationFailed,

    #[error("unsupported TSIG algorithm {0}")]
    UnsupportedTsigAlgorithm(String),

    #[error("question section must contain exactly one entry, got {0}")]
    BadQuestionCount(u16),
}

pub type ProtoResult<T> = Result<T, ProtoError>;
