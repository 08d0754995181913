//! The 12-byte DNS message header (RFC 1035 section 4.1.1).

use crate::error::{ProtoError, ProtoResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpCode {
    Query,
    IQuery,
    Status,
    Notify,
    Update,
    Unknown(u8),
}

impl OpCode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => OpCode::Query,
            1 => OpCode::IQuery,
            2 => OpCode::Status,
            4 => OpCode::Notify,
            5 => OpCode::Update,
            other => OpCode::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            OpCode::Query => 0,
            OpCode::IQuery => 1,
            OpCode::Status => 2,
            OpCode::Notify => 4,
            OpCode::Update => 5,
            OpCode::Unknown(v) => v,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    YXDomain,
    YXRRSet,
    NXRRSet,
    NotAuth,
    NotZone,
    Unknown(u16),
}

impl ResponseCode {
    pub fn from_u16(v: u16) -> Self {
        match v {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            6 => ResponseCode::YXDomain,
            7 => ResponseCode::YXRRSet,
            8 => ResponseCode::NXRRSet,
            9 => ResponseCode::NotAuth,
            10 => ResponseCode::NotZone,
            other => ResponseCode::Unknown(other),
        }
    }

    /// Low 4 bits stored in the header; extended RCODEs (&gt;15) live in the
    /// OPT pseudo-RR's TTL field and are combined by the EDNS layer.
    pub fn low_bits(self) -> u16 {
        self.to_u16() & 0x0f
    }

    pub fn to_u16(self) -> u16 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::YXDomain => 6,
            ResponseCode::YXRRSet => 7,
            ResponseCode::NXRRSet => 8,
            ResponseCode::NotAuth => 9,
            ResponseCode::NotZone => 10,
            ResponseCode::Unknown(v) => v,
        }
    }
}

/// The fixed 12-byte header preceding every DNS message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub is_response: bool,
    pub op_code: OpCode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    pub response_code: ResponseCode,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl Header {
    pub fn new_query(id: u16) -> Self {
        Header {
            id,
            is_response: false,
            op_code: OpCode::Query,
            authoritative: false,
            truncated: false,
            recursion_desired: false,
            recursion_available: false,
            authentic_data: false,
            checking_disabled: false,
            response_code: ResponseCode::NoError,
            question_count: 0,
            answer_count: 0,
            authority_count: 0,
            additional_count: 0,
        }
    }

    /// Builds the header of a response to `self`, an authoritative server
    /// never offering recursion (`spec.md` section 4: no recursive lookups).
    pub fn new_response(&self, response_code: ResponseCode) -> Self {
        Header {
            id: self.id,
            is_response: true,
            op_code: self.op_code,
            authoritative: false,
            truncated: false,
            recursion_desired: self.recursion_desired,
            recursion_available: false,
            authentic_data: false,
            checking_disabled: self.checking_disabled,
            response_code,
            question_count: 0,
            answer_count: 0,
            authority_count: 0,
            additional_count: 0,
        }
    }

    pub fn read(bytes: &[u8]) -> ProtoResult<Self> {
        if bytes.len() < 12 {
            return Err(ProtoError::UnexpectedEof("header"));
        }
        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let flags_lo = bytes[2];
        let flags_hi = bytes[3];
        Ok(Header {
            id,
            is_response: flags_lo & 0x80 != 0,
            op_code: OpCode::from_u8((flags_lo >> 3) & 0x0f),
            authoritative: flags_lo & 0x04 != 0,
            truncated: flags_lo & 0x02 != 0,
            recursion_desired: flags_lo & 0x01 != 0,
            recursion_available: flags_hi & 0x80 != 0,
            authentic_data: flags_hi & 0x20 != 0,
            checking_disabled: flags_hi & 0x10 != 0,
            response_code: ResponseCode::from_u16((flags_hi & 0x0f) as u16),
            question_count: u16::from_be_bytes([bytes[4], bytes[5]]),
            answer_count: u16::from_be_bytes([bytes[6], bytes[7]]),
            authority_count: u16::from_be_bytes([bytes[8], bytes[9]]),
            additional_count: u16::from_be_bytes([bytes[10], bytes[11]]),
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        let mut flags_lo = 0u8;
        if self.is_response {
            flags_lo |= 0x80;
        }
        flags_lo |= (self.op_code.to_u8() & 0x0f) << 3;
        if self.authoritative {
            flags_lo |= 0x04;
        }
        if self.truncated {
            flags_lo |= 0x02;
        }
        if self.recursion_desired {
            flags_lo |= 0x01;
        }
        let mut flags_hi = 0u8;
        if self.recursion_available {
            flags_hi |= 0x80;
        }
        if self.authentic_data {
            flags_hi |= 0x20;
        }
        if self.checking_disabled {
            flags_hi |= 0x10;
        }
        flags_hi |= (self.response_code.low_bits() as u8) & 0x0f;
        out.push(flags_lo);
        out.push(flags_hi);
        out.extend_from_slice(&self.question_count.to_be_bytes());
        out.extend_from_slice(&self.answer_count.to_be_bytes());
        out.extend_from_slice(&self.authority_count.to_be_bytes());
        out.extend_from_slice(&self.additional_count.to_be_bytes());
    }
}
