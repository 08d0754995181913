//! The assembled DNS message: header, question, and the three RR sections.

use crate::op::edns::Edns;
use crate::op::header::Header;
use crate::rr::{DNSClass, Name, Record, RecordType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub name: Name,
    pub query_type: RecordType,
    pub query_class: DNSClass,
}

impl Query {
    pub fn new(name: Name, query_type: RecordType, query_class: DNSClass) -> Self {
        Query {
            name,
            query_type,
            query_class,
        }
    }
}

/// A fully decoded (or to-be-encoded) DNS message. Exactly one question is
/// expected on the wire outside IXFR/AXFR and UPDATE, but the vector shape
/// matches the wire format's QDCOUNT directly rather than special-casing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub queries: Vec<Query>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
    pub edns: Option<Edns>,
}

impl Message {
    pub fn new_query(id: u16, query: Query) -> Self {
        let mut header = Header::new_query(id);
        header.question_count = 1;
        Message {
            header,
            queries: vec![query],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            edns: None,
        }
    }

    /// Builds a bare response header/question pair from a request, with
    /// empty sections ready for the resolver to fill in.
    pub fn new_response(request: &Message, response_code: crate::op::header::ResponseCode) -> Self {
        Message {
            header: request.header.new_response(response_code),
            queries: request.queries.clone(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            edns: None,
        }
    }

    /// Syncs the header's section counts with the actual vector lengths;
    /// call before encoding.
    pub fn finalize_counts(&mut self) {
        self.header.question_count = self.queries.len() as u16;
        self.header.answer_count = self.answers.len() as u16;
        self.header.authority_count = self.authorities.len() as u16;
        self.header.additional_count = self.additionals.len() as u16 + self.edns.is_some() as u16;
    }
}
