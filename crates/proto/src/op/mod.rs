//! Message-level types: the header, EDNS(0), and the assembled `Message`.

pub mod edns;
pub mod header;
pub mod message;

pub use edns::Edns;
pub use header::{Header, OpCode, ResponseCode};
pub use message::{Message, Query};
