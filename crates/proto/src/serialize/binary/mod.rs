//! Binary (wire-format) serialization: name-compressing encoder, a
//! pointer-following decoder, and the RDATA/Message codecs built on them.

pub mod decoder;
pub mod encoder;
pub mod message;
pub mod record_data;

pub use decoder::BinDecoder;
pub use encoder::BinEncoder;
pub use message::{decode_message, encode_message};
