//! TSIG (RFC 8945) transaction signatures, used to authenticate XFR and
//! NOTIFY exchanges between primary and secondary name servers.

use ring::hmac;

use crate::error::{ProtoError, ProtoResult};
use crate::rr::domain::Name;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TsigAlgorithm {
    HmacSha1,
    HmacSha256,
}

impl TsigAlgorithm {
    /// Matches a TSIG algorithm name as it appears on the wire, e.g.
    /// `hmac-sha1.` or `hmac-sha256.`.
    pub fn from_name(name: &Name) -> ProtoResult<Self> {
        match name.to_string().to_ascii_lowercase().trim_end_matches('.') {
            "hmac-sha1" => Ok(TsigAlgorithm::HmacSha1),
            "hmac-sha256" => Ok(TsigAlgorithm::HmacSha256),
            other => Err(ProtoError::UnsupportedTsigAlgorithm(other.to_string())),
        }
    }

    fn ring_algorithm(self) -> hmac::Algorithm {
        match self {
            TsigAlgorithm::HmacSha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            TsigAlgorithm::HmacSha256 => hmac::HMAC_SHA256,
        }
    }
}

/// A parsed TSIG record minus the MAC itself, plus the key used to key the
/// HMAC. Constructing one does not perform any cryptography; call
/// [`TsigContext::sign`] or [`TsigContext::verify`] explicitly.
pub struct TsigContext {
    key: hmac::Key,
    algorithm: TsigAlgorithm,
}

impl TsigContext {
    pub fn new(algorithm: TsigAlgorithm, secret: &[u8]) -> Self {
        TsigContext {
            key: hmac::Key::new(algorithm.ring_algorithm(), secret),
            algorithm,
        }
    }

    pub fn algorithm(&self) -> TsigAlgorithm {
        self.algorithm
    }

    /// Computes the MAC over `signed_data` (the message bytes plus the TSIG
    /// variables, per RFC 8945 section 4.2).
    pub fn sign(&self, signed_data: &[u8]) -> Vec<u8> {
        hmac::sign(&self.key, signed_data).as_ref().to_vec()
    }

    /// Verifies `mac` against `signed_data` in constant time.
    pub fn verify(&self, signed_data: &[u8], mac: &[u8]) -> ProtoResult<()> {
        hmac::verify(&self.key, signed_data, mac).map_err(|_| ProtoError::TsigVerificationFailed)
    }
}
