//! Download link signatures.
//!
//! A signature has the form `<mac>:<expire>` where `mac` is the padded
//! base64url HMAC-SHA256 of `"<path>:<expire>"` keyed with the shared token,
//! and `expire` is a Unix timestamp in seconds (`0` never expires). This is
//! the format the upstream file-listing service hands out in its `sign`
//! query parameters.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

const BLOCK_LEN: usize = 64;
const MAC_LEN: usize = 32;

/// Why a signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("sign missing")]
    Missing,

    #[error("expire missing")]
    ExpireMissing,

    #[error("expire invalid")]
    ExpireInvalid,

    #[error("sign expired")]
    Expired,

    #[error("sign malformed")]
    Malformed,

    #[error("sign invalid")]
    Invalid,
}

/// HMAC-SHA256 signer. The key is fixed at construction.
#[derive(Clone)]
pub struct Signer {
    // Pre-padded key blocks; only ever read.
    ipad: [u8; BLOCK_LEN],
    opad: [u8; BLOCK_LEN],
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(key: &[u8]) -> Self {
        // HMAC key schedule from RFC 2104.
        let mut key_block = [0u8; BLOCK_LEN];
        if key.len() > BLOCK_LEN {
            let digest = Sha256::digest(key);
            key_block[..digest.len()].copy_from_slice(&digest);
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }

        let mut ipad = [0u8; BLOCK_LEN];
        let mut opad = [0u8; BLOCK_LEN];
        for i in 0..BLOCK_LEN {
            ipad[i] = key_block[i] ^ 0x36;
            opad[i] = key_block[i] ^ 0x5c;
        }

        Self { ipad, opad }
    }

    /// Issue a signature for `path` valid until `expire` (0 = forever).
    pub fn sign(&self, path: &str, expire: i64) -> String {
        let mac = self.mac(path, expire);
        format!("{}:{}", general_purpose::URL_SAFE.encode(mac), expire)
    }

    /// Verify `signature` for `path` against the current clock.
    pub fn verify(&self, path: &str, signature: &str) -> Result<(), SignatureError> {
        self.verify_at(path, signature, unix_now())
    }

    /// Verify `signature` for `path` as of `now` (Unix seconds).
    pub fn verify_at(&self, path: &str, signature: &str, now: i64) -> Result<(), SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::Missing);
        }

        // Without a separator the whole value is read as the expire field.
        let (encoded_mac, expire_str) = signature.rsplit_once(':').unwrap_or(("", signature));
        if expire_str.is_empty() {
            return Err(SignatureError::ExpireMissing);
        }

        let expire: i64 = expire_str.parse().map_err(|_| SignatureError::ExpireInvalid)?;
        // The MAC covers the canonical decimal form only.
        if expire.to_string() != expire_str {
            return Err(SignatureError::ExpireInvalid);
        }
        if expire != 0 && expire < now {
            return Err(SignatureError::Expired);
        }

        let provided = decode_mac(encoded_mac).ok_or(SignatureError::Malformed)?;
        let expected = self.mac(path, expire);

        if bool::from(provided.ct_eq(&expected)) {
            Ok(())
        } else {
            Err(SignatureError::Invalid)
        }
    }

    fn mac(&self, path: &str, expire: i64) -> [u8; MAC_LEN] {
        let mut inner = Sha256::new();
        inner.update(self.ipad);
        inner.update(path.as_bytes());
        inner.update(b":");
        inner.update(expire.to_string().as_bytes());
        let inner_hash = inner.finalize();

        let mut outer = Sha256::new();
        outer.update(self.opad);
        outer.update(inner_hash);

        let mut out = [0u8; MAC_LEN];
        out.copy_from_slice(&outer.finalize());
        out
    }
}

fn decode_mac(raw: &str) -> Option<[u8; MAC_LEN]> {
    let bytes = general_purpose::URL_SAFE.decode(raw).ok()?;
    bytes.try_into().ok()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
