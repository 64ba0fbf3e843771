use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

use super::SessionData;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Envelope {
    /// Issue time, unix seconds.
    iat: i64,
    data: SessionData,
}

/// Signs and verifies session cookie values.
///
/// Wire form: `base64url(json envelope) "." base64url(hmac-sha256(payload))`.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCodec { .. }")
    }
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
        })
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    pub fn encode(&self, data: &SessionData, issued_at: i64) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(&Envelope {
            iat: issued_at,
            data: data.clone(),
        })?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let sig = URL_SAFE_NO_PAD.encode(self.sign(&payload));
        Ok(format!("{payload}.{sig}"))
    }

    /// `None` for tampered, malformed or expired values.
    ///
    /// `max_age` bounds permanent sessions; non-permanent ones end with the
    /// browser session and are not aged here.
    pub fn decode(&self, value: &str, max_age: Duration, now: i64) -> Option<SessionData> {
        let (payload, sig) = value.split_once('.')?;
        let sig = URL_SAFE_NO_PAD.decode(sig).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let envelope: Envelope = serde_json::from_slice(&json).ok()?;

        if envelope.data.permanent {
            let age = now.saturating_sub(envelope.iat);
            if age < 0 || age as u64 > max_age.as_secs() {
                return None;
            }
        }
        Some(envelope.data)
    }
}
