// src/notifications/signature.rs
//! Verification of scheduler callbacks signed the QStash way: an HS256 JWT in the
//! `Upstash-Signature` header whose `body` claim is base64url(SHA-256(body)).

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app_log;
use crate::core::config_manager::SchedulerSettings;

pub const SIGNATURE_HEADER: &str = "Upstash-Signature";
const ISSUER: &str = "Upstash";

#[derive(Debug, Serialize, Deserialize)]
pub struct SignatureClaims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    pub body: String,
}

pub fn body_hash(body: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(body))
}

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    keys: Vec<String>,
}

impl SignatureVerifier {
    pub fn new(settings: &SchedulerSettings) -> Self {
        let keys = [&settings.current_signing_key, &settings.next_signing_key]
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect();
        Self { keys }
    }

    /// Accept the signature if it verifies against the current or the next key.
    pub fn verify(&self, signature: &str, body: &[u8]) -> Result<()> {
        if self.keys.is_empty() {
            anyhow::bail!("No signing keys configured");
        }

        let mut last_error = None;
        for key in &self.keys {
            match Self::verify_with_key(key, signature, body) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }

        let error = last_error.unwrap_or_else(|| anyhow::anyhow!("Signature rejected"));
        app_log!(warn, "Scheduler signature rejected: {:#}", error);
        Err(error)
    }

    fn verify_with_key(key: &str, signature: &str, body: &[u8]) -> Result<()> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let data = decode::<SignatureClaims>(
            signature,
            &DecodingKey::from_secret(key.as_bytes()),
            &validation,
        )
        .context("Invalid signature token")?;

        if data.claims.body.trim_end_matches('=') != body_hash(body) {
            anyhow::bail!("Body hash does not match signature");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(key: &str, body: &[u8]) -> String {
        let now = Utc::now().timestamp();
        let claims = SignatureClaims {
            iss: ISSUER.to_string(),
            sub: "https://joblyst.app/api/cron/check-interviews".to_string(),
            exp: now + 300,
            nbf: now,
            iat: now,
            body: URL_SAFE_NO_PAD.encode(Sha256::digest(body)) + "=",
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(&SchedulerSettings {
            enabled: false,
            current_signing_key: "current-key".to_string(),
            next_signing_key: "next-key".to_string(),
        })
    }

    #[test]
    fn test_accepts_current_and_next_key() {
        let body = b"{}";
        assert!(verifier().verify(&sign("current-key", body), body).is_ok());
        assert!(verifier().verify(&sign("next-key", body), body).is_ok());
    }

    #[test]
    fn test_rejects_wrong_key_or_body() {
        let body = b"{}";
        assert!(verifier().verify(&sign("other-key", body), body).is_err());
        assert!(verifier()
            .verify(&sign("current-key", body), b"{\"x\":1}")
            .is_err());
        assert!(verifier().verify("garbage", body).is_err());
    }

    #[test]
    fn test_no_keys_rejects_everything() {
        let verifier = SignatureVerifier::new(&SchedulerSettings::default());
        assert!(verifier.verify(&sign("", b""), b"").is_err());
    }
}
