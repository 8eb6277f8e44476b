// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential verification.
//!
//! Verification is a pure function of (token, signing secret, current
//! time). The signature is checked before any claim is trusted; expiry is
//! checked only on a token whose signature verified.

use jsonwebtoken::{dangerous, decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::Claims;
use super::SigningSecret;

/// Algorithm used for every credential this service issues.
pub const CREDENTIAL_ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a presented credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// Not a signed token of the expected structure
    Malformed,
    /// Parses, but does not verify against the process secret
    SignatureInvalid,
    /// Signature verifies, but `now > exp`
    Expired,
}

impl VerifyError {
    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyError::Malformed => "malformed",
            VerifyError::SignatureInvalid => "signature_invalid",
            VerifyError::Expired => "expired",
        }
    }
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verifies credentials against the process-wide signing secret.
#[derive(Clone)]
pub struct CredentialVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    /// Create a verifier bound to `secret`.
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(CREDENTIAL_ALGORITHM);
        // Expiry is evaluated against the caller-supplied clock in `verify`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose()),
            validation,
        }
    }

    /// Verify `token` at `now` (Unix seconds) and return its claims.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, VerifyError> {
        // Shape only: three segments, a header naming a known algorithm and
        // a JSON object payload. Nothing read here is trusted.
        dangerous::insecure_decode::<serde_json::Map<String, serde_json::Value>>(token)
            .map_err(|_| VerifyError::Malformed)?;

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyError::SignatureInvalid
                }
                _ => VerifyError::Malformed,
            },
        )?;

        let claims = token_data.claims;
        if claims.subject_id.is_empty() {
            return Err(VerifyError::Malformed);
        }
        if claims.is_expired_at(now) {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    /// Verify `token` against the system clock.
    pub fn verify_now(&self, token: &str) -> Result<Claims, VerifyError> {
        self.verify(token, chrono::Utc::now().timestamp())
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithm", &CREDENTIAL_ALGORITHM)
            .finish_non_exhaustive()
    }
}
