//! PKCE (RFC 7636) verifier/challenge generation and anti-forgery state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

use crate::error::{AuthError, Result};

/// The only challenge method this client sends.
pub const CHALLENGE_METHOD: &str = "S256";

const VERIFIER_BYTES: usize = 32;
const STATE_BYTES: usize = 32;

/// PKCE verifier and its derived S256 challenge.
///
/// # Example
/// ```
/// use hub_auth::pkce::PkceChallenge;
///
/// let pair = PkceChallenge::generate()?;
/// assert_eq!(PkceChallenge::challenge_for(&pair.verifier), pair.challenge);
/// # Ok::<(), hub_auth::AuthError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a fresh pair from the operating system's secure random source.
    pub fn generate() -> Result<Self> {
        let verifier = URL_SAFE_NO_PAD.encode(secure_random::<VERIFIER_BYTES>()?);
        Ok(Self::from_verifier(verifier))
    }

    /// Rebuild a pair from a known verifier.
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// `BASE64URL(SHA256(ASCII(verifier)))`, unpadded.
    pub fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("verifier", &"[redacted]")
            .field("challenge", &self.challenge)
            .finish()
    }
}

/// Single-use anti-forgery `state` value for one authorization attempt.
pub fn generate_state() -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(secure_random::<STATE_BYTES>()?))
}

fn secure_random<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|err| AuthError::Randomness(err.to_string()))?;
    Ok(buf)
}
