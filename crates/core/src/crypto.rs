//! Symmetric encryption for stored OAuth tokens.
//!
//! Tokens are encrypted with AES-256-GCM before they reach the database and
//! decrypted on the way out. A fresh random nonce is generated per call and
//! prepended to the ciphertext, so encrypting the same token twice yields
//! two unrelated blobs. The authentication tag means a truncated, tampered,
//! or wrong-key ciphertext fails loudly instead of decrypting to garbage.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};

/// AES-GCM nonce length in bytes, stored as a ciphertext prefix.
const NONCE_LEN: usize = 12;

/// Expected length of the hex-encoded 256-bit key.
const HEX_KEY_LEN: usize = 64;

/// Errors from the token cipher.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The configured key is not 64 hex characters (32 bytes).
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption failed. Should not happen for any realistic token length.
    #[error("Encryption failed")]
    Encryption,

    /// The ciphertext is truncated, tampered with, or was produced under a
    /// different key.
    #[error("Decryption failed: ciphertext is corrupt or was encrypted with a different key")]
    Decryption,
}

/// AES-256-GCM cipher for token-at-rest encryption.
///
/// Constructed once at startup from the configured hex key and shared
/// read-only across request handlers. Both operations are pure transforms
/// with no side effects.
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from a 64-character hex key (32 bytes).
    ///
    /// Key validation happens here, at construction, so a malformed key is
    /// a startup failure rather than a per-request error.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CipherError> {
        if hex_key.len() != HEX_KEY_LEN {
            return Err(CipherError::InvalidKey(format!(
                "expected {HEX_KEY_LEN} hex characters, got {}",
                hex_key.len()
            )));
        }
        if !hex_key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CipherError::InvalidKey(
                "key contains non-hex characters".into(),
            ));
        }

        let mut key_bytes = [0u8; HEX_KEY_LEN / 2];
        for (i, byte) in key_bytes.iter_mut().enumerate() {
            // Safe to slice: the key is all-ASCII at this point.
            *byte = u8::from_str_radix(&hex_key[i * 2..i * 2 + 2], 16)
                .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        Ok(Self { cipher })
    }

    /// Encrypt a plaintext token. Returns `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt a `nonce || ciphertext || tag` blob back into the token.
    pub fn decrypt(&self, data: &[u8]) -> Result<String, CipherError> {
        if data.len() <= NONCE_LEN {
            return Err(CipherError::Decryption);
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Decryption)
    }
}
