//! AES-256-GCM sealing of session cookie values.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD},
    Engine as _,
};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Invalid encryption key format: expected base64 of 32 bytes")]
    InvalidKeyFormat,

    #[error("Encryption failed")]
    SealFailed,

    #[error("Invalid encrypted data format")]
    InvalidDataFormat,

    #[error("Decryption failed")]
    OpenFailed,
}

/// Seals a token as `base64url(nonce || ciphertext)`.
#[derive(Clone)]
pub struct CookieCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CookieCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCipher")
            .field("cipher", &"<redacted>")
            .finish()
    }
}

impl CookieCipher {
    /// Build a cipher from a standard base64 encoded 32 byte key.
    pub fn from_base64_key(key_str: &str) -> Result<Self, CipherError> {
        let key_bytes = BASE64
            .decode(key_str.trim().as_bytes())
            .map_err(|_| CipherError::InvalidKeyFormat)?;

        if key_bytes.len() != 32 {
            return Err(CipherError::InvalidKeyFormat);
        }

        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Generate a new random key, base64 encoded.
    pub fn generate_key() -> String {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        BASE64.encode(key)
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::SealFailed)?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    pub fn open(&self, sealed: &str) -> Result<String, CipherError> {
        let combined = URL_SAFE_NO_PAD
            .decode(sealed.as_bytes())
            .map_err(|_| CipherError::InvalidDataFormat)?;

        if combined.len() <= NONCE_LEN {
            return Err(CipherError::InvalidDataFormat);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::OpenFailed)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidDataFormat)
    }
}
