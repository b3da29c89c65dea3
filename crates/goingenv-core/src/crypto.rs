//! Password-based authenticated encryption.
//!
//! Containers are `salt(32) ‖ nonce(12) ‖ ciphertext ‖ tag(16)`. The key is
//! derived per container with PBKDF2-HMAC-SHA256 at 100 000 iterations, so
//! nonce uniqueness only needs to hold per key. The derived key lives in a
//! [`Zeroizing`] buffer and is wiped on every exit path.

use aes_gcm::aead::Aead;
use aes_gcm::Aes256Gcm;
use aes_gcm::KeyInit;
use aes_gcm::Nonce;
use pbkdf2::pbkdf2_hmac;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::error::CryptoOp;
use crate::error::MIN_CONTAINER_LEN;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Character set for generated passwords.
const PASSWORD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

/// Derives an AES-256 key from a password and salt.
///
/// PBKDF2 at 100 000 iterations takes tens of milliseconds; callers on a
/// latency-critical path should not invoke this without user awareness.
fn derive_key(password: &SecretString, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        &mut *key,
    );
    key
}

/// Encrypts `data` under `password`.
///
/// Draws a fresh salt and nonce from the system's secure random source, so
/// two calls with identical inputs produce different containers.
///
/// # Errors
///
/// Rejects empty data and empty passwords; fails if the random source is
/// unavailable.
///
/// # Examples
///
/// ```
/// use goingenv_core::crypto;
/// use secrecy::SecretString;
///
/// let password = SecretString::from("correct horse".to_string());
/// let sealed = crypto::encrypt(b"DEBUG=true\n", &password)?;
/// let plain = crypto::decrypt(&sealed, &password)?;
/// assert_eq!(plain, b"DEBUG=true\n");
/// # Ok::<(), goingenv_core::CryptoError>(())
/// ```
pub fn encrypt(data: &[u8], password: &SecretString) -> Result<Vec<u8>, CryptoError> {
    if data.is_empty() {
        return Err(CryptoError::EmptyData {
            op: CryptoOp::Encrypt,
        });
    }
    if password.expose_secret().is_empty() {
        return Err(CryptoError::EmptyPassword {
            op: CryptoOp::Encrypt,
        });
    }

    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).map_err(|source| CryptoError::Rng {
        op: CryptoOp::Encrypt,
        source,
    })?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    getrandom::fill(&mut nonce_bytes).map_err(|source| CryptoError::Rng {
        op: CryptoOp::Encrypt,
        source,
    })?;

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Cipher {
        op: CryptoOp::Encrypt,
    })?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), data)
        .map_err(|_| CryptoError::Cipher {
            op: CryptoOp::Encrypt,
        })?;

    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypts a container produced by [`encrypt`].
///
/// # Errors
///
/// Inputs shorter than the structural minimum (salt + nonce + tag) are
/// rejected before key derivation runs. Authentication failures return a
/// single generic error that does not distinguish a wrong password from
/// tampered ciphertext.
pub fn decrypt(data: &[u8], password: &SecretString) -> Result<Vec<u8>, CryptoError> {
    if data.len() < MIN_CONTAINER_LEN {
        return Err(CryptoError::Truncated {
            op: CryptoOp::Decrypt,
            len: data.len(),
        });
    }
    if password.expose_secret().is_empty() {
        return Err(CryptoError::EmptyPassword {
            op: CryptoOp::Decrypt,
        });
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce_bytes, sealed) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Cipher {
        op: CryptoOp::Decrypt,
    })?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CryptoError::Auth {
            op: CryptoOp::Decrypt,
        })
}

/// Checks whether `password` authenticates `data`, discarding the
/// plaintext.
///
/// # Errors
///
/// Same failure modes as [`decrypt`], reported under the `validate`
/// operation.
pub fn validate_password(data: &[u8], password: &SecretString) -> Result<(), CryptoError> {
    match decrypt(data, password) {
        Ok(_) => Ok(()),
        Err(CryptoError::Truncated { len, .. }) => Err(CryptoError::Truncated {
            op: CryptoOp::Validate,
            len,
        }),
        Err(CryptoError::EmptyPassword { .. }) => Err(CryptoError::EmptyPassword {
            op: CryptoOp::Validate,
        }),
        Err(CryptoError::Auth { .. }) => Err(CryptoError::Auth {
            op: CryptoOp::Validate,
        }),
        Err(other) => Err(other),
    }
}

/// Generates a random password of `len` characters from a mixed charset.
///
/// # Errors
///
/// Rejects lengths below 8; fails if the random source is unavailable.
pub fn generate_password(len: usize) -> Result<String, CryptoError> {
    if len < 8 {
        return Err(CryptoError::PasswordTooShort { min: 8 });
    }

    let mut bytes = vec![0u8; len];
    getrandom::fill(&mut bytes).map_err(|source| CryptoError::Rng {
        op: CryptoOp::Encrypt,
        source,
    })?;

    Ok(bytes
        .iter()
        .map(|b| PASSWORD_CHARSET[*b as usize % PASSWORD_CHARSET.len()] as char)
        .collect())
}
