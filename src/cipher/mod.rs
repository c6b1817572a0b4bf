//! Encryption and decryption algorithms.
//!
//! Private keys in both formats are encrypted with a block cipher in CBC mode. Legacy OpenSSH
//! keys name the cipher in the `DEK-Info` header using OpenSSL names, PuTTY key files name it in
//! the `Encryption` line using SSH names.
//!
//! # Supported algorithms
//!
//! - "DES-EDE3-CBC" ([`DES_EDE3_CBC`])
//! - "AES-128-CBC" ([`AES128_CBC`])
//! - "aes256-cbc" ([`AES256_CBC`])
//! - "none" ([`NONE`])
use crate::Result;
pub use self::block::{DES_EDE3_CBC, AES128_CBC, AES256_CBC};
pub use self::none::NONE;

mod block;
mod none;

/// Algorithm for encrypting and decrypting key blobs.
///
/// See the [module documentation][self] for details.
pub struct CipherAlgo {
    /// Name of the algorithm.
    pub name: &'static str,
    /// Length of the cipher block; data must be padded to a multiple of this length.
    pub block_len: usize,
    /// Length of the key in bytes.
    pub key_len: usize,
    /// Length of the initialization vector in bytes.
    pub iv_len: usize,
    pub(crate) make_encrypt: fn(key: &[u8], iv: &[u8]) -> Result<Box<dyn Encrypt + Send>>,
    pub(crate) make_decrypt: fn(key: &[u8], iv: &[u8]) -> Result<Box<dyn Decrypt + Send>>,
}

impl CipherAlgo {
    /// Encrypt `data` in place; `data` must be aligned to [`block_len`][Self::block_len].
    pub fn encrypt(&self, key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<()> {
        (self.make_encrypt)(key, iv)?.encrypt(data)
    }

    /// Decrypt `data` in place; `data` must be aligned to [`block_len`][Self::block_len].
    pub fn decrypt(&self, key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<()> {
        (self.make_decrypt)(key, iv)?.decrypt(data)
    }
}

impl std::fmt::Debug for CipherAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CipherAlgo").field("name", &self.name).finish_non_exhaustive()
    }
}

pub(crate) trait Encrypt {
    fn encrypt(&mut self, data: &mut [u8]) -> Result<()>;
}

pub(crate) trait Decrypt {
    fn decrypt(&mut self, data: &mut [u8]) -> Result<()>;
}
