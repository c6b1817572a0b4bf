use crate::Result;
use super::{CipherAlgo, Encrypt, Decrypt};

/// "none" cipher (no encryption).
///
/// The block length is 1, so unencrypted PuTTY key files carry no padding.
pub static NONE: CipherAlgo = CipherAlgo {
    name: "none",
    block_len: 1,
    key_len: 0,
    iv_len: 0,
    make_encrypt: |_key, _iv| Ok(Box::new(Identity)),
    make_decrypt: |_key, _iv| Ok(Box::new(Identity)),
};

#[derive(Debug)]
struct Identity;

impl Encrypt for Identity {
    fn encrypt(&mut self, _data: &mut [u8]) -> Result<()> {
        Ok(())
    }
}

impl Decrypt for Identity {
    fn decrypt(&mut self, _data: &mut [u8]) -> Result<()> {
        Ok(())
    }
}
