use cbc::cipher::{BlockEncryptMut, BlockDecryptMut, KeyIvInit};
use cbc::cipher::inout::InOutBuf;
use crate::error::{Result, Error};
use super::{CipherAlgo, Encrypt, Decrypt};

/// "DES-EDE3-CBC" cipher (triple DES in CBC mode), as named in OpenSSL `DEK-Info` headers.
pub static DES_EDE3_CBC: CipherAlgo = CipherAlgo {
    name: "DES-EDE3-CBC",
    block_len: 8,
    key_len: 24,
    iv_len: 8,
    make_encrypt: new_encrypt::<cbc::Encryptor<des::TdesEde3>>,
    make_decrypt: new_decrypt::<cbc::Decryptor<des::TdesEde3>>,
};

/// "AES-128-CBC" cipher, as named in OpenSSL `DEK-Info` headers.
pub static AES128_CBC: CipherAlgo = CipherAlgo {
    name: "AES-128-CBC",
    block_len: 16,
    key_len: 16,
    iv_len: 16,
    make_encrypt: new_encrypt::<cbc::Encryptor<aes::Aes128>>,
    make_decrypt: new_decrypt::<cbc::Decryptor<aes::Aes128>>,
};

/// "aes256-cbc" cipher from RFC 4253, used by PuTTY key files.
pub static AES256_CBC: CipherAlgo = CipherAlgo {
    name: "aes256-cbc",
    block_len: 16,
    key_len: 32,
    iv_len: 16,
    make_encrypt: new_encrypt::<cbc::Encryptor<aes::Aes256>>,
    make_decrypt: new_decrypt::<cbc::Decryptor<aes::Aes256>>,
};

struct BlockEncrypt<T> {
    encrypt: T,
}

struct BlockDecrypt<T> {
    decrypt: T,
}

fn new_encrypt<T>(key: &[u8], iv: &[u8]) -> Result<Box<dyn Encrypt + Send>>
    where T: KeyIvInit + BlockEncryptMut + Send + 'static
{
    let encrypt = T::new_from_slices(key, iv)
        .map_err(|_| Error::Crypto("invalid key or iv length for block cipher"))?;
    Ok(Box::new(BlockEncrypt { encrypt }))
}

fn new_decrypt<T>(key: &[u8], iv: &[u8]) -> Result<Box<dyn Decrypt + Send>>
    where T: KeyIvInit + BlockDecryptMut + Send + 'static
{
    let decrypt = T::new_from_slices(key, iv)
        .map_err(|_| Error::Crypto("invalid key or iv length for block cipher"))?;
    Ok(Box::new(BlockDecrypt { decrypt }))
}

impl<T: BlockEncryptMut> Encrypt for BlockEncrypt<T> {
    fn encrypt(&mut self, data: &mut [u8]) -> Result<()> {
        let (blocks, tail) = InOutBuf::from(data).into_chunks();
        if !tail.is_empty() {
            return Err(Error::Crypto("plaintext is not aligned to block"))
        }
        self.encrypt.encrypt_blocks_inout_mut(blocks);
        Ok(())
    }
}

impl<T: BlockDecryptMut> Decrypt for BlockDecrypt<T> {
    fn decrypt(&mut self, data: &mut [u8]) -> Result<()> {
        let (blocks, tail) = InOutBuf::from(data).into_chunks();
        if !tail.is_empty() {
            return Err(Error::Crypto("ciphertext is not aligned to block"))
        }
        self.decrypt.decrypt_blocks_inout_mut(blocks);
        Ok(())
    }
}
