use zeroize::Zeroizing;
use crate::cipher::{self, CipherAlgo};
use crate::codec::armor;
use crate::digest::SHA1;
use crate::error::{Result, Error};
use crate::mac::{self, HMAC_SHA1};
use crate::pubkey::{self, Privkey, UserKey};

static FILE_HEADER: &str = "PuTTY-User-Key-File-2";
static MAC_KEY_PREFIX: &[u8] = b"putty-private-key-file-mac-key";

/// Encode a private key into a PuTTY key file (version 2).
///
/// If `passphrase` is given, the private blob is encrypted with "aes256-cbc", otherwise it is
/// stored in plaintext with encryption "none". The file is protected by a HMAC-SHA1 of all its
/// fields in both cases.
///
/// The output is deterministic: the padding of the private blob is taken from its SHA-1 digest
/// and PuTTY uses a zero IV.
///
/// The comment is stored on a single line, so it must not contain line breaks.
pub fn encode_putty_keyfile(key: &UserKey, passphrase: Option<&[u8]>) -> Result<Zeroizing<String>> {
    if key.comment.contains(&['\n', '\r'][..]) {
        return Err(Error::Comment("comment must not contain line breaks"))
    }

    let algo_name = key.privkey.algo().name;
    let public_blob = key.privkey.public_blob();
    let private_blob = key.privkey.private_blob();

    let cipher = match passphrase {
        Some(_) => &cipher::AES256_CBC,
        None => &cipher::NONE,
    };

    let mut padded_blob = Zeroizing::new(Vec::with_capacity(private_blob.len() + cipher.block_len));
    padded_blob.extend_from_slice(&private_blob);
    let padding_len = (cipher.block_len - private_blob.len() % cipher.block_len) % cipher.block_len;
    let private_digest = SHA1.digest(&[private_blob.as_slice()]);
    padded_blob.extend_from_slice(&private_digest[..padding_len]);

    let mut mac = start_mac(passphrase.unwrap_or_default())?;
    for field in [algo_name.as_bytes(), cipher.name.as_bytes(), key.comment.as_bytes(), public_blob.as_slice()] {
        mac_field(&mut *mac, field)?;
    }
    mac_field(&mut *mac, &padded_blob)?;
    let mac_tag = mac.sign();

    if let Some(passphrase) = passphrase {
        let cipher_key = derive_cipher_key(passphrase);
        let iv = [0; 16];
        cipher.encrypt(&cipher_key[..cipher.key_len], &iv[..cipher.iv_len], &mut padded_blob)?;
    }

    log::debug!("encoded putty key file {:?}, encryption {:?}, public blob {} bytes, private blob {} bytes",
        algo_name, cipher.name, public_blob.len(), padded_blob.len());

    let public_lines = armor::encode_lines(&public_blob, armor::LINE_WIDTH);
    let private_lines = armor::encode_lines(&padded_blob, armor::LINE_WIDTH);
    // the fixed lines take less than 256 bytes, so the buffer never grows
    let capacity = 256 + key.comment.len() + public_lines.len() + private_lines.len();
    let mut output = Zeroizing::new(String::with_capacity(capacity));
    let mut push_line = |name: &str, value: &str| {
        output.push_str(name);
        output.push_str(": ");
        output.push_str(value);
        output.push('\n');
    };
    push_line(FILE_HEADER, algo_name);
    push_line("Encryption", cipher.name);
    push_line("Comment", &key.comment);
    push_line("Public-Lines", &armor::line_count(public_blob.len()).to_string());
    output.push_str(&public_lines);
    output.push_str("Private-Lines: ");
    output.push_str(&armor::line_count(padded_blob.len()).to_string());
    output.push('\n');
    output.push_str(&private_lines);
    output.push_str("Private-MAC: ");
    output.push_str(&hex::encode(mac_tag));
    output.push('\n');
    Ok(output)
}

/// Decode a private key from a PuTTY key file (version 2).
///
/// The `passphrase` is used only if the file is encrypted; if it is missing for an encrypted file,
/// we try the empty passphrase. The MAC is verified before the key is reconstructed: a mismatch
/// in an encrypted file is reported as [`Error::BadKeyPassphrase`], in an unencrypted file as
/// [`Error::Mac`].
pub fn decode_putty_keyfile(text: &str, passphrase: Option<&[u8]>) -> Result<UserKey> {
    let mut reader = LineReader { lines: text.lines() };

    let algo_name = reader.value(FILE_HEADER)?;
    let algo = pubkey::algo_by_name(algo_name)
        .ok_or(Error::Decode("unknown key algorithm in putty key file"))?;

    let cipher_name = reader.value("Encryption")?;
    let cipher = cipher_by_name(cipher_name)
        .ok_or_else(|| Error::UnsupportedCipher(cipher_name.into()))?;

    let comment = reader.value("Comment")?;
    let public_blob = reader.blob("Public-Lines")?;
    let mut private_blob = reader.blob("Private-Lines")?;
    let mac_tag = hex::decode(reader.value("Private-MAC")?)
        .map_err(|_| Error::Decode("private mac is not valid hex"))?;

    if private_blob.len() % cipher.block_len != 0 {
        return Err(Error::Decode("private blob is not aligned to cipher block"))
    }

    let encrypted = cipher.name != cipher::NONE.name;
    let passphrase: &[u8] = if encrypted { passphrase.unwrap_or_default() } else { &[] };
    if encrypted {
        let cipher_key = derive_cipher_key(passphrase);
        let iv = [0; 16];
        cipher.decrypt(&cipher_key[..cipher.key_len], &iv[..cipher.iv_len], &mut private_blob)?;
    }

    let mut mac = start_mac(passphrase)?;
    for field in [algo_name.as_bytes(), cipher_name.as_bytes(), comment.as_bytes(), public_blob.as_slice()] {
        mac_field(&mut *mac, field)?;
    }
    mac_field(&mut *mac, &private_blob)?;
    mac.verify(&mac_tag).map_err(|err| match err {
        Error::Mac if encrypted => Error::BadKeyPassphrase,
        err => err,
    })?;

    let privkey = Privkey::from_blobs(&public_blob, &private_blob)?;
    if privkey.algo().name != algo.name {
        return Err(Error::Decode("key algorithm in putty key file does not match public blob"))
    }
    Ok(UserKey { privkey, comment: comment.into() })
}

fn cipher_by_name(name: &str) -> Option<&'static CipherAlgo> {
    static CIPHERS: &[&CipherAlgo] = &[&cipher::NONE, &cipher::AES256_CBC];
    CIPHERS.iter().copied().find(|cipher| cipher.name == name)
}

fn start_mac(passphrase: &[u8]) -> Result<Box<dyn mac::Mac + Send>> {
    let mac_key = SHA1.digest(&[MAC_KEY_PREFIX, passphrase]);
    HMAC_SHA1.start(&mac_key)
}

fn mac_field(mac: &mut (dyn mac::Mac + Send), data: &[u8]) -> Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| Error::Crypto("putty key file field is too long"))?;
    mac.update(&len.to_be_bytes());
    mac.update(data);
    Ok(())
}

fn derive_cipher_key(passphrase: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(2 * SHA1.output_len));
    for counter in 0u32..2 {
        key.extend_from_slice(&SHA1.digest(&[counter.to_be_bytes().as_slice(), passphrase]));
    }
    key
}

struct LineReader<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> LineReader<'a> {
    fn line(&mut self) -> Result<&'a str> {
        self.lines.next().ok_or(Error::Decode("unexpected end of putty key file"))
    }

    fn value(&mut self, name: &str) -> Result<&'a str> {
        match self.line()?.split_once(": ") {
            Some((key, value)) if key == name => Ok(value),
            _ => {
                log::debug!("expected {:?} line in putty key file", name);
                Err(Error::Decode("unexpected line in putty key file"))
            },
        }
    }

    fn blob(&mut self, name: &str) -> Result<Zeroizing<Vec<u8>>> {
        let line_count: usize = self.value(name)?.parse()
            .map_err(|_| Error::Decode("line count in putty key file is not a number"))?;
        // a full line holds 48 bytes, but do not trust a huge line count before reading the lines
        let capacity = line_count.saturating_mul(48).min(1 << 16);
        let mut decoder = armor::AtomDecoder::with_capacity(capacity);
        for _ in 0..line_count {
            decoder.push(self.line()?.as_bytes())?;
        }
        decoder.finish()
    }
}
