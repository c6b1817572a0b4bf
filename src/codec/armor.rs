//! Base64 armor used by both key file formats.
//!
//! The text formats store binary blobs as lines of base64 characters. We decode them in atoms of
//! four characters, so that the decoder can be fed line by line without collecting the whole
//! body first.
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use zeroize::Zeroizing;
use crate::error::{Result, Error};
use super::reserve_secret;

/// Number of base64 characters on a full line of a key file.
pub const LINE_WIDTH: usize = 64;

const ATOM_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Is `c` one of the characters that can appear in a base64 atom (including `=`)?
pub fn is_base64_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'+' || c == b'/' || c == b'='
}

/// Encode 1 to 3 bytes into a single atom of 4 characters, padded with `=`.
pub fn encode_atom(data: &[u8]) -> [u8; 4] {
    debug_assert!((1..=3).contains(&data.len()), "atom must encode 1 to 3 bytes");
    let mut atom = [0; 4];
    let written = ATOM_ENGINE.encode_slice(data, &mut atom)
        .expect("4 characters are always enough for 3 bytes");
    debug_assert_eq!(written, 4);
    atom
}

/// Decode a single atom of 4 characters into `output`, returning the number of decoded bytes.
///
/// Fails if the atom contains a character outside of the base64 alphabet or if the `=` padding is
/// misplaced (in the first two positions, or followed by a non-`=` character).
pub fn decode_atom(atom: &[u8; 4], output: &mut [u8; 3]) -> Result<usize> {
    if atom[0] == b'=' || atom[1] == b'=' || (atom[2] == b'=' && atom[3] != b'=') {
        return Err(Error::Base64)
    }
    match ATOM_ENGINE.decode_slice(atom, output) {
        Ok(len) if len > 0 => Ok(len),
        _ => Err(Error::Base64),
    }
}

/// Encode `data` into lines of at most `width` characters, each terminated by `\n`.
///
/// Empty `data` produces no lines at all.
pub fn encode_lines(data: &[u8], width: usize) -> Zeroizing<String> {
    assert!(width > 0, "line width must be positive");
    let encoded = Zeroizing::new(ATOM_ENGINE.encode(data));
    let mut output = Zeroizing::new(String::with_capacity(encoded.len() + encoded.len() / width + 1));
    let mut rest = encoded.as_str();
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(width.min(rest.len()));
        output.push_str(line);
        output.push('\n');
        rest = tail;
    }
    output
}

/// Number of lines produced by [`encode_lines()`] with [`LINE_WIDTH`] for `data_len` bytes.
///
/// A full line of 64 characters holds exactly 48 bytes.
pub fn line_count(data_len: usize) -> usize {
    (data_len + 47) / 48
}

/// Upper bound on the number of bytes decoded from `text_len` characters.
pub fn decoded_capacity(text_len: usize) -> usize {
    text_len / 4 * 3
}

/// Streaming base64 decoder that accumulates atoms of 4 characters.
///
/// Characters outside of the base64 alphabet (such as line breaks) are silently skipped. The
/// decoded bytes are kept in a buffer that is wiped when dropped or grown.
#[derive(Default)]
pub struct AtomDecoder {
    atom: Zeroizing<[u8; 4]>,
    atom_len: usize,
    output: Zeroizing<Vec<u8>>,
}

impl AtomDecoder {
    /// Creates an empty decoder.
    pub fn new() -> AtomDecoder {
        Self::default()
    }

    /// Creates an empty decoder with room for `capacity` decoded bytes.
    pub fn with_capacity(capacity: usize) -> AtomDecoder {
        AtomDecoder { output: Zeroizing::new(Vec::with_capacity(capacity)), ..Self::default() }
    }

    /// Feed more characters into the decoder.
    pub fn push(&mut self, chars: &[u8]) -> Result<()> {
        for &c in chars.iter().filter(|&&c| is_base64_char(c)) {
            self.atom[self.atom_len] = c;
            self.atom_len += 1;
            if self.atom_len == 4 {
                self.atom_len = 0;
                let mut decoded = Zeroizing::new([0; 3]);
                let len = decode_atom(&self.atom, &mut decoded)?;
                reserve_secret(&mut self.output, len);
                self.output.extend_from_slice(&decoded[..len]);
            }
        }
        Ok(())
    }

    /// Number of bytes decoded so far.
    pub fn decoded_len(&self) -> usize {
        self.output.len()
    }

    /// Return the decoded bytes, failing if an incomplete atom is left over.
    pub fn finish(self) -> Result<Zeroizing<Vec<u8>>> {
        if self.atom_len != 0 {
            log::debug!("base64 data ends with an incomplete atom of {} chars", self.atom_len);
            return Err(Error::Base64)
        }
        Ok(self.output)
    }
}

/// Decode base64 `text`, skipping characters outside of the base64 alphabet.
pub fn decode(text: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let mut decoder = AtomDecoder::with_capacity(decoded_capacity(text.len()));
    decoder.push(text)?;
    decoder.finish()
}
