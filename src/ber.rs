//! Minimal reader of BER identifier/length headers.
//!
//! Legacy OpenSSH private keys are a DER `SEQUENCE` of `INTEGER`s. We only need to walk over the
//! tag/length framing of these elements, so this reader does not interpret the contents at all,
//! it just checks that every header fits into the input.
use crate::error::{Result, Error};

/// Tag number of `INTEGER`.
pub const TAG_INTEGER: u32 = 2;
/// Tag number of `SEQUENCE`.
pub const TAG_SEQUENCE: u32 = 16;

/// Decoded header of a BER element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BerHeader {
    /// Number of bytes occupied by the identifier and length octets.
    pub header_len: usize,
    /// Tag number (without the class and constructed bits).
    pub id: u32,
    /// Length of the contents in bytes.
    pub len: usize,
    /// Class and constructed bits (top three bits of the first identifier octet).
    pub flags: u8,
}

/// Read the identifier and length octets at the start of `data`.
///
/// Both the high-tag-number form of identifiers and the long form of lengths are supported. Fails
/// if `data` ends before the header is complete; the contents of the element are not checked.
pub fn read_id_len(data: &[u8]) -> Result<BerHeader> {
    let mut pos = 0;
    let mut next = || -> Result<u8> {
        let byte = *data.get(pos).ok_or(Error::Asn1("truncated element header"))?;
        pos += 1;
        Ok(byte)
    };

    let first = next()?;
    let flags = first & 0xe0;
    let id = if first & 0x1f == 0x1f {
        let mut id = 0u32;
        loop {
            let byte = next()?;
            id = id.checked_shl(7)
                .filter(|_| id >> 25 == 0)
                .ok_or(Error::Asn1("tag number is too large"))?
                | (byte & 0x7f) as u32;
            if byte & 0x80 == 0 {
                break id
            }
        }
    } else {
        (first & 0x1f) as u32
    };

    let first_len = next()?;
    let len = if first_len & 0x80 != 0 {
        let len_octets = (first_len & 0x7f) as usize;
        let mut len = 0usize;
        for _ in 0..len_octets {
            let byte = next()?;
            if len >> (usize::BITS - 8) != 0 {
                return Err(Error::Asn1("length is too large"))
            }
            len = (len << 8) | byte as usize;
        }
        len
    } else {
        first_len as usize
    };

    Ok(BerHeader { header_len: pos, id, len, flags })
}

/// Sequential reader of BER elements from a byte slice.
#[derive(Debug, Clone)]
pub struct BerReader<'a> {
    buf: &'a [u8],
}

impl<'a> BerReader<'a> {
    /// Wraps the bytes into [`BerReader`].
    pub fn new(buf: &'a [u8]) -> BerReader<'a> {
        BerReader { buf }
    }

    /// Read the header of the next element and check that its contents fit into the input.
    ///
    /// The reader is positioned at the start of the contents.
    pub fn read_header(&mut self, expected_id: u32) -> Result<BerHeader> {
        let header = read_id_len(self.buf)?;
        if header.id != expected_id {
            return Err(Error::Asn1("unexpected element tag"))
        }
        if self.buf.len() - header.header_len < header.len {
            return Err(Error::Asn1("element is longer than the input"))
        }
        self.buf = &self.buf[header.header_len..];
        Ok(header)
    }

    /// Read the next element with tag `expected_id` and return its contents.
    pub fn read_element(&mut self, expected_id: u32) -> Result<&'a [u8]> {
        let header = self.read_header(expected_id)?;
        let (contents, rest) = self.buf.split_at(header.len);
        self.buf = rest;
        Ok(contents)
    }

    /// Return the bytes that were not read yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.buf
    }
}
