//! Conversion of OpenSSH private keys into PuTTY key files.
//!
//! - The simplest entry point is [`convert()`], which converts a key file into another key file
//!   and reports an integer status.
//! - [`convert_file()`] and [`convert_pem()`] take a [`ConvertConfig`] with passphrases and the
//!   comment for the PuTTY file.
//! - Functions for decoding and encoding the individual formats are in the [`keys`] module.
//!
//! Only legacy (PEM) OpenSSH keys with RSA or DSA keys are supported. They can be encrypted with
//! "DES-EDE3-CBC" or "AES-128-CBC". The PuTTY files are written in version 2 of the format.
#![allow(clippy::collapsible_if)]
#![allow(clippy::module_inception)]
#![allow(clippy::type_complexity)]
#![warn(missing_docs)]

pub use crate::convert::{ConvertConfig, convert, convert_file, convert_pem};
pub use crate::error::{Result, Error, STATUS_OK, STATUS_IO, STATUS_INVALID};

pub use self::cipher::CipherAlgo;
pub use self::digest::HashAlgo;
pub use self::mac::MacAlgo;
pub use self::pubkey::{KeyAlgo, Privkey, UserKey};

pub use dsa;
pub use num_bigint_dig;
pub use rsa;

pub mod ber;
pub mod cipher;
pub mod codec;
mod convert;
pub mod digest;
mod error;
pub mod keys;
pub mod mac;
pub mod pubkey;
