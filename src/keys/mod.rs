//! Encoding and decoding of key files.
//!
//! Keys are read from the legacy OpenSSH PEM format ([`decode_openssh_pem_privkey()`] and the
//! two-step [`parse_openssh_pem()`]) and written to the PuTTY key file format
//! ([`encode_putty_keyfile()`]). PuTTY files can also be read back with
//! [`decode_putty_keyfile()`].
pub use self::openssh::{
    IMPORTED_COMMENT, OpensshKeyType, OpensshContainer,
    decode_openssh_pem_privkey, parse_openssh_pem,
};
pub use self::putty::{encode_putty_keyfile, decode_putty_keyfile};

mod openssh;
mod putty;
