//! Checks that secret bytes do not survive in memory that is returned to the allocator.
//!
//! The global allocator of this test binary scans every freed block for a "needle" (a piece of
//! key material). Blocks are allocated zeroed, so the scan never reads uninitialized memory.
use keyconvert::ConvertConfig;
use keyconvert::digest::{MD5, SHA1};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

#[allow(dead_code)]
#[path = "../keys/keys.rs"]
mod keys;

const NEEDLE_CAP: usize = 32;

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU8 = AtomicU8::new(0);
static NEEDLE: [AtomicU8; NEEDLE_CAP] = [ZERO; NEEDLE_CAP];
static NEEDLE_LEN: AtomicUsize = AtomicUsize::new(0);
static LEAKS: AtomicUsize = AtomicUsize::new(0);
static CHECK_LOCK: Mutex<()> = Mutex::new(());

struct WipeCheck;

#[global_allocator]
static ALLOCATOR: WipeCheck = WipeCheck;

unsafe impl GlobalAlloc for WipeCheck {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let needle_len = NEEDLE_LEN.load(Ordering::SeqCst);
        if needle_len != 0 && layout.size() >= needle_len {
            let mut needle = [0; NEEDLE_CAP];
            for (byte, atomic) in needle.iter_mut().zip(NEEDLE.iter()) {
                *byte = atomic.load(Ordering::Relaxed);
            }
            let block = std::slice::from_raw_parts(ptr, layout.size());
            if block.windows(needle_len).any(|window| window == &needle[..needle_len]) {
                LEAKS.fetch_add(1, Ordering::SeqCst);
            }
        }
        System.dealloc(ptr, layout)
    }
}

/// Run `f` and count the freed blocks that still contain `needle`.
fn count_leaks(needle: &[u8], f: impl FnOnce()) -> usize {
    assert!(!needle.is_empty() && needle.len() <= NEEDLE_CAP);
    let _guard = CHECK_LOCK.lock().unwrap_or_else(|err| err.into_inner());
    for (atomic, &byte) in NEEDLE.iter().zip(needle) {
        atomic.store(byte, Ordering::Relaxed);
    }
    LEAKS.store(0, Ordering::SeqCst);
    NEEDLE_LEN.store(needle.len(), Ordering::SeqCst);
    f();
    NEEDLE_LEN.store(0, Ordering::SeqCst);
    LEAKS.load(Ordering::SeqCst)
}

#[test]
fn test_private_key_is_wiped() {
    let mut prime_prefix = [0; 16];
    hex::decode_to_slice(&keys::rsa_fields().p[..32], &mut prime_prefix).unwrap();

    let leaks = count_leaks(&prime_prefix, || {
        let key = keyconvert::keys::decode_openssh_pem_privkey(keys::RSA_PRIVKEY_FILE.as_bytes(), b"")
            .unwrap();
        let encoded = keyconvert::keys::encode_putty_keyfile(&key, None).unwrap();
        assert_eq!(encoded.as_str(), keys::RSA_PPK_FILE);

        let config = ConvertConfig::default();
        keyconvert::convert_pem(keys::RSA_PRIVKEY_FILE.as_bytes(), &config).unwrap();

        let decoded = keyconvert::keys::decode_putty_keyfile(keys::RSA_PPK_FILE, None).unwrap();
        assert!(decoded == key);
    });
    assert_eq!(leaks, 0);
}

#[test]
fn test_openssh_derived_key_is_wiped() {
    // first MD5 block of the key derived from "password" and the salt in the DEK-Info header
    let mut salt = [0; 8];
    hex::decode_to_slice("80028CFF22DDCA67", &mut salt).unwrap();
    assert!(keys::RSA_DES3_PRIVKEY_FILE.contains("DEK-Info: DES-EDE3-CBC,80028CFF22DDCA67\n"));
    let mut block_a = [0; 16];
    block_a.copy_from_slice(&MD5.digest(&[b"password", &salt]));

    let leaks = count_leaks(&block_a, || {
        let key = keyconvert::keys::decode_openssh_pem_privkey(
            keys::RSA_DES3_PRIVKEY_FILE.as_bytes(), b"password").unwrap();
        assert_eq!(key.privkey.algo().name, "ssh-rsa");
    });
    assert_eq!(leaks, 0);
}

#[test]
fn test_putty_derived_key_is_wiped() {
    // first half of the aes256-cbc key derived from passphrase "test"
    let mut key_prefix = [0; 20];
    key_prefix.copy_from_slice(&SHA1.digest(&[b"\0\0\0\0test"]));

    let leaks = count_leaks(&key_prefix, || {
        let key = keyconvert::keys::decode_openssh_pem_privkey(keys::RSA_PRIVKEY_FILE.as_bytes(), b"")
            .unwrap();
        let encoded = keyconvert::keys::encode_putty_keyfile(&key, Some(b"test")).unwrap();
        assert_eq!(encoded.as_str(), keys::RSA_PPK_TEST_FILE);

        let decoded = keyconvert::keys::decode_putty_keyfile(keys::RSA_PPK_TEST_FILE, Some(b"test"))
            .unwrap();
        assert!(decoded == key);
    });
    assert_eq!(leaks, 0);
}
