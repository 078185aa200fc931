//! Cryptography for vendor callbacks
//!
//! - [`signature`] - SHA-1 callback signatures and WeChat Pay MD5/HMAC-SHA256 signs
//! - [`aes`] - AES-CBC (WeChat safe mode, Douyin) and AES-ECB (WeChat Pay refunds)
//! - [`padding`] - PKCS#7 padding with lenient or strict removal
//! - [`frame`] - `random(16) | len(4, BE) | body | app_id` plaintext framing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_callback_sdk::crypto;
//!
//! let ok = crypto::verify_sha1_signature(&[token, timestamp, nonce, encrypt], msg_signature);
//! let payload = crypto::decrypt_douyin(&key, encrypt, PaddingMode::Lenient)?;
//! ```

pub mod aes;
pub mod frame;
pub mod padding;
pub mod signature;

pub use aes::{
    decrypt_douyin, decrypt_message, decrypt_pay_info, encrypt_douyin, encrypt_message,
    encrypt_pay_info, DecryptedPayload,
};
pub use padding::PaddingMode;
pub use signature::{
    pay_signature, sha1_signature, verify_pay_signature, verify_sha1_signature, PaySignType,
};
