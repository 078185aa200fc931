//! PKCS#7 padding helpers
//!
//! The vendors pad before AES-CBC with different block sizes: WeChat safe mode
//! pads to 32 bytes, Douyin to the AES block size. Removal can run in a
//! lenient mode that matches what the vendor SDKs accept, or in a strict mode
//! that validates every padding byte.

use serde::Deserialize;

use crate::error::WechatError;

/// How PKCS#7 padding is removed after CBC decryption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    /// Drop as many bytes as the last byte says; other padding bytes are not checked.
    #[default]
    Lenient,
    /// Require the pad length to be within `1..=block_size` and every pad byte to equal it.
    Strict,
}

impl PaddingMode {
    /// Strip padding from `data` according to this mode.
    pub fn unpad(self, data: &[u8], block_size: usize) -> Result<&[u8], WechatError> {
        match self {
            PaddingMode::Lenient => pkcs7_unpad_lenient(data),
            PaddingMode::Strict => pkcs7_unpad_strict(data, block_size),
        }
    }
}

/// Append PKCS#7 padding to a multiple of `block_size`.
///
/// A full block of padding is appended when `data` is already aligned.
pub fn pkcs7_pad(data: &mut Vec<u8>, block_size: usize) {
    debug_assert!(block_size > 0 && block_size <= u8::MAX as usize);
    let pad_len = block_size - (data.len() % block_size);
    data.resize(data.len() + pad_len, pad_len as u8);
}

/// Last byte N means drop the last N bytes.
pub fn pkcs7_unpad_lenient(data: &[u8]) -> Result<&[u8], WechatError> {
    let Some(&last) = data.last() else {
        return Err(WechatError::Decrypt("cannot unpad empty plaintext".to_string()));
    };
    let pad_len = last as usize;
    if pad_len > data.len() {
        return Err(WechatError::Decrypt(format!(
            "padding length {} exceeds plaintext length {}",
            pad_len,
            data.len()
        )));
    }
    Ok(&data[..data.len() - pad_len])
}

pub fn pkcs7_unpad_strict(data: &[u8], block_size: usize) -> Result<&[u8], WechatError> {
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(WechatError::Decrypt(format!(
            "plaintext length {} is not a multiple of {}",
            data.len(),
            block_size
        )));
    }
    let pad_len = data[data.len() - 1] as usize;
    if pad_len == 0 || pad_len > block_size {
        return Err(WechatError::Decrypt(format!(
            "invalid padding length {}",
            pad_len
        )));
    }
    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| b as usize != pad_len) {
        return Err(WechatError::Decrypt("malformed PKCS7 padding".to_string()));
    }
    Ok(body)
}
