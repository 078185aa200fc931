//! AES decryption and encryption for callback payloads
//!
//! Three schemes are in use:
//!
//! - WeChat safe mode: AES-256-CBC, IV = first 16 bytes of the key, PKCS#7 to a
//!   32-byte block, framed plaintext ending with the receiving app id.
//! - Douyin: AES-256-CBC, IV = first 16 bytes of the ciphertext, PKCS#7, the
//!   same framing.
//! - WeChat Pay refund `req_info`: AES-256-ECB keyed by the lowercase hex MD5
//!   of the merchant key, PKCS#7.

use aes::{Aes128, Aes192, Aes256};
use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use cbc::cipher::block_padding::{NoPadding, Pkcs7};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};

use super::frame::{frame, unframe, RANDOM_LEN};
use super::padding::{pkcs7_pad, PaddingMode};
use crate::error::WechatError;
use crate::types::EncodingAesKey;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub const AES_BLOCK_SIZE: usize = 16;
/// WeChat pads safe-mode plaintext to 32 bytes, not the AES block size.
pub const WECHAT_PAD_BLOCK_SIZE: usize = 32;

// Vendor keys are 43 characters, so the last symbol carries 2 unused bits
// that are not always zero.
const AES_KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Plaintext recovered from a framed CBC payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedPayload {
    pub random: [u8; RANDOM_LEN],
    pub body: Vec<u8>,
    pub app_id: String,
}

/// Decode an EncodingAESKey by appending the stripped `=` and base64-decoding.
pub fn decode_encoding_aes_key(encoding_aes_key: &str) -> Result<Vec<u8>, WechatError> {
    AES_KEY_ENGINE
        .decode(format!("{}=", encoding_aes_key))
        .map_err(|e| WechatError::Decrypt(format!("Invalid EncodingAESKey: {}", e)))
}

fn decode_ciphertext(encrypted: &str) -> Result<Vec<u8>, WechatError> {
    BASE64
        .decode(encrypted)
        .map_err(|e| WechatError::Decrypt(format!("Invalid base64 ciphertext: {}", e)))
}

fn check_aligned(data: &[u8]) -> Result<(), WechatError> {
    if data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
        return Err(WechatError::Decrypt(format!(
            "ciphertext length {} is not a non-zero multiple of the block size",
            data.len()
        )));
    }
    Ok(())
}

fn cbc_decrypt_in_place(key: &[u8; 32], iv: &[u8], buf: &mut [u8]) -> Result<(), WechatError> {
    check_aligned(buf)?;
    Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| WechatError::Decrypt(format!("Invalid key or IV: {}", e)))?
        .decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|e| WechatError::Decrypt(format!("Decryption failed: {:?}", e)))?;
    Ok(())
}

fn cbc_encrypt_in_place(key: &[u8; 32], iv: &[u8], buf: &mut [u8]) -> Result<(), WechatError> {
    check_aligned(buf)?;
    let len = buf.len();
    Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| WechatError::Decrypt(format!("Invalid key or IV: {}", e)))?
        .encrypt_padded_mut::<NoPadding>(buf, len)
        .map_err(|e| WechatError::Decrypt(format!("Encryption failed: {:?}", e)))?;
    Ok(())
}

fn into_payload(plain: &[u8]) -> Result<DecryptedPayload, WechatError> {
    let frame = unframe(plain)?;
    let app_id = std::str::from_utf8(frame.app_id)
        .map_err(|e| WechatError::Decrypt(format!("Invalid UTF-8 in app id: {}", e)))?
        .to_string();
    Ok(DecryptedPayload {
        random: frame.random,
        body: frame.body.to_vec(),
        app_id,
    })
}

/// Decrypt a WeChat safe-mode `Encrypt` field and check the embedded app id.
pub fn decrypt_message(
    key: &EncodingAesKey,
    app_id: &str,
    encrypted: &str,
    padding: PaddingMode,
) -> Result<DecryptedPayload, WechatError> {
    let mut buf = decode_ciphertext(encrypted)?;
    let aes_key = key.key();
    cbc_decrypt_in_place(aes_key, &aes_key[..AES_BLOCK_SIZE], &mut buf)?;
    let plain = padding.unpad(&buf, WECHAT_PAD_BLOCK_SIZE)?;
    let payload = into_payload(plain)?;

    if payload.app_id != app_id {
        return Err(WechatError::Decrypt(format!(
            "AppID mismatch: expected {}, got {}",
            app_id, payload.app_id
        )));
    }
    Ok(payload)
}

/// Encrypt a reply body for WeChat safe mode and return it base64-encoded.
pub fn encrypt_message(
    key: &EncodingAesKey,
    app_id: &str,
    random: &[u8; RANDOM_LEN],
    body: &[u8],
) -> Result<String, WechatError> {
    let mut buf = frame(random, body, app_id.as_bytes())?;
    pkcs7_pad(&mut buf, WECHAT_PAD_BLOCK_SIZE);
    let aes_key = key.key();
    cbc_encrypt_in_place(aes_key, &aes_key[..AES_BLOCK_SIZE], &mut buf)?;
    Ok(BASE64.encode(buf))
}

/// Decrypt a Douyin `Encrypt` field.
///
/// The first ciphertext block is the IV. The trailing app id is returned as-is;
/// Douyin pushes on behalf of third-party apps, so it is not compared.
pub fn decrypt_douyin(
    key: &EncodingAesKey,
    encrypted: &str,
    padding: PaddingMode,
) -> Result<DecryptedPayload, WechatError> {
    let data = decode_ciphertext(encrypted)?;
    if data.len() < AES_BLOCK_SIZE {
        return Err(WechatError::Decrypt(format!(
            "ciphertext too short: {} bytes",
            data.len()
        )));
    }
    let (iv, rest) = data.split_at(AES_BLOCK_SIZE);
    let mut buf = rest.to_vec();
    cbc_decrypt_in_place(key.key(), iv, &mut buf)?;
    let plain = padding.unpad(&buf, AES_BLOCK_SIZE)?;
    into_payload(plain)
}

/// Encrypt a Douyin payload with an explicit IV, prepending the IV to the output.
pub fn encrypt_douyin(
    key: &EncodingAesKey,
    iv: &[u8; AES_BLOCK_SIZE],
    random: &[u8; RANDOM_LEN],
    body: &[u8],
    app_id: &str,
) -> Result<String, WechatError> {
    let mut buf = frame(random, body, app_id.as_bytes())?;
    pkcs7_pad(&mut buf, AES_BLOCK_SIZE);
    cbc_encrypt_in_place(key.key(), iv, &mut buf)?;

    let mut out = Vec::with_capacity(AES_BLOCK_SIZE + buf.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&buf);
    Ok(BASE64.encode(out))
}

/// AES key for WeChat Pay `req_info`: lowercase hex MD5 of the merchant key.
pub fn pay_aes_key(pay_key: &str) -> String {
    format!("{:x}", md5::compute(pay_key.as_bytes()))
}

fn invalid_key(e: impl std::fmt::Display) -> WechatError {
    WechatError::Decrypt(format!("Invalid key: {}", e))
}

/// AES-ECB decryption with PKCS#7 removal; the key length selects AES-128/192/256.
pub fn ecb_decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, WechatError> {
    check_aligned(data)?;
    let mut buf = data.to_vec();
    let plain_len = match key.len() {
        16 => ecb::Decryptor::<Aes128>::new_from_slice(key)
            .map_err(invalid_key)?
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map(|p| p.len()),
        24 => ecb::Decryptor::<Aes192>::new_from_slice(key)
            .map_err(invalid_key)?
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map(|p| p.len()),
        32 => ecb::Decryptor::<Aes256>::new_from_slice(key)
            .map_err(invalid_key)?
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map(|p| p.len()),
        n => {
            return Err(WechatError::Decrypt(format!(
                "Invalid key length: expected 16, 24 or 32, got {}",
                n
            )))
        }
    }
    .map_err(|e| WechatError::Decrypt(format!("Invalid PKCS7 padding: {:?}", e)))?;

    buf.truncate(plain_len);
    Ok(buf)
}

/// AES-ECB encryption with PKCS#7 padding.
pub fn ecb_encrypt(key: &[u8], plain: &[u8]) -> Result<Vec<u8>, WechatError> {
    let mut buf = plain.to_vec();
    buf.resize(plain.len() + AES_BLOCK_SIZE, 0);
    let cipher_len = match key.len() {
        16 => ecb::Encryptor::<Aes128>::new_from_slice(key)
            .map_err(invalid_key)?
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plain.len())
            .map(|c| c.len()),
        24 => ecb::Encryptor::<Aes192>::new_from_slice(key)
            .map_err(invalid_key)?
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plain.len())
            .map(|c| c.len()),
        32 => ecb::Encryptor::<Aes256>::new_from_slice(key)
            .map_err(invalid_key)?
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plain.len())
            .map(|c| c.len()),
        n => {
            return Err(WechatError::Decrypt(format!(
                "Invalid key length: expected 16, 24 or 32, got {}",
                n
            )))
        }
    }
    .map_err(|e| WechatError::Decrypt(format!("Encryption failed: {:?}", e)))?;

    buf.truncate(cipher_len);
    Ok(buf)
}

/// Decrypt a WeChat Pay refund notification's `req_info`.
pub fn decrypt_pay_info(pay_key: &str, req_info: &str) -> Result<Vec<u8>, WechatError> {
    let data = decode_ciphertext(req_info)?;
    let key = pay_aes_key(pay_key);
    let plain = ecb_decrypt(key.as_bytes(), &data)?;
    if plain.is_empty() {
        return Err(WechatError::Decrypt("req_info decrypted to nothing".to_string()));
    }
    Ok(plain)
}

/// Encrypt a refund payload the way WeChat Pay produces `req_info`.
pub fn encrypt_pay_info(pay_key: &str, plain: &[u8]) -> Result<String, WechatError> {
    let key = pay_aes_key(pay_key);
    Ok(BASE64.encode(ecb_encrypt(key.as_bytes(), plain)?))
}
