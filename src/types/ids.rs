use serde::{Deserialize, Serialize};

use crate::crypto::aes::decode_encoding_aes_key;

/// Application identifier (`wx...` for WeChat, `tt...` for Douyin)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("AppId must not be empty".to_string());
        }
        if id.chars().any(char::is_whitespace) {
            return Err(format!("AppId must not contain whitespace, got {:?}", id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AppId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Callback token configured on the vendor console
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Result<Self, String> {
        let token = token.into();
        if token.is_empty() {
            return Err("Token must not be empty".to_string());
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Token {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

/// EncodingAESKey: 43 base64 characters without the trailing `=`
///
/// The decoded 32-byte key is kept alongside the configured text.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct EncodingAesKey {
    encoded: String,
    key: [u8; 32],
}

impl EncodingAesKey {
    pub const LEN: usize = 43;

    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let encoded = key.into().trim().to_string();
        if encoded.len() != Self::LEN {
            return Err(format!(
                "EncodingAesKey must be {} characters, got {}",
                Self::LEN,
                encoded.len()
            ));
        }
        let decoded = decode_encoding_aes_key(&encoded).map_err(|e| e.to_string())?;
        let key: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| format!("EncodingAesKey must decode to 32 bytes, got {}", decoded.len()))?;
        Ok(Self { encoded, key })
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The decoded AES-256 key
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }
}

impl TryFrom<String> for EncodingAesKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Debug for EncodingAesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncodingAesKey([REDACTED])")
    }
}

/// WeChat Pay v2 API key (merchant key)
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PayKey(String);

impl PayKey {
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.is_empty() {
            return Err("PayKey must not be empty".to_string());
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PayKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Debug for PayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PayKey([REDACTED])")
    }
}
