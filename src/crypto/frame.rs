//! Length-prefixed plaintext framing shared by WeChat safe mode and Douyin
//!
//! Layout: 16 random bytes, a 4-byte big-endian body length, the body, then the
//! application id up to the end of the buffer.

use crate::error::WechatError;

pub const RANDOM_LEN: usize = 16;
const LENGTH_LEN: usize = 4;
const HEADER_LEN: usize = RANDOM_LEN + LENGTH_LEN;

/// A decoded frame borrowing from the decrypted buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub random: [u8; RANDOM_LEN],
    pub body: &'a [u8],
    pub app_id: &'a [u8],
}

pub fn unframe(plain: &[u8]) -> Result<Frame<'_>, WechatError> {
    if plain.len() < HEADER_LEN {
        return Err(WechatError::Decrypt(format!(
            "plaintext too short: {} bytes",
            plain.len()
        )));
    }

    let mut random = [0u8; RANDOM_LEN];
    random.copy_from_slice(&plain[..RANDOM_LEN]);

    let mut len_bytes = [0u8; LENGTH_LEN];
    len_bytes.copy_from_slice(&plain[RANDOM_LEN..HEADER_LEN]);
    let body_len = u32::from_be_bytes(len_bytes) as usize;

    let rest = &plain[HEADER_LEN..];
    if body_len > rest.len() {
        return Err(WechatError::Decrypt(format!(
            "declared body length {} exceeds remaining {} bytes",
            body_len,
            rest.len()
        )));
    }

    let (body, app_id) = rest.split_at(body_len);
    Ok(Frame {
        random,
        body,
        app_id,
    })
}

pub fn frame(random: &[u8; RANDOM_LEN], body: &[u8], app_id: &[u8]) -> Result<Vec<u8>, WechatError> {
    let body_len = u32::try_from(body.len())
        .map_err(|_| WechatError::Decrypt(format!("body too large: {} bytes", body.len())))?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len() + app_id.len());
    out.extend_from_slice(random);
    out.extend_from_slice(&body_len.to_be_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(app_id);
    Ok(out)
}
