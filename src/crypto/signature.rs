//! Callback signature schemes
//!
//! WeChat and Douyin sign callbacks with SHA-1 over the lexicographically
//! sorted concatenation of a handful of strings. The set of strings differs
//! per variant (URL check, safe-mode message, Douyin), so the core helpers take
//! an arbitrary list. WeChat Pay v2 signs the notification fields with MD5 or
//! HMAC-SHA256 keyed by the merchant key.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::error::WechatError;

type HmacSha256 = Hmac<Sha256>;

/// Sort `parts`, concatenate them and return the lowercase hex SHA-1 digest.
pub fn sha1_signature<S: AsRef<str>>(parts: &[S]) -> String {
    let mut sorted: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut hasher = Sha1::new();
    for part in sorted {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Recompute the SHA-1 signature over `parts` and compare it with `signature`.
pub fn verify_sha1_signature<S: AsRef<str>>(parts: &[S], signature: &str) -> bool {
    let expected = sha1_signature(parts);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

/// Byte comparison whose running time depends only on the lengths.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// WeChat Pay v2 `sign_type`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaySignType {
    #[default]
    Md5,
    HmacSha256,
}

impl PaySignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaySignType::Md5 => "MD5",
            PaySignType::HmacSha256 => "HMAC-SHA256",
        }
    }
}

impl std::str::FromStr for PaySignType {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "MD5" => Ok(PaySignType::Md5),
            "HMAC-SHA256" => Ok(PaySignType::HmacSha256),
            other => Err(WechatError::SignatureMismatch(format!(
                "unsupported sign_type {}",
                other
            ))),
        }
    }
}

/// Compute the WeChat Pay v2 signature over the notification fields.
///
/// Empty values and the `sign` field itself are excluded. The result is
/// uppercase hex.
pub fn pay_signature(
    fields: &BTreeMap<String, String>,
    pay_key: &str,
    sign_type: PaySignType,
) -> Result<String, WechatError> {
    let mut payload = fields
        .iter()
        .filter(|(k, v)| k.as_str() != "sign" && !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    payload.push_str("&key=");
    payload.push_str(pay_key);

    let digest = match sign_type {
        PaySignType::Md5 => format!("{:x}", md5::compute(payload.as_bytes())),
        PaySignType::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(pay_key.as_bytes())
                .map_err(|e| WechatError::Config(format!("invalid pay key: {}", e)))?;
            mac.update(payload.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
    };
    Ok(digest.to_ascii_uppercase())
}

/// Verify the `sign` field of a WeChat Pay v2 notification.
///
/// The algorithm is taken from the `sign_type` field, defaulting to MD5.
pub fn verify_pay_signature(
    fields: &BTreeMap<String, String>,
    pay_key: &str,
) -> Result<bool, WechatError> {
    let Some(sign) = fields.get("sign").filter(|s| !s.is_empty()) else {
        return Ok(false);
    };
    let sign_type: PaySignType = fields
        .get("sign_type")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;
    let expected = pay_signature(fields, pay_key, sign_type)?;
    Ok(constant_time_eq(
        expected.as_bytes(),
        sign.to_ascii_uppercase().as_bytes(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAY_KEY: &str = "192006250b4c09247ec02edce69f6a2d";

    fn pay_fields() -> BTreeMap<String, String> {
        [
            ("appid", "wx2421b1c4370ec43b"),
            ("mch_id", "10000100"),
            ("nonce_str", "5K8264ILTKCH16CQ2502SI8ZNMTM67VS"),
            ("out_trade_no", "1409811653"),
            ("result_code", "SUCCESS"),
            ("return_code", "SUCCESS"),
            ("total_fee", "1"),
            ("transaction_id", "1004400740201409030005092168"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_sha1_signature_known_answer() {
        let sig = sha1_signature(&["t1", "1700000000", "abc", "QUJD"]);
        assert_eq!(sig, "65c0ecc27086d310d14757fb3e9b82db1c7f5e20");
    }

    #[test]
    fn test_sha1_signature_is_order_independent() {
        let a = sha1_signature(&["t1", "1700000000", "abc"]);
        let b = sha1_signature(&["abc", "t1", "1700000000"]);
        assert_eq!(a, b);
        assert_eq!(a, "2cf0fcec52742857d8c8774227a0691d856882b1");
    }

    #[test]
    fn test_sha1_signature_accepts_owned_strings() {
        let parts = vec!["t1".to_string(), "1700000000".to_string(), "abc".to_string()];
        assert_eq!(
            sha1_signature(&parts),
            sha1_signature(&["t1", "1700000000", "abc"])
        );
    }

    #[test]
    fn test_verify_rejects_mutation() {
        let parts = ["t1", "1700000000", "abc", "QUJD"];
        let sig = sha1_signature(&parts);
        assert!(verify_sha1_signature(&parts, &sig));

        let mut mutated = sig.into_bytes();
        mutated[0] = if mutated[0] == b'0' { b'1' } else { b'0' };
        let mutated = String::from_utf8(mutated).unwrap();
        assert!(!verify_sha1_signature(&parts, &mutated));
        assert!(!verify_sha1_signature(&parts, ""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_pay_signature_md5_known_answer() {
        let sig = pay_signature(&pay_fields(), PAY_KEY, PaySignType::Md5).unwrap();
        assert_eq!(sig, "CC90C153755A1EE6CC91E3CB371A675A");
    }

    #[test]
    fn test_pay_signature_skips_sign_and_empty_fields() {
        let mut fields = pay_fields();
        fields.insert("sign".to_string(), "WHATEVER".to_string());
        fields.insert("attach".to_string(), String::new());
        let sig = pay_signature(&fields, PAY_KEY, PaySignType::Md5).unwrap();
        assert_eq!(sig, "CC90C153755A1EE6CC91E3CB371A675A");
    }

    #[test]
    fn test_pay_signature_hmac_known_answer() {
        let mut fields = pay_fields();
        fields.insert("sign_type".to_string(), "HMAC-SHA256".to_string());
        let sig = pay_signature(&fields, PAY_KEY, PaySignType::HmacSha256).unwrap();
        assert_eq!(
            sig,
            "F528C86A5CC7DC4DA650397C69ECF0C35D255B0BB3CDD31FADD178FAF8938A6F"
        );

        fields.insert("sign".to_string(), sig);
        assert!(verify_pay_signature(&fields, PAY_KEY).unwrap());
    }

    #[test]
    fn test_verify_pay_signature() {
        let mut fields = pay_fields();
        fields.insert(
            "sign".to_string(),
            "cc90c153755a1ee6cc91e3cb371a675a".to_string(),
        );
        assert!(verify_pay_signature(&fields, PAY_KEY).unwrap());
        assert!(!verify_pay_signature(&fields, "wrong-key").unwrap());

        fields.remove("sign");
        assert!(!verify_pay_signature(&fields, PAY_KEY).unwrap());
    }

    #[test]
    fn test_unknown_sign_type() {
        let mut fields = pay_fields();
        fields.insert("sign".to_string(), "X".to_string());
        fields.insert("sign_type".to_string(), "RSA".to_string());
        assert!(matches!(
            verify_pay_signature(&fields, PAY_KEY),
            Err(WechatError::SignatureMismatch(_))
        ));
    }
}
