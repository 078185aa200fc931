//! Envelopes: the outer shape of a callback before decryption or dispatch

use serde::Deserialize;

use crate::error::WechatError;

/// Top-level fields that tell a WeChat Pay notification from a message push
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelProbe {
    pub return_code: Option<String>,
    pub return_msg: Option<String>,
    pub appid: Option<String>,
    pub mch_id: Option<String>,
}

impl ChannelProbe {
    /// Read the top-level fields of a WeChat callback body.
    pub fn parse(raw: &[u8]) -> Result<Self, WechatError> {
        crate::xml::from_bytes(raw)
    }

    pub fn is_pay(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.return_code) && present(&self.mch_id)
    }
}

/// Safe-mode message body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptedXmlMessage {
    #[serde(rename = "ToUserName")]
    pub to_user_name: Option<String>,
    #[serde(rename = "Encrypt")]
    pub encrypt: String,
}

/// Safe-mode reply body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedReply {
    pub encrypt: String,
    pub msg_signature: String,
    /// Echoed exactly as received, since `msg_signature` covers this text
    pub timestamp: String,
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payment() {
        let probe = ChannelProbe {
            return_code: Some("SUCCESS".to_string()),
            mch_id: Some("1234".to_string()),
            ..Default::default()
        };
        assert!(probe.is_pay());
    }

    #[test]
    fn test_probe_requires_both_fields() {
        let probe = ChannelProbe {
            return_code: Some("SUCCESS".to_string()),
            mch_id: Some(String::new()),
            ..Default::default()
        };
        assert!(!probe.is_pay());

        let probe = ChannelProbe {
            mch_id: Some("1234".to_string()),
            ..Default::default()
        };
        assert!(!probe.is_pay());
    }

    #[test]
    fn test_parse_probe_from_body() {
        let probe = ChannelProbe::parse(
            b"<xml><return_code>SUCCESS</return_code><appid>wx1</appid><mch_id>1</mch_id></xml>",
        )
        .unwrap();
        assert_eq!(probe.appid.as_deref(), Some("wx1"));
        assert!(probe.is_pay());
        assert!(ChannelProbe::parse(b"<xml><a></xml>").is_err());
    }

    #[test]
    fn test_parse_encrypted_message() {
        let xml = r#"<xml><ToUserName><![CDATA[gh_1]]></ToUserName><Encrypt><![CDATA[QUJD]]></Encrypt></xml>"#;
        let msg: EncryptedXmlMessage = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(msg.encrypt, "QUJD");
        assert_eq!(msg.to_user_name.as_deref(), Some("gh_1"));
    }
}
