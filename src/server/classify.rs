//! Payment vs. message channel classification

use crate::error::WechatError;
use crate::types::ChannelProbe;

/// Which downstream parser a WeChat callback body goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Payment,
    MessageOrEvent,
}

/// Payment when both `return_code` and `mch_id` are non-empty.
pub fn classify(probe: &ChannelProbe) -> Channel {
    if probe.is_pay() {
        Channel::Payment
    } else {
        Channel::MessageOrEvent
    }
}

/// Parse the envelope's top-level fields and classify it.
pub fn classify_body(raw: &[u8]) -> Result<Channel, WechatError> {
    Ok(classify(&ChannelProbe::parse(raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_envelope() {
        let raw = br#"<xml><return_code><![CDATA[SUCCESS]]></return_code><mch_id>1234</mch_id></xml>"#;
        assert_eq!(classify_body(raw).unwrap(), Channel::Payment);
    }

    #[test]
    fn test_text_message_envelope() {
        let raw = br#"<xml><MsgType><![CDATA[text]]></MsgType></xml>"#;
        assert_eq!(classify_body(raw).unwrap(), Channel::MessageOrEvent);
    }

    #[test]
    fn test_encrypted_envelope_is_message() {
        let raw = br#"<xml><ToUserName>gh_1</ToUserName><Encrypt>QUJD</Encrypt></xml>"#;
        assert_eq!(classify_body(raw).unwrap(), Channel::MessageOrEvent);
    }

    #[test]
    fn test_empty_mch_id_is_message() {
        let raw = br#"<xml><return_code>FAIL</return_code><mch_id></mch_id></xml>"#;
        assert_eq!(classify_body(raw).unwrap(), Channel::MessageOrEvent);
    }

    #[test]
    fn test_malformed_body() {
        let err = classify_body(b"<xml><return_code>SUCCESS</xml>").unwrap_err();
        assert!(err.is_parse_error());
    }
}
