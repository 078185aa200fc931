//! Douyin (ByteDance) third-party platform push records

use serde::{Deserialize, Serialize};

use super::message::{EventType, MsgType};

/// Encrypted push envelope as posted by Douyin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DouyinEncryptData {
    #[serde(rename = "Nonce", default)]
    pub nonce: String,
    #[serde(rename = "TimeStamp", default)]
    pub timestamp: String,
    #[serde(rename = "Encrypt", default)]
    pub encrypt: String,
    #[serde(rename = "MsgSignature", default)]
    pub msg_signature: String,
}

/// Decrypted Douyin push
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DouyinMessage {
    #[serde(rename = "Event", default)]
    pub event: String,
    #[serde(rename = "MsgType", default)]
    pub msg_type: String,
    #[serde(rename = "CreateTime", default)]
    pub create_time: String,
    #[serde(rename = "FromUserName", default)]
    pub from_user_name: String,
    #[serde(rename = "Ticket", default)]
    pub ticket: String,
    /// Receiving app id; Douyin leaves it out of the payload, so it is filled
    /// in from configuration.
    #[serde(rename = "AppID", default)]
    pub app_id: String,
}

impl DouyinMessage {
    pub fn msg_type(&self) -> MsgType {
        MsgType::from(self.msg_type.as_str())
    }

    pub fn event(&self) -> EventType {
        EventType::from(self.event.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encrypt_data() {
        let json = r#"{"Nonce":"n1","TimeStamp":"1700000000","Encrypt":"QUJD","MsgSignature":"sig"}"#;
        let data: DouyinEncryptData = serde_json::from_str(json).unwrap();
        assert_eq!(data.nonce, "n1");
        assert_eq!(data.timestamp, "1700000000");
        assert_eq!(data.encrypt, "QUJD");
        assert_eq!(data.msg_signature, "sig");
    }

    #[test]
    fn test_parse_ticket_push() {
        let json = r#"{"Ticket":"ticket_abc","CreateTime":"1700000000","MsgType":"PUSH","Event":"Ticket","FromUserName":"douyin"}"#;
        let msg: DouyinMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.msg_type(), MsgType::Push);
        assert_eq!(msg.event(), EventType::Ticket);
        assert_eq!(msg.ticket, "ticket_abc");
        assert!(msg.app_id.is_empty());
    }
}
