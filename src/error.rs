use http::StatusCode;
use thiserror::Error;

/// Callback pipeline error types
///
/// Every variant is terminal for the request that produced it; nothing in the
/// pipeline retries.
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signature verification failed: {0}")]
    SignatureMismatch(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),

    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WechatError {
    /// Whether the request body could not be parsed (XML or JSON).
    pub fn is_parse_error(&self) -> bool {
        matches!(self, WechatError::Xml(_) | WechatError::Json(_))
    }

    /// HTTP status an embedding server should answer with.
    pub fn http_status(&self) -> StatusCode {
        match self {
            WechatError::Xml(_) | WechatError::Json(_) | WechatError::Decrypt(_) => {
                StatusCode::BAD_REQUEST
            }
            WechatError::SignatureMismatch(_) => StatusCode::FORBIDDEN,
            WechatError::UnsupportedChannel(_) => StatusCode::NOT_IMPLEMENTED,
            WechatError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<quick_xml::DeError> for WechatError {
    fn from(e: quick_xml::DeError) -> Self {
        WechatError::Xml(e.to_string())
    }
}

impl From<quick_xml::Error> for WechatError {
    fn from(e: quick_xml::Error) -> Self {
        WechatError::Xml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_bad_request() {
        let err = WechatError::Xml("unexpected EOF".to_string());
        assert!(err.is_parse_error());
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = WechatError::from(json_err);
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_signature_mismatch_is_forbidden() {
        let err = WechatError::SignatureMismatch("msg_signature".to_string());
        assert!(!err.is_parse_error());
        assert_eq!(err.http_status(), StatusCode::FORBIDDEN);
        assert!(err.to_string().contains("Signature verification failed"));
    }

    #[test]
    fn test_unsupported_channel_status() {
        let err = WechatError::UnsupportedChannel("payment".to_string());
        assert_eq!(err.http_status(), StatusCode::NOT_IMPLEMENTED);
    }
}
