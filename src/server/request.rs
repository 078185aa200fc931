//! Inbound callback request, independent of any HTTP framework

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Query string and body of one callback request
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    query: HashMap<String, String>,
    body: Vec<u8>,
}

impl CallbackRequest {
    /// Build from a raw query string (without the leading `?`) and the body.
    pub fn new(query: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            query: parse_query(query),
            body: body.into(),
        }
    }

    /// Build from already-decoded query parameters.
    pub fn from_parts(query: HashMap<String, String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            query,
            body: body.into(),
        }
    }

    pub fn from_http<B: AsRef<[u8]>>(request: &http::Request<B>) -> Self {
        Self::new(
            request.uri().query().unwrap_or_default(),
            request.body().as_ref(),
        )
    }

    /// Query parameter value, or `""` when absent.
    pub fn query(&self, name: &str) -> &str {
        self.query.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn signature(&self) -> &str {
        self.query("signature")
    }

    pub fn msg_signature(&self) -> &str {
        self.query("msg_signature")
    }

    pub fn timestamp(&self) -> &str {
        self.query("timestamp")
    }

    pub fn nonce(&self) -> &str {
        self.query("nonce")
    }

    pub fn open_id(&self) -> &str {
        self.query("openid")
    }

    pub fn echostr(&self) -> &str {
        self.query("echostr")
    }

    /// `encrypt_type=aes` marks a safe-mode message.
    pub fn is_safe_mode(&self) -> bool {
        self.query("encrypt_type") == "aes"
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let req = CallbackRequest::new(
            "signature=abc&timestamp=1700000000&nonce=n1&openid=oUser&encrypt_type=aes&msg_signature=def",
            "",
        );
        assert_eq!(req.signature(), "abc");
        assert_eq!(req.timestamp(), "1700000000");
        assert_eq!(req.nonce(), "n1");
        assert_eq!(req.open_id(), "oUser");
        assert_eq!(req.msg_signature(), "def");
        assert!(req.is_safe_mode());
    }

    #[test]
    fn test_missing_params_are_empty() {
        let req = CallbackRequest::new("", "body");
        assert_eq!(req.signature(), "");
        assert!(!req.is_safe_mode());
        assert_eq!(req.body(), b"body");
    }

    #[test]
    fn test_percent_decoding() {
        let req = CallbackRequest::new("echostr=a%2Bb%3D&flag", "");
        assert_eq!(req.echostr(), "a+b=");
        assert_eq!(req.query("flag"), "");
    }

    #[test]
    fn test_from_http() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/wechat/callback?signature=s&timestamp=1&nonce=n")
            .body(b"<xml></xml>".to_vec())
            .unwrap();
        let req = CallbackRequest::from_http(&request);
        assert_eq!(req.signature(), "s");
        assert_eq!(req.body(), b"<xml></xml>");
    }
}
