//! Per-request callback pipeline
//!
//! Each stage takes the request-scoped [`RequestContext`] and either moves on
//! or stops the request with a [`WechatError`]. Nothing here mutates the
//! long-lived [`Server`](super::Server) state.

use log::{debug, info, warn};

use crate::crypto::{self, DecryptedPayload};
use crate::error::WechatError;
use crate::types::{
    DouyinEncryptData, DouyinMessage, EncodingAesKey, EncryptedReply, EncryptedXmlMessage,
    MixMessage, PaymentNotification, RefundInfo,
};
use crate::utils::{random_nonce, random_prefix, unix_timestamp};
use crate::xml;

use super::builder::Credentials;
use super::classify::{classify_body, Channel};
use super::dispatch::Handlers;
use super::handler::{DecodedMessage, Verified};
use super::reply::{render_encrypted, Reply};
use super::request::CallbackRequest;

pub const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Rendered response body for the vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResponse {
    pub body: String,
    pub content_type: &'static str,
}

impl CallbackResponse {
    pub fn xml(body: String) -> Self {
        Self {
            body,
            content_type: CONTENT_TYPE_XML,
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: CONTENT_TYPE_TEXT,
        }
    }

    fn from_ack(reply: &Reply) -> Result<Self, WechatError> {
        let body = reply.render_ack()?;
        Ok(if reply.is_xml() {
            Self::xml(body)
        } else {
            Self::text(body)
        })
    }
}

/// State owned by one request as it moves through the stages
pub(crate) struct RequestContext<'a> {
    pub(crate) request: &'a CallbackRequest,
    pub(crate) credentials: &'a Credentials,
    pub(crate) handlers: &'a Handlers,
    safe_mode: bool,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        request: &'a CallbackRequest,
        credentials: &'a Credentials,
        handlers: &'a Handlers,
    ) -> Self {
        Self {
            request,
            credentials,
            handlers,
            safe_mode: request.is_safe_mode(),
        }
    }

    fn token(&self) -> &str {
        self.credentials.token.as_str()
    }

    fn aes_key(&self) -> Result<&'a EncodingAesKey, WechatError> {
        self.credentials
            .encoding_aes_key
            .as_ref()
            .ok_or_else(|| WechatError::Config("encoding_aes_key is not configured".to_string()))
    }

    /// Plain `{token, timestamp, nonce}` check against `signature`.
    fn verify_plain_signature(&self) -> Result<(), WechatError> {
        let parts = [self.token(), self.request.timestamp(), self.request.nonce()];
        if crypto::verify_sha1_signature(&parts, self.request.signature()) {
            Ok(())
        } else {
            warn!("[WechatServer] signature mismatch");
            Err(WechatError::SignatureMismatch(
                "signature does not match token, timestamp and nonce".to_string(),
            ))
        }
    }

    /// WeChat callback: classify the envelope and run the matching channel.
    pub(crate) fn serve_wechat(&self) -> Result<CallbackResponse, WechatError> {
        match classify_body(self.request.body())? {
            Channel::Payment => {
                debug!("[WechatServer] payment notification");
                self.serve_payment()
            }
            Channel::MessageOrEvent => {
                debug!("[WechatServer] message or event, safe_mode={}", self.safe_mode);
                self.serve_message()
            }
        }
    }

    /// GET handshake: echo `echostr` once the plain signature checks out.
    pub(crate) fn verify_url(&self) -> Result<CallbackResponse, WechatError> {
        self.verify_plain_signature()?;
        debug!("[WechatServer] url verification passed");
        Ok(CallbackResponse::text(self.request.echostr()))
    }

    fn serve_message(&self) -> Result<CallbackResponse, WechatError> {
        if self.credentials.debug {
            debug!("[WechatServer] debug mode, plain signature check skipped");
        } else {
            self.verify_plain_signature()?;
        }

        let decrypted;
        let raw: &[u8] = if self.safe_mode {
            decrypted = self.decrypt_safe_mode()?;
            &decrypted.body
        } else {
            self.request.body()
        };

        let message: MixMessage = xml::from_bytes(raw)?;
        let reply_timestamp = if self.safe_mode {
            Some(self.reply_timestamp()?)
        } else {
            None
        };
        debug!(
            "[WechatServer] dispatching msg_type={} open_id_present={}",
            message.msg_type(),
            !self.request.open_id().is_empty()
        );

        let reply = self
            .handlers
            .dispatch(Verified::new(DecodedMessage::Message(message.clone())))?;

        let Some(reply) = reply else {
            return Ok(CallbackResponse::text(super::reply::SUCCESS_BODY));
        };
        if !reply.is_xml() {
            return CallbackResponse::from_ack(&reply);
        }

        let rendered = reply.render(&message, unix_timestamp())?;
        match reply_timestamp {
            Some(timestamp) => self.encrypt_reply(&rendered, timestamp),
            None => Ok(CallbackResponse::xml(rendered)),
        }
    }

    /// The request timestamp, echoed verbatim in an encrypted reply.
    ///
    /// Must be an integer; checked before dispatch.
    fn reply_timestamp(&self) -> Result<&'a str, WechatError> {
        let timestamp = self.request.timestamp();
        if timestamp.parse::<i64>().is_err() {
            warn!("[WechatServer] invalid timestamp {:?}", timestamp);
            return Err(WechatError::SignatureMismatch(format!(
                "invalid timestamp {:?}",
                timestamp
            )));
        }
        Ok(timestamp)
    }

    fn decrypt_safe_mode(&self) -> Result<DecryptedPayload, WechatError> {
        let envelope: EncryptedXmlMessage = xml::from_bytes(self.request.body())?;

        let parts = [
            self.token(),
            self.request.timestamp(),
            self.request.nonce(),
            envelope.encrypt.as_str(),
        ];
        if !crypto::verify_sha1_signature(&parts, self.request.msg_signature()) {
            warn!("[WechatServer] msg_signature mismatch");
            return Err(WechatError::SignatureMismatch(
                "msg_signature does not match the encrypted body".to_string(),
            ));
        }

        let key = self.aes_key()?;
        crypto::decrypt_message(
            key,
            self.credentials.app_id.as_str(),
            &envelope.encrypt,
            self.credentials.padding,
        )
        .map_err(|e| {
            warn!("[WechatServer] safe-mode decryption failed: {}", e);
            e
        })
    }

    /// Encrypt a rendered reply and sign it with the request's timestamp and nonce.
    fn encrypt_reply(
        &self,
        rendered: &str,
        timestamp: &str,
    ) -> Result<CallbackResponse, WechatError> {
        let key = self.aes_key()?;
        let nonce = match self.request.nonce() {
            "" => random_nonce(),
            nonce => nonce.to_string(),
        };

        let encrypt = crypto::encrypt_message(
            key,
            self.credentials.app_id.as_str(),
            &random_prefix(),
            rendered.as_bytes(),
        )?;
        let msg_signature = crypto::sha1_signature(&[
            self.token(),
            timestamp,
            nonce.as_str(),
            encrypt.as_str(),
        ]);

        let body = render_encrypted(&EncryptedReply {
            encrypt,
            msg_signature,
            timestamp: timestamp.to_string(),
            nonce,
        })?;
        Ok(CallbackResponse::xml(body))
    }

    fn serve_payment(&self) -> Result<CallbackResponse, WechatError> {
        let mut notification: PaymentNotification = xml::from_bytes(self.request.body())?;

        if !notification.is_success() {
            info!(
                "[WechatServer] payment notice return_code={} return_msg={}",
                notification.return_code,
                notification.return_msg.as_deref().unwrap_or_default()
            );
            return CallbackResponse::from_ack(&Reply::pay_success());
        }

        let pay_key = self.credentials.pay_key.as_ref().ok_or_else(|| {
            WechatError::UnsupportedChannel("pay_key is not configured".to_string())
        })?;

        match notification.req_info.as_deref().filter(|s| !s.is_empty()) {
            Some(req_info) => {
                let plain = crypto::decrypt_pay_info(pay_key.as_str(), req_info).map_err(|e| {
                    warn!("[WechatServer] req_info decryption failed: {}", e);
                    e
                })?;
                let refund: RefundInfo = xml::from_bytes(&plain)?;
                notification.refund = Some(refund);
            }
            None => {
                let fields = xml::flat_fields(self.request.body())?;
                if !crypto::verify_pay_signature(&fields, pay_key.as_str())? {
                    warn!("[WechatServer] payment sign mismatch");
                    return Err(WechatError::SignatureMismatch(
                        "payment sign does not match".to_string(),
                    ));
                }
            }
        }

        notification.kind = notification.classify_kind();
        debug!("[WechatServer] dispatching payment kind={:?}", notification.kind);

        let reply = self
            .handlers
            .dispatch(Verified::new(DecodedMessage::Payment(notification)))?;
        CallbackResponse::from_ack(&ack_or(reply, Reply::pay_success(), "payment"))
    }

    /// Douyin third-party platform push (JSON envelope).
    pub(crate) fn serve_douyin(&self) -> Result<CallbackResponse, WechatError> {
        let envelope: DouyinEncryptData = serde_json::from_slice(self.request.body())?;

        let parts = [
            self.token(),
            envelope.timestamp.as_str(),
            envelope.nonce.as_str(),
            envelope.encrypt.as_str(),
        ];
        if !crypto::verify_sha1_signature(&parts, &envelope.msg_signature) {
            warn!("[WechatServer] douyin signature mismatch");
            return Err(WechatError::SignatureMismatch(
                "douyin MsgSignature does not match".to_string(),
            ));
        }

        let key = self.aes_key()?;
        let payload = crypto::decrypt_douyin(key, &envelope.encrypt, self.credentials.padding)
            .map_err(|e| {
                warn!("[WechatServer] douyin decryption failed: {}", e);
                e
            })?;
        debug!("[WechatServer] douyin push for third-party app {}", payload.app_id);

        let mut message: DouyinMessage = serde_json::from_slice(&payload.body)?;
        message.app_id = self.credentials.app_id.as_str().to_string();

        let reply = self
            .handlers
            .dispatch(Verified::new(DecodedMessage::Douyin(message)))?;
        CallbackResponse::from_ack(&ack_or(reply, Reply::Success, "douyin"))
    }
}

/// Acknowledgement for a channel that cannot carry a passive message reply.
///
/// A message reply is replaced with `default`; the request still succeeds.
fn ack_or(reply: Option<Reply>, default: Reply, channel: &str) -> Reply {
    match reply {
        Some(reply) if reply.msg_type().is_none() => reply,
        Some(reply) => {
            warn!(
                "[WechatServer] {:?} reply is not valid on the {} channel, sending the default ack",
                reply.msg_type(),
                channel
            );
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_or_keeps_acknowledgements() {
        let reply = ack_or(Some(Reply::pay_fail("busy")), Reply::pay_success(), "payment");
        assert_eq!(reply, Reply::pay_fail("busy"));
        assert_eq!(ack_or(None, Reply::Success, "douyin"), Reply::Success);
    }

    #[test]
    fn test_ack_or_replaces_message_replies() {
        let reply = ack_or(Some(Reply::text("x")), Reply::pay_success(), "payment");
        assert_eq!(reply, Reply::pay_success());
        let reply = ack_or(Some(Reply::image("m")), Reply::Success, "douyin");
        assert_eq!(reply, Reply::Success);
    }
}
