use std::sync::Arc;

use crate::crypto::PaddingMode;
use crate::error::WechatError;
use crate::types::{AppId, EncodingAesKey, PayKey, Token};

use super::dispatch::Handlers;
use super::handler::{DouyinHandler, MessageHandler, PaymentHandler};
use super::Server;

/// Immutable callback credentials, shared by every request
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) token: Token,
    pub(crate) app_id: AppId,
    pub(crate) encoding_aes_key: Option<EncodingAesKey>,
    pub(crate) pay_key: Option<PayKey>,
    pub(crate) padding: PaddingMode,
    pub(crate) debug: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("padding", &self.padding)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Server`]
///
/// # Example
///
/// ```rust,ignore
/// let server = Server::builder()
///     .token(Token::new("token")?)
///     .app_id(AppId::new("wx1234567890abcdef")?)
///     .message_handler(|msg: &Verified<MixMessage>| Some(Reply::text("hi")))
///     .build()?;
/// ```
#[must_use]
#[derive(Default)]
pub struct ServerBuilder {
    token: Option<Token>,
    app_id: Option<AppId>,
    encoding_aes_key: Option<EncodingAesKey>,
    pay_key: Option<PayKey>,
    padding: PaddingMode,
    debug: bool,
    handlers: Handlers,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("app_id", &self.app_id)
            .field("padding", &self.padding)
            .field("debug", &self.debug)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl ServerBuilder {
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn app_id(mut self, app_id: AppId) -> Self {
        self.app_id = Some(app_id);
        self
    }

    /// Required for safe-mode messages and Douyin pushes.
    pub fn encoding_aes_key(mut self, key: EncodingAesKey) -> Self {
        self.encoding_aes_key = Some(key);
        self
    }

    /// Required for WeChat Pay notifications.
    pub fn pay_key(mut self, key: PayKey) -> Self {
        self.pay_key = Some(key);
        self
    }

    /// PKCS#7 removal for Douyin pushes; lenient by default.
    pub fn padding_mode(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Skip the plain `signature` check on messages. Never enable in production.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn message_handler<H>(mut self, handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        self.handlers.message = Some(Arc::new(handler));
        self
    }

    pub fn payment_handler<H>(mut self, handler: H) -> Self
    where
        H: PaymentHandler + 'static,
    {
        self.handlers.payment = Some(Arc::new(handler));
        self
    }

    pub fn douyin_handler<H>(mut self, handler: H) -> Self
    where
        H: DouyinHandler + 'static,
    {
        self.handlers.douyin = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, WechatError> {
        let token = self
            .token
            .ok_or_else(|| WechatError::Config("token is required".to_string()))?;
        let app_id = self
            .app_id
            .ok_or_else(|| WechatError::Config("app_id is required".to_string()))?;

        let credentials = Credentials {
            token,
            app_id,
            encoding_aes_key: self.encoding_aes_key,
            pay_key: self.pay_key,
            padding: self.padding,
            debug: self.debug,
        };

        Ok(Server::new(credentials, self.handlers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token::new("t1").unwrap()
    }

    fn app_id() -> AppId {
        AppId::new("wx1234567890abcdef").unwrap()
    }

    #[test]
    fn test_build_requires_token() {
        let err = ServerBuilder::default().app_id(app_id()).build().unwrap_err();
        assert!(matches!(err, WechatError::Config(ref m) if m.contains("token")));
    }

    #[test]
    fn test_build_requires_app_id() {
        let err = ServerBuilder::default().token(token()).build().unwrap_err();
        assert!(matches!(err, WechatError::Config(ref m) if m.contains("app_id")));
    }

    #[test]
    fn test_build_minimal() {
        let server = ServerBuilder::default()
            .token(token())
            .app_id(app_id())
            .build()
            .unwrap();
        assert_eq!(server.app_id().as_str(), "wx1234567890abcdef");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let builder = ServerBuilder::default()
            .token(Token::new("super-secret-token").unwrap())
            .app_id(app_id())
            .pay_key(PayKey::new("pay-secret").unwrap());
        let debug = format!("{:?}", builder);
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("pay-secret"));
        assert!(debug.contains("ServerBuilder"));
    }
}
