//! Callback server
//!
//! [`Server`] takes a [`CallbackRequest`] through classification, signature
//! verification, decryption and dispatch, and returns the body the vendor
//! expects. It is framework-agnostic; [`CallbackService`] wraps it as a tower
//! `Service` over `http` types.
//!
//! ```rust,ignore
//! use wechat_callback_sdk::server::{CallbackRequest, Reply, Server, Verified};
//! use wechat_callback_sdk::types::{AppId, MixMessage, Token};
//!
//! let server = Server::builder()
//!     .token(Token::new("token")?)
//!     .app_id(AppId::new("wx1234567890abcdef")?)
//!     .message_handler(|msg: &Verified<MixMessage>| {
//!         Some(Reply::text(format!("echo: {}", msg.content.as_deref().unwrap_or_default())))
//!     })
//!     .build()?;
//!
//! let response = server.serve(&CallbackRequest::new(query, body))?;
//! ```

mod builder;
mod classify;
mod dispatch;
mod handler;
mod pipeline;
mod reply;
mod request;
mod service;

use std::sync::Arc;

use crate::error::WechatError;
use crate::types::AppId;

use builder::Credentials;
use pipeline::RequestContext;

pub use builder::ServerBuilder;
pub use classify::{classify, classify_body, Channel};
pub use dispatch::Handlers;
pub use handler::{DecodedMessage, DouyinHandler, MessageHandler, PaymentHandler, Verified};
pub use pipeline::{CallbackResponse, CONTENT_TYPE_TEXT, CONTENT_TYPE_XML};
pub use reply::{render_encrypted, Article, Reply, SUCCESS_BODY};
pub use request::CallbackRequest;
pub use service::{CallbackService, Vendor};

#[derive(Debug)]
struct ServerInner {
    credentials: Credentials,
    handlers: Handlers,
}

/// Callback server; cheap to clone and safe to share across threads
#[derive(Debug, Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub(crate) fn new(credentials: Credentials, handlers: Handlers) -> Self {
        Self {
            inner: Arc::new(ServerInner {
                credentials,
                handlers,
            }),
        }
    }

    pub fn app_id(&self) -> &AppId {
        &self.inner.credentials.app_id
    }

    fn context<'a>(&'a self, request: &'a CallbackRequest) -> RequestContext<'a> {
        RequestContext::new(request, &self.inner.credentials, &self.inner.handlers)
    }

    /// Handle a WeChat POST callback (official account, mini program or WeChat Pay).
    pub fn serve(&self, request: &CallbackRequest) -> Result<CallbackResponse, WechatError> {
        self.context(request).serve_wechat()
    }

    /// Handle a Douyin third-party platform push.
    pub fn serve_douyin(&self, request: &CallbackRequest) -> Result<CallbackResponse, WechatError> {
        self.context(request).serve_douyin()
    }

    /// Answer the GET configuration handshake with `echostr`.
    pub fn verify_url(&self, request: &CallbackRequest) -> Result<CallbackResponse, WechatError> {
        self.context(request).verify_url()
    }

    /// Wrap this server as a tower `Service` for the given vendor.
    pub fn into_service(self, vendor: Vendor) -> CallbackService {
        CallbackService::new(self, vendor)
    }
}
