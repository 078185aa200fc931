//! WeChat / Douyin callback SDK for Rust
//!
//! Server-side handling of vendor push callbacks: channel classification,
//! signature verification, decryption, dispatch to typed handlers and reply
//! rendering.
//!
//! ## Channels
//!
//! | Channel | Envelope | Authentication |
//! |---------|----------|----------------|
//! | WeChat message / event (plain) | XML | SHA-1 `signature` |
//! | WeChat message / event (safe mode) | XML `Encrypt` | SHA-1 `msg_signature` + AES-256-CBC |
//! | WeChat Pay payment notice | XML | MD5 / HMAC-SHA256 `sign` |
//! | WeChat Pay refund notice | XML `req_info` | AES-256-ECB |
//! | Douyin third-party push | JSON `Encrypt` | SHA-1 `MsgSignature` + AES-256-CBC |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wechat_callback_sdk::server::{CallbackRequest, Reply, Server, Verified};
//! use wechat_callback_sdk::types::{AppId, EncodingAesKey, MixMessage, Token};
//!
//! let server = Server::builder()
//!     .token(Token::new("your_token")?)
//!     .app_id(AppId::new("wx1234567890abcdef")?)
//!     .encoding_aes_key(EncodingAesKey::new("abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG")?)
//!     .message_handler(|msg: &Verified<MixMessage>| {
//!         msg.content.as_ref().map(|c| Reply::text(format!("you said: {}", c)))
//!     })
//!     .build()?;
//!
//! // From any HTTP framework: raw query string and body
//! let response = server.serve(&CallbackRequest::new(query, body))?;
//! println!("{} {}", response.content_type, response.body);
//! ```
//!
//! With tower, wrap the server as a service:
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use wechat_callback_sdk::middleware::LoggingLayer;
//! use wechat_callback_sdk::server::Vendor;
//!
//! let service = ServiceBuilder::new()
//!     .layer(LoggingLayer::new())
//!     .service(server.into_service(Vendor::Wechat));
//! ```
//!
//! ## Modules
//!
//! - [`crypto`] - Signatures, AES-CBC/ECB, PKCS#7 padding and plaintext framing
//! - [`error`] - Error types
//! - [`middleware`] - Tower layers for callback services
//! - [`server`] - Callback pipeline, handlers and replies
//! - [`types`] - Credential newtypes and vendor message records
//! - [`xml`] - XML decoding and reply writing
//!
//! ## Error Handling
//!
//! Every stage fails with [`WechatError`]; map it to an HTTP status with
//! [`WechatError::http_status`]:
//!
//! ```rust,ignore
//! match server.serve(&request) {
//!     Ok(response) => { /* 200 with response.body */ }
//!     Err(WechatError::SignatureMismatch(msg)) => {
//!         eprintln!("forged callback: {}", msg);
//!     }
//!     Err(e) => {
//!         eprintln!("callback rejected ({}): {}", e.http_status(), e);
//!     }
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod middleware;
pub mod server;
pub mod types;
pub mod xml;
mod utils;

pub use error::WechatError;
pub use server::{CallbackRequest, CallbackResponse, CallbackService, Reply, Server, ServerBuilder, Vendor};
