//! Middleware for callback services.
//!
//! Layers compose with [`CallbackService`](crate::server::CallbackService)
//! through `ServiceBuilder`:
//!
//! ```ignore
//! use tower::ServiceBuilder;
//! use wechat_callback_sdk::middleware::LoggingLayer;
//! use wechat_callback_sdk::server::Vendor;
//!
//! let service = ServiceBuilder::new()
//!     .layer(LoggingLayer::new())
//!     .service(server.into_service(Vendor::Wechat));
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::{LoggingLayer, LoggingService};
