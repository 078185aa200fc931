//! Routes verified payloads to the registered handler

use std::sync::Arc;

use crate::error::WechatError;

use super::handler::{DecodedMessage, DouyinHandler, MessageHandler, PaymentHandler, Verified};
use super::reply::Reply;

/// Registered handlers, one optional slot per channel
#[derive(Clone, Default)]
pub struct Handlers {
    pub(crate) message: Option<Arc<dyn MessageHandler>>,
    pub(crate) payment: Option<Arc<dyn PaymentHandler>>,
    pub(crate) douyin: Option<Arc<dyn DouyinHandler>>,
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("message", &self.message.is_some())
            .field("payment", &self.payment.is_some())
            .field("douyin", &self.douyin.is_some())
            .finish()
    }
}

impl Handlers {
    /// Invoke the handler for the payload's channel.
    ///
    /// Fails with [`WechatError::UnsupportedChannel`] if no handler is
    /// registered for it.
    pub fn dispatch(&self, decoded: Verified<DecodedMessage>) -> Result<Option<Reply>, WechatError> {
        let channel = decoded.channel_name();
        let missing = || {
            WechatError::UnsupportedChannel(format!("no {} handler registered", channel))
        };

        match decoded.into_inner() {
            DecodedMessage::Message(msg) => {
                let handler = self.message.as_ref().ok_or_else(missing)?;
                Ok(handler.handle(&Verified::new(msg)))
            }
            DecodedMessage::Payment(notification) => {
                let handler = self.payment.as_ref().ok_or_else(missing)?;
                Ok(handler.handle(&Verified::new(notification)))
            }
            DecodedMessage::Douyin(msg) => {
                let handler = self.douyin.as_ref().ok_or_else(missing)?;
                Ok(handler.handle(&Verified::new(msg)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DouyinMessage, MixMessage, PaymentNotification};

    #[test]
    fn test_dispatch_to_message_handler() {
        let handlers = Handlers {
            message: Some(Arc::new(|_: &Verified<MixMessage>| Some(Reply::text("hi")))),
            ..Default::default()
        };
        let reply = handlers
            .dispatch(Verified::new(DecodedMessage::Message(MixMessage::default())))
            .unwrap();
        assert_eq!(reply, Some(Reply::text("hi")));
    }

    #[test]
    fn test_missing_handler_is_unsupported() {
        let handlers = Handlers {
            message: Some(Arc::new(|_: &Verified<MixMessage>| None)),
            ..Default::default()
        };
        let err = handlers
            .dispatch(Verified::new(DecodedMessage::Payment(
                PaymentNotification::default(),
            )))
            .unwrap_err();
        assert!(matches!(err, WechatError::UnsupportedChannel(_)));

        let err = handlers
            .dispatch(Verified::new(DecodedMessage::Douyin(DouyinMessage::default())))
            .unwrap_err();
        assert!(err.to_string().contains("douyin"));
    }

    #[test]
    fn test_debug_hides_handlers() {
        let handlers = Handlers::default();
        assert_eq!(
            format!("{:?}", handlers),
            "Handlers { message: false, payment: false, douyin: false }"
        );
    }
}
