//! Handler traits and the verified-message wrapper

use std::ops::Deref;

use crate::types::{DouyinMessage, MixMessage, PaymentNotification};

use super::reply::Reply;

/// A decoded callback payload, one variant per channel
#[derive(Debug, Clone)]
pub enum DecodedMessage {
    Message(MixMessage),
    Payment(PaymentNotification),
    Douyin(DouyinMessage),
}

impl DecodedMessage {
    pub fn channel_name(&self) -> &'static str {
        match self {
            DecodedMessage::Message(_) => "message",
            DecodedMessage::Payment(_) => "payment",
            DecodedMessage::Douyin(_) => "douyin",
        }
    }
}

/// Payload whose signature (or authenticated decryption) has been checked.
///
/// Only the callback pipeline can construct one, so a handler never sees
/// unverified data.
#[derive(Debug, Clone)]
pub struct Verified<T>(T);

impl<T> Verified<T> {
    pub(crate) fn new(value: T) -> Self {
        Verified(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Handles official-account and mini-program messages and events.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: &Verified<MixMessage>) -> Option<Reply>;
}

/// Handles WeChat Pay payment and refund notifications.
pub trait PaymentHandler: Send + Sync {
    fn handle(&self, notification: &Verified<PaymentNotification>) -> Option<Reply>;
}

/// Handles Douyin third-party platform pushes.
pub trait DouyinHandler: Send + Sync {
    fn handle(&self, message: &Verified<DouyinMessage>) -> Option<Reply>;
}

impl<F> MessageHandler for F
where
    F: Fn(&Verified<MixMessage>) -> Option<Reply> + Send + Sync,
{
    fn handle(&self, message: &Verified<MixMessage>) -> Option<Reply> {
        self(message)
    }
}

impl<F> PaymentHandler for F
where
    F: Fn(&Verified<PaymentNotification>) -> Option<Reply> + Send + Sync,
{
    fn handle(&self, notification: &Verified<PaymentNotification>) -> Option<Reply> {
        self(notification)
    }
}

impl<F> DouyinHandler for F
where
    F: Fn(&Verified<DouyinMessage>) -> Option<Reply> + Send + Sync,
{
    fn handle(&self, message: &Verified<DouyinMessage>) -> Option<Reply> {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_derefs_to_inner() {
        let verified = Verified::new(MixMessage {
            from_user_name: "oUser".to_string(),
            ..Default::default()
        });
        assert_eq!(verified.from_user_name, "oUser");
        assert_eq!(verified.into_inner().from_user_name, "oUser");
    }

    #[test]
    fn test_closure_is_a_handler() {
        let handler = |msg: &Verified<MixMessage>| Some(Reply::text(msg.from_user_name.clone()));
        let msg = Verified::new(MixMessage {
            from_user_name: "oUser".to_string(),
            ..Default::default()
        });
        assert_eq!(MessageHandler::handle(&handler, &msg), Some(Reply::text("oUser")));
    }

    #[test]
    fn test_channel_name() {
        let decoded = DecodedMessage::Douyin(DouyinMessage::default());
        assert_eq!(decoded.channel_name(), "douyin");
    }
}
