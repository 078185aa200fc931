//! Replies returned by handlers and their wire rendering

use crate::error::WechatError;
use crate::types::{EncryptedReply, MixMessage, MsgType};
use crate::xml::XmlBuilder;

/// Plain-text acknowledgement accepted by both vendors
pub const SUCCESS_BODY: &str = "success";

/// One news article in a passive reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub pic_url: String,
    pub url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        pic_url: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            pic_url: pic_url.into(),
            url: url.into(),
        }
    }
}

/// What a handler sends back to the vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        content: String,
    },
    Image {
        media_id: String,
    },
    Voice {
        media_id: String,
    },
    Video {
        media_id: String,
        title: String,
        description: String,
    },
    Music {
        title: String,
        description: String,
        music_url: String,
        hq_music_url: String,
        thumb_media_id: String,
    },
    News {
        articles: Vec<Article>,
    },
    TransferCustomerService,
    /// WeChat Pay notification acknowledgement
    PayAck {
        return_code: String,
        return_msg: String,
    },
    /// Plain `success`
    Success,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text {
            content: content.into(),
        }
    }

    pub fn image(media_id: impl Into<String>) -> Self {
        Reply::Image {
            media_id: media_id.into(),
        }
    }

    pub fn pay_success() -> Self {
        Reply::PayAck {
            return_code: "SUCCESS".to_string(),
            return_msg: "OK".to_string(),
        }
    }

    pub fn pay_fail(msg: impl Into<String>) -> Self {
        Reply::PayAck {
            return_code: "FAIL".to_string(),
            return_msg: msg.into(),
        }
    }

    /// `MsgType` for passive message replies; `None` for acknowledgements.
    pub fn msg_type(&self) -> Option<MsgType> {
        match self {
            Reply::Text { .. } => Some(MsgType::Text),
            Reply::Image { .. } => Some(MsgType::Image),
            Reply::Voice { .. } => Some(MsgType::Voice),
            Reply::Video { .. } => Some(MsgType::Video),
            Reply::Music { .. } => Some(MsgType::Music),
            Reply::News { .. } => Some(MsgType::News),
            Reply::TransferCustomerService => Some(MsgType::TransferCustomerService),
            Reply::PayAck { .. } | Reply::Success => None,
        }
    }

    /// Whether the rendered reply is an XML document.
    pub fn is_xml(&self) -> bool {
        !matches!(self, Reply::Success)
    }

    /// Render as a passive reply to `incoming`; sender and recipient are swapped.
    pub fn render(&self, incoming: &MixMessage, create_time: i64) -> Result<String, WechatError> {
        let Some(msg_type) = self.msg_type() else {
            return self.render_ack();
        };

        let mut xml = XmlBuilder::new()?;
        xml.cdata("ToUserName", &incoming.from_user_name)?
            .cdata("FromUserName", &incoming.to_user_name)?
            .text("CreateTime", &create_time.to_string())?
            .cdata("MsgType", msg_type.as_str())?;

        match self {
            Reply::Text { content } => {
                xml.cdata("Content", content)?;
            }
            Reply::Image { media_id } => {
                xml.open("Image")?.cdata("MediaId", media_id)?.close("Image")?;
            }
            Reply::Voice { media_id } => {
                xml.open("Voice")?.cdata("MediaId", media_id)?.close("Voice")?;
            }
            Reply::Video {
                media_id,
                title,
                description,
            } => {
                xml.open("Video")?
                    .cdata("MediaId", media_id)?
                    .cdata("Title", title)?
                    .cdata("Description", description)?
                    .close("Video")?;
            }
            Reply::Music {
                title,
                description,
                music_url,
                hq_music_url,
                thumb_media_id,
            } => {
                xml.open("Music")?
                    .cdata("Title", title)?
                    .cdata("Description", description)?
                    .cdata("MusicUrl", music_url)?
                    .cdata("HQMusicUrl", hq_music_url)?
                    .cdata("ThumbMediaId", thumb_media_id)?
                    .close("Music")?;
            }
            Reply::News { articles } => {
                xml.text("ArticleCount", &articles.len().to_string())?
                    .open("Articles")?;
                for article in articles {
                    xml.open("item")?
                        .cdata("Title", &article.title)?
                        .cdata("Description", &article.description)?
                        .cdata("PicUrl", &article.pic_url)?
                        .cdata("Url", &article.url)?
                        .close("item")?;
                }
                xml.close("Articles")?;
            }
            Reply::TransferCustomerService | Reply::PayAck { .. } | Reply::Success => {}
        }

        xml.finish()
    }

    /// Render replies that do not depend on an incoming message.
    pub fn render_ack(&self) -> Result<String, WechatError> {
        match self {
            Reply::PayAck {
                return_code,
                return_msg,
            } => {
                let mut xml = XmlBuilder::new()?;
                xml.cdata("return_code", return_code)?
                    .cdata("return_msg", return_msg)?;
                xml.finish()
            }
            Reply::Success => Ok(SUCCESS_BODY.to_string()),
            other => Err(WechatError::UnsupportedChannel(format!(
                "{:?} reply needs an incoming message",
                other.msg_type()
            ))),
        }
    }
}

/// `<xml><Encrypt/><MsgSignature/><TimeStamp/><Nonce/></xml>`
pub fn render_encrypted(reply: &EncryptedReply) -> Result<String, WechatError> {
    let mut xml = XmlBuilder::new()?;
    xml.cdata("Encrypt", &reply.encrypt)?
        .cdata("MsgSignature", &reply.msg_signature)?
        .text("TimeStamp", &reply.timestamp)?
        .cdata("Nonce", &reply.nonce)?;
    xml.finish()
}
