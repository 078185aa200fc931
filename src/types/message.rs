//! Inbound WeChat messages and events
//!
//! [`MixMessage`] carries every field WeChat may push to a callback URL, for
//! plain messages, events, third-party platform notifications, card events,
//! content-security results and device messages. Which fields are populated
//! depends on `MsgType`, `Event` and `InfoType`; handlers inspect those through
//! [`MixMessage::msg_type`], [`MixMessage::event`] and [`MixMessage::info_type`].

use serde::Deserialize;

use crate::xml::{empty_as_default, empty_as_none};

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this crate does not know about
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $value,)+
                    $name::Other(s) => s,
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($value => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Basic message type (`MsgType`)
    MsgType {
        Text => "text",
        Image => "image",
        Voice => "voice",
        Video => "video",
        ShortVideo => "shortvideo",
        Location => "location",
        Link => "link",
        /// Reply only
        Music => "music",
        /// Reply only
        News => "news",
        TransferCustomerService => "transfer_customer_service",
        Event => "event",
        MiniProgramPage => "miniprogrampage",
        /// Douyin push
        Push => "PUSH",
    }
}

string_enum! {
    /// Event type (`Event`)
    EventType {
        Subscribe => "subscribe",
        Unsubscribe => "unsubscribe",
        Scan => "SCAN",
        Location => "LOCATION",
        Click => "CLICK",
        View => "VIEW",
        ScancodePush => "scancode_push",
        ScancodeWaitmsg => "scancode_waitmsg",
        PicSysphoto => "pic_sysphoto",
        PicPhotoOrAlbum => "pic_photo_or_album",
        PicWeixin => "pic_weixin",
        LocationSelect => "location_select",
        TemplateSendJobFinish => "TEMPLATESENDJOBFINISH",
        WxaMediaCheck => "wxa_media_check",
        WeappAuditSuccess => "weapp_audit_success",
        WeappAuditFail => "weapp_audit_fail",
        WeappAuditDelay => "weapp_audit_delay",
        WxaPrivacyApply => "wxa_privacy_apply",
        UserEnterTempsession => "user_enter_tempsession",
        /// Douyin ticket push
        Ticket => "Ticket",
    }
}

string_enum! {
    /// Third-party platform notification type (`InfoType`)
    InfoType {
        VerifyTicket => "component_verify_ticket",
        Authorized => "authorized",
        Unauthorized => "unauthorized",
        UpdateAuthorized => "updateauthorized",
        NotifyThirdFasteregister => "notify_third_fasteregister",
    }
}

/// Everything WeChat may push to a message callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MixMessage {
    #[serde(rename = "ToUserName", default)]
    pub to_user_name: String,
    #[serde(rename = "FromUserName", default)]
    pub from_user_name: String,
    #[serde(rename = "CreateTime", default, deserialize_with = "empty_as_default")]
    pub create_time: i64,
    #[serde(rename = "MsgType", default)]
    pub msg_type: String,

    // basic messages
    #[serde(rename = "MsgId", default, deserialize_with = "empty_as_none")]
    pub msg_id: Option<i64>,
    #[serde(rename = "MsgDataId")]
    pub msg_data_id: Option<String>,
    #[serde(rename = "Idx")]
    pub idx: Option<String>,
    #[serde(rename = "Content")]
    pub content: Option<String>,
    #[serde(rename = "Recognition")]
    pub recognition: Option<String>,
    #[serde(rename = "PicUrl")]
    pub pic_url: Option<String>,
    #[serde(rename = "MediaId")]
    pub media_id: Option<String>,
    #[serde(rename = "Format")]
    pub format: Option<String>,
    #[serde(rename = "ThumbMediaId")]
    pub thumb_media_id: Option<String>,
    #[serde(rename = "Location_X", default, deserialize_with = "empty_as_none")]
    pub location_x: Option<f64>,
    #[serde(rename = "Location_Y", default, deserialize_with = "empty_as_none")]
    pub location_y: Option<f64>,
    #[serde(rename = "Scale", default, deserialize_with = "empty_as_none")]
    pub scale: Option<f64>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Url")]
    pub url: Option<String>,
    #[serde(rename = "PagePath")]
    pub page_path: Option<String>,

    // events
    #[serde(rename = "Event")]
    pub event: Option<String>,
    #[serde(rename = "EventKey")]
    pub event_key: Option<String>,
    #[serde(rename = "Ticket")]
    pub ticket: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "Precision")]
    pub precision: Option<String>,
    #[serde(rename = "MenuId")]
    pub menu_id: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "SessionFrom")]
    pub session_from: Option<String>,
    #[serde(rename = "ScanCodeInfo")]
    pub scan_code_info: Option<ScanCodeInfo>,
    #[serde(rename = "SendPicsInfo")]
    pub send_pics_info: Option<SendPicsInfo>,
    #[serde(rename = "SendLocationInfo")]
    pub send_location_info: Option<SendLocationInfo>,

    // third-party platform
    #[serde(rename = "InfoType")]
    pub info_type: Option<String>,
    #[serde(rename = "AppId")]
    pub app_id: Option<String>,
    #[serde(rename = "ComponentVerifyTicket")]
    pub component_verify_ticket: Option<String>,
    #[serde(rename = "AuthorizerAppid")]
    pub authorizer_appid: Option<String>,
    #[serde(rename = "AuthorizationCode")]
    pub authorization_code: Option<String>,
    #[serde(rename = "AuthorizationCodeExpiredTime", default, deserialize_with = "empty_as_none")]
    pub authorization_code_expired_time: Option<i64>,
    #[serde(rename = "PreAuthCode")]
    pub pre_auth_code: Option<String>,
    #[serde(rename = "Reason")]
    pub reason: Option<String>,
    #[serde(rename = "ScreenShot")]
    pub screen_shot: Option<String>,
    #[serde(rename = "SuccTime", default, deserialize_with = "empty_as_none")]
    pub succ_time: Option<i64>,
    #[serde(rename = "FailTime", default, deserialize_with = "empty_as_none")]
    pub fail_time: Option<i64>,
    #[serde(rename = "DelayTime", default, deserialize_with = "empty_as_none")]
    pub delay_time: Option<i64>,
    #[serde(rename = "appid")]
    pub mini_program_appid: Option<String>,
    #[serde(rename = "status", default, deserialize_with = "empty_as_none")]
    pub mini_program_status: Option<i64>,
    #[serde(rename = "msg")]
    pub mini_program_msg: Option<String>,
    #[serde(rename = "auth_code")]
    pub mini_program_auth_code: Option<String>,
    #[serde(rename = "info")]
    pub mini_program_reg_info: Option<MiniProgramRegInfo>,
    #[serde(rename = "result_info")]
    pub mini_program_apply_info: Option<MiniProgramApplyInfo>,

    // cards
    #[serde(rename = "CardId")]
    pub card_id: Option<String>,
    #[serde(rename = "RefuseReason")]
    pub refuse_reason: Option<String>,
    #[serde(rename = "IsGiveByFriend", default, deserialize_with = "empty_as_none")]
    pub is_give_by_friend: Option<i32>,
    #[serde(rename = "FriendUserName")]
    pub friend_user_name: Option<String>,
    #[serde(rename = "UserCardCode")]
    pub user_card_code: Option<String>,
    #[serde(rename = "OldUserCardCode")]
    pub old_user_card_code: Option<String>,
    #[serde(rename = "OuterStr")]
    pub outer_str: Option<String>,
    #[serde(rename = "IsRestoreMemberCard", default, deserialize_with = "empty_as_none")]
    pub is_restore_member_card: Option<i32>,
    #[serde(rename = "UnionId")]
    pub union_id: Option<String>,

    // content security
    #[serde(rename = "isrisky", default, deserialize_with = "empty_as_none")]
    pub is_risky: Option<i32>,
    #[serde(rename = "extra_info_json")]
    pub extra_info_json: Option<String>,
    #[serde(rename = "trace_id")]
    pub trace_id: Option<String>,
    #[serde(rename = "status_code", default, deserialize_with = "empty_as_none")]
    pub status_code: Option<i32>,

    // devices
    #[serde(rename = "DeviceType")]
    pub device_type: Option<String>,
    #[serde(rename = "DeviceID")]
    pub device_id: Option<String>,
    #[serde(rename = "SessionID")]
    pub session_id: Option<String>,
    #[serde(rename = "OpenID")]
    pub open_id: Option<String>,
}

impl MixMessage {
    pub fn msg_type(&self) -> MsgType {
        MsgType::from(self.msg_type.as_str())
    }

    pub fn event(&self) -> Option<EventType> {
        self.event.as_deref().map(EventType::from)
    }

    pub fn info_type(&self) -> Option<InfoType> {
        self.info_type.as_deref().map(InfoType::from)
    }

    pub fn is_event(&self) -> bool {
        self.msg_type() == MsgType::Event
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanCodeInfo {
    #[serde(rename = "ScanType")]
    pub scan_type: Option<String>,
    #[serde(rename = "ScanResult")]
    pub scan_result: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendPicsInfo {
    #[serde(rename = "Count", default, deserialize_with = "empty_as_none")]
    pub count: Option<i32>,
    #[serde(rename = "PicList")]
    pub pic_list: Option<PicList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PicList {
    #[serde(rename = "item", default)]
    pub items: Vec<EventPic>,
}

/// A picture sent through a menu photo event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPic {
    #[serde(rename = "PicMd5Sum")]
    pub pic_md5_sum: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendLocationInfo {
    #[serde(rename = "Location_X", default, deserialize_with = "empty_as_none")]
    pub location_x: Option<f64>,
    #[serde(rename = "Location_Y", default, deserialize_with = "empty_as_none")]
    pub location_y: Option<f64>,
    #[serde(rename = "Scale", default, deserialize_with = "empty_as_none")]
    pub scale: Option<f64>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "Poiname")]
    pub poiname: Option<String>,
}

/// Fast-registration company info (`notify_third_fasteregister`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MiniProgramRegInfo {
    #[serde(rename = "code")]
    pub company_code: Option<String>,
    #[serde(rename = "name")]
    pub company_name: Option<String>,
    #[serde(rename = "code_type", default, deserialize_with = "empty_as_none")]
    pub code_type: Option<i8>,
    #[serde(rename = "legal_persona_wechat")]
    pub legal_persona_wechat: Option<String>,
    #[serde(rename = "legal_persona_name")]
    pub legal_persona_name: Option<String>,
    #[serde(rename = "component_phone")]
    pub component_phone: Option<String>,
}

/// Privacy interface application result (`wxa_privacy_apply`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MiniProgramApplyInfo {
    #[serde(rename = "api_name")]
    pub api_name: Option<String>,
    #[serde(rename = "apply_time")]
    pub apply_time: Option<String>,
    #[serde(rename = "audit_id")]
    pub audit_id: Option<String>,
    #[serde(rename = "audit_time")]
    pub audit_time: Option<String>,
    #[serde(rename = "reason")]
    pub reason: Option<String>,
    #[serde(rename = "status")]
    pub status: Option<String>,
}
