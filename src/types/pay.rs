//! WeChat Pay v2 notification records

use serde::Deserialize;

use crate::xml::empty_as_none;

/// Whether a payment notification reports a payment or a refund
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayKind {
    Pay,
    Refund,
}

/// Payment result or refund notification pushed by WeChat Pay
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentNotification {
    pub return_code: String,
    pub return_msg: Option<String>,
    pub appid: Option<String>,
    pub mch_id: Option<String>,
    pub sub_appid: Option<String>,
    pub sub_mch_id: Option<String>,
    pub device_info: Option<String>,
    pub nonce_str: Option<String>,
    pub sign: Option<String>,
    pub sign_type: Option<String>,
    pub result_code: Option<String>,
    pub err_code: Option<String>,
    pub err_code_des: Option<String>,
    pub openid: Option<String>,
    pub is_subscribe: Option<String>,
    pub trade_type: Option<String>,
    pub bank_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub total_fee: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub settlement_total_fee: Option<i64>,
    pub fee_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cash_fee: Option<i64>,
    pub cash_fee_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub coupon_fee: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub coupon_count: Option<i64>,
    pub transaction_id: Option<String>,
    pub out_trade_no: Option<String>,
    pub attach: Option<String>,
    pub time_end: Option<String>,
    /// Encrypted refund details, present on refund notifications
    pub req_info: Option<String>,

    /// Decrypted `req_info`
    #[serde(skip)]
    pub refund: Option<RefundInfo>,
    #[serde(skip)]
    pub kind: Option<PayKind>,
}

impl PaymentNotification {
    pub fn is_success(&self) -> bool {
        self.return_code == "SUCCESS"
    }

    pub fn refund_fee(&self) -> i64 {
        self.refund
            .as_ref()
            .and_then(|r| r.refund_fee)
            .unwrap_or_default()
    }

    pub fn total_fee(&self) -> i64 {
        self.total_fee
            .or_else(|| self.refund.as_ref().and_then(|r| r.total_fee))
            .unwrap_or_default()
    }

    /// Refund if a refund fee is present, otherwise pay if a total fee is present.
    pub fn classify_kind(&self) -> Option<PayKind> {
        if self.refund_fee() > 0 {
            Some(PayKind::Refund)
        } else if self.total_fee() > 0 {
            Some(PayKind::Pay)
        } else {
            None
        }
    }
}

/// Decrypted refund details from `req_info`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundInfo {
    pub transaction_id: Option<String>,
    pub out_trade_no: Option<String>,
    pub refund_id: Option<String>,
    pub out_refund_no: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub total_fee: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub settlement_total_fee: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub refund_fee: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub settlement_refund_fee: Option<i64>,
    pub refund_status: Option<String>,
    pub success_time: Option<String>,
    pub refund_recv_accout: Option<String>,
    pub refund_account: Option<String>,
    pub refund_request_source: Option<String>,
}
