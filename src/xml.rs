//! XML helpers on top of quick-xml
//!
//! Typed decoding goes through serde; [`flat_fields`] keeps the raw top-level
//! values around for signature checks, and [`XmlBuilder`] writes replies with
//! CDATA text the way the vendors send them.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

use crate::error::WechatError;

/// Deserialize an XML document from raw bytes.
pub fn from_bytes<T: DeserializeOwned>(raw: &[u8]) -> Result<T, WechatError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| WechatError::Xml(format!("body is not UTF-8: {}", e)))?;
    Ok(quick_xml::de::from_str(text)?)
}

/// `deserialize_with` helper for numeric fields.
///
/// Vendors sometimes push `<MsgId></MsgId>` or `<coupon_fee/>`; empty or
/// blank text is `None`, anything else must parse as `T`.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Like [`empty_as_none`] for non-optional fields; empty text is `T::default()`.
pub fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    Ok(empty_as_none(deserializer)?.unwrap_or_default())
}

/// Collect the text of every direct child of the root element.
///
/// Nested elements are skipped. Repeated names keep the last value.
pub fn flat_fields(raw: &[u8]) -> Result<BTreeMap<String, String>, WechatError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| WechatError::Xml(format!("body is not UTF-8: {}", e)))?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut fields = BTreeMap::new();
    let mut depth = 0usize;
    let mut current: Option<String> = None;
    let mut value = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    current = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    value.clear();
                } else if depth > 2 {
                    current = None;
                }
            }
            Event::Empty(e) if depth == 1 => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                fields.insert(name, String::new());
            }
            Event::Text(t) if current.is_some() => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| WechatError::Xml(e.to_string()))?;
                value.push_str(&unescaped);
            }
            Event::CData(c) if current.is_some() => {
                value.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(name) = current.take() {
                        fields.insert(name, std::mem::take(&mut value));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(WechatError::Xml("unexpected end of document".to_string()));
    }
    Ok(fields)
}

fn write_error(e: impl std::fmt::Display) -> WechatError {
    WechatError::Xml(format!("failed to write XML: {}", e))
}

/// Small element writer for reply documents
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
    root: String,
}

impl XmlBuilder {
    /// Start a document with an open `<xml>` root.
    pub fn new() -> Result<Self, WechatError> {
        Self::with_root("xml")
    }

    pub fn with_root(root: &str) -> Result<Self, WechatError> {
        let mut builder = Self {
            writer: Writer::new(Vec::new()),
            root: root.to_string(),
        };
        builder.open(root)?;
        Ok(builder)
    }

    pub fn open(&mut self, name: &str) -> Result<&mut Self, WechatError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(write_error)?;
        Ok(self)
    }

    pub fn close(&mut self, name: &str) -> Result<&mut Self, WechatError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(write_error)?;
        Ok(self)
    }

    /// `<name><![CDATA[value]]></name>`
    pub fn cdata(&mut self, name: &str, value: &str) -> Result<&mut Self, WechatError> {
        self.open(name)?;
        // A literal "]]>" cannot live inside one CDATA section.
        for (i, part) in value.split("]]>").enumerate() {
            if i > 0 {
                self.writer
                    .write_event(Event::CData(BytesCData::new("]]")))
                    .map_err(write_error)?;
                self.writer
                    .write_event(Event::CData(BytesCData::new(">")))
                    .map_err(write_error)?;
            }
            self.writer
                .write_event(Event::CData(BytesCData::new(part)))
                .map_err(write_error)?;
        }
        self.close(name)
    }

    /// `<name>value</name>` with escaping
    pub fn text(&mut self, name: &str, value: &str) -> Result<&mut Self, WechatError> {
        self.open(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(write_error)?;
        self.close(name)
    }

    /// Close the root and return the document.
    pub fn finish(mut self) -> Result<String, WechatError> {
        let root = std::mem::take(&mut self.root);
        self.close(&root)?;
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| WechatError::Xml(format!("reply is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_fields_reads_text_and_cdata() {
        let raw = br#"<xml>
            <return_code><![CDATA[SUCCESS]]></return_code>
            <total_fee>1</total_fee>
            <attach>a &amp; b</attach>
            <empty/>
        </xml>"#;
        let fields = flat_fields(raw).unwrap();
        assert_eq!(fields["return_code"], "SUCCESS");
        assert_eq!(fields["total_fee"], "1");
        assert_eq!(fields["attach"], "a & b");
        assert_eq!(fields["empty"], "");
    }

    #[derive(Debug, Deserialize)]
    struct Amounts {
        #[serde(default, deserialize_with = "empty_as_none")]
        fee: Option<i64>,
        #[serde(default, deserialize_with = "empty_as_none")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "empty_as_default")]
        time: i64,
    }

    #[test]
    fn test_empty_numeric_elements_are_absent() {
        let amounts: Amounts =
            from_bytes(b"<xml><fee></fee><rate> </rate><time></time></xml>").unwrap();
        assert_eq!(amounts.fee, None);
        assert_eq!(amounts.rate, None);
        assert_eq!(amounts.time, 0);

        let amounts: Amounts = from_bytes(b"<xml><fee/></xml>").unwrap();
        assert_eq!(amounts.fee, None);
        assert_eq!(amounts.time, 0);
    }

    #[test]
    fn test_numeric_elements_parse_text_and_cdata() {
        let amounts: Amounts = from_bytes(
            b"<xml><fee><![CDATA[42]]></fee><rate> 1.5 </rate><time>1700000000</time></xml>",
        )
        .unwrap();
        assert_eq!(amounts.fee, Some(42));
        assert_eq!(amounts.rate, Some(1.5));
        assert_eq!(amounts.time, 1700000000);
    }

    #[test]
    fn test_non_numeric_text_is_an_error() {
        let err = from_bytes::<Amounts>(b"<xml><fee>abc</fee></xml>").unwrap_err();
        assert!(matches!(err, WechatError::Xml(_)));
    }

    #[test]
    fn test_flat_fields_skips_nested() {
        let raw = br#"<xml><a>1</a><nested><b>2</b></nested><c>3</c></xml>"#;
        let fields = flat_fields(raw).unwrap();
        assert_eq!(fields.get("a").map(String::as_str), Some("1"));
        assert_eq!(fields.get("c").map(String::as_str), Some("3"));
        assert!(!fields.contains_key("b"));
    }

    #[test]
    fn test_flat_fields_rejects_malformed() {
        assert!(flat_fields(b"<xml><a>1</b></xml>").is_err());
        assert!(flat_fields(b"<xml><a>1</a>").is_err());
    }

    #[test]
    fn test_builder_writes_cdata_and_text() {
        let mut builder = XmlBuilder::new().unwrap();
        builder.cdata("ToUserName", "oUser").unwrap();
        builder.text("CreateTime", "123").unwrap();
        let xml = builder.finish().unwrap();
        assert_eq!(
            xml,
            "<xml><ToUserName><![CDATA[oUser]]></ToUserName><CreateTime>123</CreateTime></xml>"
        );
    }

    #[test]
    fn test_builder_splits_cdata_terminator() {
        let mut builder = XmlBuilder::new().unwrap();
        builder.cdata("Content", "a]]>b").unwrap();
        let xml = builder.finish().unwrap();

        #[derive(serde::Deserialize)]
        struct Reply {
            #[serde(rename = "Content")]
            content: String,
        }
        let parsed: Reply = from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(parsed.content, "a]]>b");
    }
}
