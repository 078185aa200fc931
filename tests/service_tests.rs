use http::{header, Method, Request, StatusCode};
use tower::{ServiceBuilder, ServiceExt};
use wechat_callback_sdk::crypto::{encrypt_douyin, sha1_signature};
use wechat_callback_sdk::middleware::LoggingLayer;
use wechat_callback_sdk::server::{Reply, Server, Vendor, Verified};
use wechat_callback_sdk::types::{AppId, DouyinMessage, EncodingAesKey, MixMessage, Token};

const TOKEN: &str = "t1";
const AES_KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";

fn server() -> Server {
    Server::builder()
        .token(Token::new(TOKEN).unwrap())
        .app_id(AppId::new("wx1234567890abcdef").unwrap())
        .encoding_aes_key(EncodingAesKey::new(AES_KEY).unwrap())
        .message_handler(|msg: &Verified<MixMessage>| {
            Some(Reply::text(msg.content.clone().unwrap_or_default()))
        })
        .douyin_handler(|_: &Verified<DouyinMessage>| None)
        .build()
        .unwrap()
}

fn signed_uri(path: &str, nonce: &str, extra: &str) -> String {
    let signature = sha1_signature(&[TOKEN, "1700000000", nonce]);
    format!(
        "{}?signature={}&timestamp=1700000000&nonce={}{}",
        path, signature, nonce, extra
    )
}

fn text_body(content: &str) -> Vec<u8> {
    format!(
        "<xml><ToUserName><![CDATA[gh_1]]></ToUserName>\
         <FromUserName><![CDATA[oUser]]></FromUserName>\
         <CreateTime>1700000000</CreateTime>\
         <MsgType><![CDATA[text]]></MsgType>\
         <Content><![CDATA[{}]]></Content></xml>",
        content
    )
    .into_bytes()
}

#[tokio::test]
async fn test_get_with_echostr_verifies_url() {
    let request = Request::get(signed_uri("/wechat", "abc", "&echostr=hello%20world"))
        .body(Vec::<u8>::new())
        .unwrap();
    let response = server()
        .into_service(Vendor::Wechat)
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "hello world");
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn test_post_message_returns_xml_reply() {
    let request = Request::post(signed_uri("/wechat", "abc", ""))
        .body(text_body("hi there"))
        .unwrap();
    let response = server()
        .into_service(Vendor::Wechat)
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml; charset=utf-8"
    );
    assert!(response
        .body()
        .contains("<Content><![CDATA[hi there]]></Content>"));
}

#[tokio::test]
async fn test_errors_map_to_statuses() {
    let service = server().into_service(Vendor::Wechat);

    let forged = Request::post("/wechat?signature=bad&timestamp=1&nonce=n")
        .body(text_body("x"))
        .unwrap();
    let response = service.clone().oneshot(forged).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let malformed = Request::post(signed_uri("/wechat", "abc", ""))
        .body(b"<xml><a></xml>".to_vec())
        .unwrap();
    let response = service.oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_douyin_service() {
    let key = EncodingAesKey::new(AES_KEY).unwrap();
    let encrypt = encrypt_douyin(
        &key,
        &[1u8; 16],
        &[2u8; 16],
        br#"{"MsgType":"PUSH","Event":"Ticket","Ticket":"tk"}"#,
        "tt_app",
    )
    .unwrap();
    let body = serde_json::json!({
        "Nonce": "n1",
        "TimeStamp": "1700000000",
        "Encrypt": encrypt,
        "MsgSignature": sha1_signature(&[TOKEN, "1700000000", "n1", encrypt.as_str()]),
    })
    .to_string();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/douyin")
        .body(body.into_bytes())
        .unwrap();
    let response = server()
        .into_service(Vendor::Douyin)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "success");
}

#[tokio::test]
async fn test_douyin_service_rejects_xml() {
    let request = Request::post("/douyin").body(text_body("x")).unwrap();
    let response = server()
        .into_service(Vendor::Douyin)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logging_layer_with_service_builder() {
    let service = ServiceBuilder::new()
        .layer(LoggingLayer::new())
        .service(server().into_service(Vendor::Wechat));

    let request = Request::post(signed_uri("/wechat", "abc", "&openid=oUser"))
        .body(text_body("logged"))
        .unwrap();
    let response = service.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().contains("logged"));
}

#[tokio::test]
async fn test_concurrent_requests_share_server() {
    let service = server().into_service(Vendor::Wechat);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let nonce = format!("n{}", i);
                let request = Request::post(signed_uri("/wechat", &nonce, ""))
                    .body(text_body(&format!("msg-{}", i)))
                    .unwrap();
                let response = service.oneshot(request).await.unwrap();
                (i, response)
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles).await;
    for result in results {
        let (i, response) = result.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().contains(&format!("msg-{}", i)));
    }
}
