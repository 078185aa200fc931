//! tower `Service` adapter over `http` types

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::task::{Context, Poll};

use http::{header, Method, Request, Response, StatusCode};
use log::warn;
use tower::Service;

use crate::error::WechatError;

use super::pipeline::CallbackResponse;
use super::request::CallbackRequest;
use super::Server;

/// Which vendor's callback format a service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Wechat,
    Douyin,
}

/// [`Server`] as a tower `Service<http::Request<B>>`
///
/// A GET carrying `echostr` is answered as URL verification; everything else
/// runs the callback pipeline. Pipeline errors become HTTP statuses via
/// [`WechatError::http_status`], so the service itself never fails.
#[derive(Debug, Clone)]
pub struct CallbackService {
    server: Server,
    vendor: Vendor,
}

impl CallbackService {
    pub fn new(server: Server, vendor: Vendor) -> Self {
        Self { server, vendor }
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn handle(
        &self,
        request: &CallbackRequest,
        method: &Method,
    ) -> Result<CallbackResponse, WechatError> {
        if *method == Method::GET && !request.echostr().is_empty() {
            return self.server.verify_url(request);
        }
        match self.vendor {
            Vendor::Wechat => self.server.serve(request),
            Vendor::Douyin => self.server.serve_douyin(request),
        }
    }
}

fn build_response(status: StatusCode, content_type: &str, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Ok(value) = header::HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

impl<B> Service<Request<B>> for CallbackService
where
    B: AsRef<[u8]>,
{
    type Response = Response<String>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let request = CallbackRequest::from_http(&req);
        let response = match self.handle(&request, req.method()) {
            Ok(reply) => build_response(StatusCode::OK, reply.content_type, reply.body),
            Err(e) => {
                warn!(
                    "[WechatServer] {} {} rejected: {}",
                    req.method(),
                    req.uri().path(),
                    e
                );
                build_response(e.http_status(), super::CONTENT_TYPE_TEXT, e.to_string())
            }
        };
        ready(Ok(response))
    }
}
