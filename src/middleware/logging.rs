use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use http::{Request, Response};
use log::{debug, info};
use tower::{Layer, Service};

/// Logs inbound callbacks with vendor-supplied secrets redacted from the URI.
#[derive(Debug, Clone, Default)]
pub struct LoggingLayer {
    verbose: bool,
}

impl LoggingLayer {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Log at `debug!` with direction markers instead of `info!`.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingService<S> {
    inner: S,
    verbose: bool,
}

const SENSITIVE_FIELDS: &[&str] = &["signature", "msg_signature", "echostr", "nonce", "openid"];

impl<S> LoggingService<S> {
    fn redact_uri(uri: &str) -> String {
        let Some((base, query)) = uri.split_once('?') else {
            return uri.to_string();
        };
        let redacted_query = query
            .split('&')
            .map(|param| match param.split_once('=') {
                Some((key, _)) if SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s)) => {
                    format!("{}=[REDACTED]", key)
                }
                _ => param.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", base, redacted_query)
    }

    fn log_request(method: &str, uri: &str, verbose: bool) {
        let safe_uri = Self::redact_uri(uri);
        if verbose {
            debug!("[WechatServer] >>> {} {}", method, safe_uri);
        } else {
            info!("[WechatServer] {} {}", method, safe_uri);
        }
    }

    fn log_response(status: http::StatusCode, duration: Duration, verbose: bool) {
        if verbose {
            debug!(
                "[WechatServer] <<< {} - {} ({:?})",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                duration
            );
        } else {
            info!("[WechatServer] {} ({:?})", status.as_u16(), duration);
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for LoggingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let method = req.method().as_str().to_string();
        let uri = req.uri().to_string();
        let verbose = self.verbose;
        // Call the instance that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            Self::log_request(&method, &uri, verbose);

            let start = Instant::now();
            let response = inner.call(req).await?;
            Self::log_response(response.status(), start.elapsed(), verbose);

            Ok(response)
        })
    }
}
