//! Fluent, blocking HTTP request backed by a libcurl easy handle.
//!
//! # Design
//! `Request` owns one `Easy2<Collector>` for its whole life. The collector is
//! the handler libcurl calls back into for body chunks and header lines. It
//! lives inside the handle, so no raw back-pointer to the request is ever
//! registered and moving a `Request` is always sound.
//!
//! Setters only touch `RequestOptions`. Each verb resets the handle, applies
//! the options from scratch and performs the exchange. As a result no
//! method, body or header from a previous call can survive into the next
//! one, while everything the caller configured is sent again.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use curl::easy::{Easy2, Handler, List, WriteError};
use tracing::{debug, warn};

use crate::context::TransportContext;
use crate::error::{Error, TransferError};
use crate::http::{Method, RequestOptions, Response};

/// Sink for everything the engine delivers during one `perform`.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    response: Response,
}

impl Collector {
    fn clear(&mut self) {
        self.response = Response::default();
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.response.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.response
            .headers
            .push(String::from_utf8_lossy(data).into_owned());
        true
    }
}

/// A single configurable HTTP exchange.
///
/// ```no_run
/// use net_client::{Request, TransportContext};
///
/// let ctx = TransportContext::init()?;
/// let resp = Request::new(&ctx)?
///     .set_url("https://example.com/post")
///     .set_timeout_ms(5000)
///     .set_body(r#"{"x":1}"#, "application/json")
///     .post()?;
/// println!("{} {}", resp.status, resp.text());
/// # Ok::<(), net_client::Error>(())
/// ```
pub struct Request<'ctx> {
    easy: Easy2<Collector>,
    options: RequestOptions,
    _context: PhantomData<&'ctx TransportContext>,
}

impl<'ctx> Request<'ctx> {
    /// Acquire an easy handle and install the default configuration.
    pub fn new(_context: &'ctx TransportContext) -> Result<Self, Error> {
        let mut request = Self {
            easy: Easy2::new(Collector::default()),
            options: RequestOptions::default(),
            _context: PhantomData,
        };
        request
            .apply_options()
            .map_err(|e| Error::Init(format!("easy handle setup: {}", e.description())))?;
        Ok(request)
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.options.url = url.into();
        self
    }

    /// Whole-transfer timeout. 0 disables it.
    pub fn set_timeout_ms(&mut self, ms: u64) -> &mut Self {
        self.options.timeout_ms = ms;
        self
    }

    pub fn set_follow_redirects(&mut self, follow: bool) -> &mut Self {
        self.options.follow_redirects = follow;
        self
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.options.user_agent = user_agent.into();
        self
    }

    /// Append one raw header line, e.g. `"Accept: text/plain"`.
    pub fn add_header(&mut self, line: impl Into<String>) -> &mut Self {
        self.options.headers.push(line.into());
        self
    }

    /// Replace the outgoing body. A non-empty `content_type` also appends a
    /// `Content-Type` header line.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>, content_type: &str) -> &mut Self {
        self.options.body = body.into();
        if !content_type.is_empty() {
            self.add_header(format!("Content-Type: {content_type}"));
        }
        self
    }

    pub fn get(&mut self) -> Result<Response, Error> {
        self.execute(Method::Get)
    }

    pub fn post(&mut self) -> Result<Response, Error> {
        self.execute(Method::Post)
    }

    pub fn put(&mut self) -> Result<Response, Error> {
        self.execute(Method::Put)
    }

    pub fn delete(&mut self) -> Result<Response, Error> {
        self.execute(Method::Delete)
    }

    /// Run one blocking exchange with the current options.
    pub fn execute(&mut self, method: Method) -> Result<Response, Error> {
        self.easy.reset();
        self.easy.get_mut().clear();

        debug!(%method, url = %self.options.url, "starting transfer");
        match self.perform(method) {
            Ok(response) => {
                debug!(
                    %method,
                    status = response.status,
                    body_len = response.body.len(),
                    header_lines = response.headers.len(),
                    "transfer complete"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(%method, url = %self.options.url, error = %err, "transfer failed");
                Err(err.into())
            }
        }
    }

    fn perform(&mut self, method: Method) -> Result<Response, TransferError> {
        self.apply_options().map_err(TransferError::from_curl)?;
        self.apply_method(method).map_err(TransferError::from_curl)?;
        self.easy.perform().map_err(TransferError::from_curl)?;

        let status = self.easy.response_code().map_err(TransferError::from_curl)?;
        let mut response = std::mem::take(&mut self.easy.get_mut().response);
        response.status = status;
        Ok(response)
    }

    fn apply_options(&mut self) -> Result<(), curl::Error> {
        let opts = &self.options;
        let easy = &mut self.easy;

        if !opts.url.is_empty() {
            easy.url(&opts.url)?;
        }
        easy.timeout(Duration::from_millis(opts.timeout_ms))?;
        easy.follow_location(opts.follow_redirects)?;
        easy.useragent(&opts.user_agent)?;

        if !opts.headers.is_empty() {
            let mut list = List::new();
            for line in &opts.headers {
                list.append(line)?;
            }
            easy.http_headers(list)?;
        }
        Ok(())
    }

    fn apply_method(&mut self, method: Method) -> Result<(), curl::Error> {
        let easy = &mut self.easy;
        if method.sends_body() {
            easy.post(true)?;
            easy.post_fields_copy(&self.options.body)?;
        } else {
            easy.get(true)?;
        }
        match method {
            Method::Get | Method::Post => Ok(()),
            Method::Put | Method::Delete => easy.custom_request(method.as_str()),
        }
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::DEFAULT_USER_AGENT;

    fn context() -> TransportContext {
        TransportContext::init().unwrap()
    }

    #[test]
    fn new_request_has_defaults() {
        let ctx = context();
        let req = Request::new(&ctx).unwrap();
        assert_eq!(req.options(), &RequestOptions::default());
        assert_eq!(req.options().user_agent, DEFAULT_USER_AGENT);
        assert!(req.options().follow_redirects);
        assert_eq!(req.options().timeout_ms, 0);
    }

    #[test]
    fn setters_chain_and_last_write_wins() {
        let ctx = context();
        let mut req = Request::new(&ctx).unwrap();
        req.set_url("http://a.test/")
            .set_timeout_ms(100)
            .set_user_agent("first")
            .set_body("one", "")
            .set_url("http://b.test/")
            .set_timeout_ms(0)
            .set_user_agent("second")
            .set_follow_redirects(false)
            .set_body("two", "");

        let opts = req.options();
        assert_eq!(opts.url, "http://b.test/");
        assert_eq!(opts.timeout_ms, 0);
        assert_eq!(opts.user_agent, "second");
        assert!(!opts.follow_redirects);
        assert_eq!(opts.body, b"two");
        assert!(opts.headers.is_empty());
    }

    #[test]
    fn headers_accumulate_in_order_with_duplicates() {
        let ctx = context();
        let mut req = Request::new(&ctx).unwrap();
        req.add_header("X-A: 1")
            .add_header("X-B: 2")
            .add_header("X-A: 1");
        assert_eq!(req.options().headers, vec!["X-A: 1", "X-B: 2", "X-A: 1"]);
    }

    #[test]
    fn content_type_is_appended_after_existing_headers() {
        let ctx = context();
        let mut req = Request::new(&ctx).unwrap();
        req.add_header("Accept: application/json")
            .set_body(r#"{"x":1}"#, "application/json");
        assert_eq!(
            req.options().headers,
            vec!["Accept: application/json", "Content-Type: application/json"]
        );
        assert_eq!(req.options().body.len(), 7);
    }

    #[test]
    fn empty_content_type_adds_no_header() {
        let ctx = context();
        let mut req = Request::new(&ctx).unwrap();
        req.set_body(Vec::new(), "");
        assert!(req.options().headers.is_empty());
        assert!(req.options().body.is_empty());
    }

    #[test]
    fn unsupported_scheme_is_a_transfer_error() {
        let ctx = context();
        let err = Request::new(&ctx)
            .unwrap()
            .set_url("nope://example.test/")
            .get()
            .unwrap_err();
        match err {
            Error::Transfer(e) => {
                assert!(!e.message().is_empty());
                assert!(!e.is_timeout());
            }
            other => panic!("expected transfer error, got {other:?}"),
        }
    }

    #[test]
    fn missing_url_is_a_transfer_error() {
        let ctx = context();
        let err = Request::new(&ctx).unwrap().get().unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
    }

    #[test]
    fn request_can_move_between_threads() {
        let ctx = context();
        let mut req = Request::new(&ctx).unwrap();
        req.set_url("http://moved.test/");
        std::thread::scope(|s| {
            s.spawn(move || {
                assert_eq!(req.options().url, "http://moved.test/");
            });
        });
    }

    #[test]
    fn collector_consumes_every_byte() {
        let mut collector = Collector::default();
        assert_eq!(collector.write(b"hello ").unwrap(), 6);
        assert_eq!(collector.write(b"world").unwrap(), 5);
        assert!(collector.header(b"HTTP/1.1 200 OK\r\n"));
        assert!(collector.header(b"\r\n"));
        assert_eq!(collector.response.body, b"hello world");
        assert_eq!(collector.response.headers, vec!["HTTP/1.1 200 OK\r\n", "\r\n"]);

        collector.clear();
        assert_eq!(collector.response, Response::default());
    }
}
