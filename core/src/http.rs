//! Plain-data types describing a request's configuration and its result.
//!
//! # Design
//! `RequestOptions` is what the fluent setters on `Request` mutate. Nothing
//! touches the easy handle until a verb runs, so setters stay infallible and
//! free of I/O. At that point the options are applied to a freshly reset
//! handle in one go. `Response` is a fresh owned value per exchange.

use std::fmt;

/// User-agent installed on every new request.
pub const DEFAULT_USER_AGENT: &str = "net-client/1.0";

/// Transfer timeout in milliseconds; 0 never times out.
pub const DEFAULT_TIMEOUT_MS: u64 = 0;

/// HTTP method for an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the configured body is attached as the outgoing payload.
    pub fn sends_body(self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a `Request` sends, as last configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub url: String,
    pub timeout_ms: u64,
    pub follow_redirects: bool,
    pub user_agent: String,
    /// Raw header lines such as `"Accept: */*"`, in the order they are sent.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// The result of one exchange.
///
/// `headers` holds every header line the engine delivered, undecoded and in
/// arrival order. That includes each status line, the blank line that ends a
/// block, and the trailing `\r\n`. When redirects are followed, the blocks of
/// every hop appear one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u32,
    pub body: Vec<u8>,
    pub headers: Vec<String>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Case-insensitive lookup of a header value in the final response block.
    ///
    /// Returns the first match, trimmed of surrounding whitespace.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.final_block().iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// Header lines belonging to the last status line.
    fn final_block(&self) -> &[String] {
        let start = self
            .headers
            .iter()
            .rposition(|line| line.starts_with("HTTP/"))
            .unwrap_or(0);
        &self.headers[start..]
    }
}
