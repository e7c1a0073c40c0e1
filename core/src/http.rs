//! Hand-built HTTP/1.1 requests and raw responses.
//!
//! # Design
//! Requests are plain data that serialize to the exact bytes written to the
//! socket. Only what the verification backend needs is supported: one GET or
//! POST per connection, `Connection: Close`, no chunked bodies, no redirects.
//! A response is whatever came back before the peer closed, split once at
//! the first blank line.

use std::borrow::Cow;

/// Sent as `User-Agent`.
pub const USER_AGENT: &str = "CAPTCHA/Rust";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;";
const HEADER_END: &[u8] = b"\r\n\r\n";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` already carries the query string for GET requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub host: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Build a request carrying `payload` as a query string (GET) or as a
    /// url-encoded form body (POST). Pairs keep their iteration order.
    pub fn build<I, K, V>(method: HttpMethod, host: &str, path: &str, payload: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = encode_payload(payload);
        let header = |name: &str, value: &str| (name.to_string(), value.to_string());

        match method {
            HttpMethod::Get => {
                let path = if encoded.is_empty() {
                    path.to_string()
                } else {
                    format!("{path}?{encoded}")
                };
                Self {
                    method,
                    host: host.to_string(),
                    path,
                    headers: vec![
                        header("Host", host),
                        header("User-Agent", USER_AGENT),
                        header("Connection", "Close"),
                    ],
                    body: None,
                }
            }
            HttpMethod::Post => {
                let mut headers = vec![
                    header("Host", host),
                    header("Content-Type", FORM_CONTENT_TYPE),
                ];
                if !encoded.is_empty() {
                    headers.push(header("Content-Length", &encoded.len().to_string()));
                }
                headers.push(header("User-Agent", USER_AGENT));
                headers.push(header("Connection", "Close"));
                Self {
                    method,
                    host: host.to_string(),
                    path: path.to_string(),
                    headers,
                    body: (!encoded.is_empty()).then_some(encoded),
                }
            }
        }
    }

    /// Request line, headers, blank line, then the body if any.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method.as_str(), self.path);
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        if let Some(body) = &self.body {
            out.push_str(body);
        }
        out.into_bytes()
    }
}

/// `key=value&key=value`, values unescaped and then url-encoded. Keys are
/// written as given.
pub fn encode_payload<I, K, V>(payload: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    payload
        .into_iter()
        .map(|(key, value)| {
            let value = unescape(value.as_ref());
            let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
            format!("{}={value}", key.as_ref())
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Undo backslash escaping: `\0` becomes a NUL character, any other `\x`
/// becomes `x`, `\\` becomes `\`, and a lone trailing backslash is dropped.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('0') => out.push('\0'),
                Some(escaped) => out.push(escaped),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// A raw response split at the first `\r\n\r\n`.
///
/// Without that boundary the whole payload is the header block and the body
/// is empty. The header block is kept as received and decoded per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub head: Vec<u8>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn from_raw(raw: &[u8]) -> Self {
        let (head, body) = match raw.windows(HEADER_END.len()).position(|w| w == HEADER_END) {
            Some(at) => (&raw[..at], &raw[at + HEADER_END.len()..]),
            None => (raw, &raw[raw.len()..]),
        };
        Self {
            head: head.to_vec(),
            body: body.to_vec(),
        }
    }

    fn head_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.head.split(|&b| b == b'\n').map(|line| match line {
            [rest @ .., b'\r'] => rest,
            line => line,
        })
    }

    /// First line of the header block, decoded lossily.
    pub fn status_line(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.head_lines().next().unwrap_or_default())
    }

    /// Status code from the first line of the header block.
    pub fn status(&self) -> Option<u16> {
        let line = std::str::from_utf8(self.head_lines().next()?).ok()?;
        let mut parts = line.split_whitespace();
        if !parts.next()?.starts_with("HTTP/") {
            return None;
        }
        parts.next()?.parse().ok()
    }

    /// `(name, value)` pairs after the status line, in order. Lines that are
    /// not valid UTF-8 are skipped.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.head_lines()
            .skip(1)
            .filter_map(|line| std::str::from_utf8(line).ok())
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim(), value.trim()))
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
