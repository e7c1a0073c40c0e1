//! Request builder and response parser for the remote verification backend.
//!
//! # Design
//! `VerifyClient` holds only the backend address and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; `RawHttpClient` performs the round-trip in between.

use crate::config::RemoteConfig;
use crate::error::{ApiError, VerifyError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::RawHttpClient;
use crate::types::Point;

const VERDICT_PASS: &str = "OK";
const VERDICT_FAIL: &str = "KO";

/// Stateless client for the verification backend.
#[derive(Debug, Clone)]
pub struct VerifyClient {
    host: String,
    port: u16,
    path: String,
}

impl VerifyClient {
    pub fn new(host: &str, port: u16, path: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(&config.host, config.port, &config.path)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// POST the challenge id and the `x:y` solution.
    pub fn build_check(&self, id: &str, point: Point) -> HttpRequest {
        let solution = point.to_string();
        HttpRequest::build(
            HttpMethod::Post,
            &self.host,
            &self.path,
            [("cid", id), ("csol", solution.as_str())],
        )
    }

    pub fn parse_check(&self, response: HttpResponse) -> Result<bool, ApiError> {
        let status = response
            .status()
            .ok_or_else(|| ApiError::MalformedResponse(response.status_line().into_owned()))?;
        let body = response.body_text().trim().to_string();
        match status {
            200 => match body.as_str() {
                VERDICT_PASS => Ok(true),
                VERDICT_FAIL => Ok(false),
                _ => Err(ApiError::UnexpectedBody(body)),
            },
            404 => Err(ApiError::NotFound),
            status => Err(ApiError::HttpError { status, body }),
        }
    }

    /// Build, send and parse a check in one call.
    pub fn check(
        &self,
        transport: &RawHttpClient,
        id: &str,
        point: Point,
    ) -> Result<bool, VerifyError> {
        let request = self.build_check(id, point);
        let response = transport.send(&self.host, self.port, &request.to_bytes())?;
        Ok(self.parse_check(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> VerifyClient {
        VerifyClient::new("localhost", 8888, "/captcha/postresponse")
    }

    fn response(raw: &str) -> HttpResponse {
        HttpResponse::from_raw(raw.as_bytes())
    }

    #[test]
    fn build_check_produces_form_post() {
        let req = client().build_check("2b0dd73e", Point::new(1162, 401));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/captcha/postresponse");
        assert_eq!(req.body.as_deref(), Some("cid=2b0dd73e&csol=1162%3A401"));
        assert!(req
            .headers
            .contains(&("Content-Length".to_string(), "28".to_string())));
    }

    #[test]
    fn from_config_uses_remote_section() {
        let config = RemoteConfig {
            host: "captcha.example".to_string(),
            port: 9000,
            ..RemoteConfig::default()
        };
        let c = VerifyClient::from_config(&config);
        assert_eq!(c.host(), "captcha.example");
        assert_eq!(c.port(), 9000);
        let req = c.build_check("a", Point::new(0, 0));
        assert!(req.headers.contains(&("Host".to_string(), "captcha.example".to_string())));
    }

    #[test]
    fn parse_check_pass_and_fail() {
        assert!(client().parse_check(response("HTTP/1.1 200 OK\r\n\r\nOK")).unwrap());
        assert!(!client().parse_check(response("HTTP/1.1 200 OK\r\n\r\nKO\n")).unwrap());
    }

    #[test]
    fn parse_check_not_found() {
        let err = client().parse_check(response("HTTP/1.1 404 Not Found\r\n\r\nKO")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_check_other_status() {
        let err = client()
            .parse_check(response("HTTP/1.1 500 Internal Server Error\r\n\r\nboom"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "boom"));
    }

    #[test]
    fn parse_check_unexpected_body() {
        let err = client().parse_check(response("HTTP/1.1 200 OK\r\n\r\nmaybe")).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedBody(ref b) if b == "maybe"));
    }

    #[test]
    fn parse_check_without_status_line() {
        let err = client().parse_check(response("garbage")).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(ref l) if l == "garbage"));
    }
}
