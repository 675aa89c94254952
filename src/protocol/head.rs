//! Parsed message heads.

use http::{Method, StatusCode};

use crate::protocol::{Fields, ParseError};

/// HTTP protocol versions understood by the framing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }

    /// Validates a start-line protocol token.
    ///
    /// Anything other than the two supported versions terminates the
    /// connection with [`ParseError::UnsupportedProtocol`]; the flag tells
    /// a collaborator whether the token still looked like HTTP (so it may
    /// hand the connection to another protocol handler) or was garbage.
    pub(crate) fn parse_token(token: &str) -> Result<Version, ParseError> {
        match token {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(ParseError::unsupported_protocol(token, looks_http_ish(token))),
        }
    }
}

/// True for tokens of the shape `HTTP/<digits>.<digits>`.
fn looks_http_ish(token: &str) -> bool {
    let rest = match token.strip_prefix("HTTP/") {
        Some(rest) => rest,
        None => return false,
    };
    match rest.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// A parsed request line plus the normalized field map.
///
/// Besides the wire headers, the field map carries the synthetic
/// environment entries `REQUEST_METHOD`, `REQUEST_URI` and
/// `SERVER_PROTOCOL`.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    uri: String,
    version: Version,
    fields: Fields,
}

impl RequestHead {
    pub(crate) fn new(method: Method, uri: String, version: Version, fields: Fields) -> Self {
        Self { method, uri, version, fields }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Looks up a field by its environment name, e.g. `HTTP_USER_AGENT`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }
}

/// A parsed status line plus the normalized field map.
///
/// The field map carries the synthetic entries
/// [`x-server-protocol`](crate::protocol::SERVER_PROTOCOL_FIELD) and
/// [`x-server-status-message`](crate::protocol::SERVER_STATUS_MESSAGE_FIELD).
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    reason: String,
    version: Version,
    fields: Fields,
}

impl ResponseHead {
    pub(crate) fn new(status: StatusCode, reason: String, version: Version, fields: Fields) -> Self {
        Self { status, reason, version, fields }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Looks up a field by its lowercased name, e.g. `content-type`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_versions_parse() {
        assert_eq!(Version::parse_token("HTTP/1.0").unwrap(), Version::Http10);
        assert_eq!(Version::parse_token("HTTP/1.1").unwrap(), Version::Http11);
        assert_eq!(Version::Http11.as_str(), "HTTP/1.1");
    }

    #[test]
    fn other_http_versions_look_http_ish() {
        let err = Version::parse_token("HTTP/2.0").unwrap_err();
        assert_eq!(err.looks_http_ish(), Some(true));

        let err = Version::parse_token("HTTP/0.9").unwrap_err();
        assert_eq!(err.looks_http_ish(), Some(true));
    }

    #[test]
    fn garbage_tokens_do_not_look_http_ish() {
        for token in ["ICY", "HTTP/", "HTTP/1", "HTTP/1.", "HTTP/x.1", "http/1.1", ""] {
            let err = Version::parse_token(token).unwrap_err();
            assert_eq!(err.looks_http_ish(), Some(false), "token: {token:?}");
        }
    }
}
