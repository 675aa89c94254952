//! Parsing roles.
//!
//! The same framing machinery serves both ends of a connection; the role
//! decides how field names are normalized and which error kind a framing
//! problem maps to.

use crate::protocol::ParseError;

/// Synthetic client-side field carrying the peer's protocol token.
pub const SERVER_PROTOCOL_FIELD: &str = "x-server-protocol";

/// Synthetic client-side field carrying the status line's reason phrase.
pub const SERVER_STATUS_MESSAGE_FIELD: &str = "x-server-status-message";

/// Which side of the connection a parser serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Parses requests; fields normalize to the environment form.
    Server,
    /// Parses responses; fields normalize to lowercase.
    Client,
}

impl Role {
    /// Normalizes a raw field name for this role.
    ///
    /// The server form is the CGI-style environment name: uppercase with
    /// dashes mapped to underscores and an `HTTP_` prefix, except for
    /// `Content-Length` and `Content-Type` which stay bare.
    pub fn normalize_field_name(&self, raw: &str) -> String {
        match self {
            Role::Server => {
                if raw.eq_ignore_ascii_case("content-length") {
                    "CONTENT_LENGTH".to_owned()
                } else if raw.eq_ignore_ascii_case("content-type") {
                    "CONTENT_TYPE".to_owned()
                } else {
                    let mut name = String::with_capacity(raw.len() + 5);
                    name.push_str("HTTP_");
                    for c in raw.chars() {
                        name.push(if c == '-' { '_' } else { c.to_ascii_uppercase() });
                    }
                    name
                }
            }
            Role::Client => raw.to_ascii_lowercase(),
        }
    }

    /// Builds the malformed-framing error for this role.
    pub(crate) fn bad_message<S: ToString>(&self, reason: S) -> ParseError {
        match self {
            Role::Server => ParseError::bad_request(reason),
            Role::Client => ParseError::bad_response(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_names_use_the_environment_form() {
        let role = Role::Server;
        assert_eq!(role.normalize_field_name("User-Agent"), "HTTP_USER_AGENT");
        assert_eq!(role.normalize_field_name("x-checksum"), "HTTP_X_CHECKSUM");
        assert_eq!(role.normalize_field_name("Content-Length"), "CONTENT_LENGTH");
        assert_eq!(role.normalize_field_name("content-type"), "CONTENT_TYPE");
    }

    #[test]
    fn client_names_are_lowercased() {
        let role = Role::Client;
        assert_eq!(role.normalize_field_name("Content-Type"), "content-type");
        assert_eq!(role.normalize_field_name("X-Checksum"), "x-checksum");
    }

    #[test]
    fn bad_message_tracks_the_role() {
        assert!(matches!(Role::Server.bad_message("x"), ParseError::BadRequest { .. }));
        assert!(matches!(Role::Client.bad_message("x"), ParseError::BadResponse { .. }));
    }
}
