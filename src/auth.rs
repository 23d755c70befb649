//! Basic-authentication decision gate.
//!
//! A pure function of (configured credential, request header). Outcomes
//! are anonymous, authenticated, rejected, or a challenge for requests
//! that supplied no credentials at all, so well-behaved clients can retry
//! instead of being turned away. No state is retained between requests and
//! no locking is needed; the gate is safe to call from any number of
//! request handlers concurrently.

use crate::config::AppOptions;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Response header emitted alongside an unauthorized status.
pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";

/// Configured username/password pair.
///
/// Loaded once at startup and read-only afterwards; neither field is ever
/// logged or persisted by this crate.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Per-request decision, produced fresh and discarded with the request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthOutcome {
    /// No credential configured: the deployment runs in anonymous mode.
    Anonymous,
    /// Credentials matched; carries the supplied username.
    Authenticated(String),
    /// Credential required but none supplied. The caller must answer with
    /// `WWW-Authenticate` rather than a plain rejection.
    Challenge,
    Rejected(AuthRejection),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthRejection {
    /// The `Authorization` header was not a decodable Basic credential.
    MalformedHeader,
    /// Credentials decoded fine but did not match.
    InvalidCredentials,
}

impl AuthRejection {
    /// Diagnostic reason. Deliberately does not say which of username or
    /// password was wrong.
    pub fn reason(self) -> &'static str {
        match self {
            AuthRejection::MalformedHeader => "invalid authorization header",
            AuthRejection::InvalidCredentials => "invalid username or password",
        }
    }
}

/// Request gate built once from the bound options and shared across
/// handlers.
#[derive(Clone)]
pub struct AuthenticationGate {
    credential: Option<Credential>,
    realm: String,
}

impl AuthenticationGate {
    pub fn new(credential: Option<Credential>, realm: impl Into<String>) -> Self {
        Self {
            credential,
            realm: realm.into(),
        }
    }

    /// Derive the gate from the options snapshot. Both fields blank (or the
    /// section absent) means anonymous mode; that escape hatch is
    /// intentional for deployments that run without authentication.
    pub fn from_options(options: &AppOptions) -> Self {
        let auth = &options.authentication;
        let credential = if auth.is_anonymous() {
            None
        } else {
            Some(Credential {
                username: auth.username.clone(),
                password: auth.password.clone(),
            })
        };
        Self::new(credential, options.server.realm.clone())
    }

    pub fn anonymous_mode(&self) -> bool {
        self.credential.is_none()
    }

    /// Value for the [`WWW_AUTHENTICATE`] header on a challenge response.
    pub fn challenge_value(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }

    /// Decide the outcome for one request's `Authorization` header.
    pub fn evaluate(&self, authorization: Option<&str>) -> AuthOutcome {
        let Some(credential) = &self.credential else {
            // Anonymous mode accepts everything without inspecting headers.
            return AuthOutcome::Anonymous;
        };
        let Some(header) = authorization else {
            return AuthOutcome::Challenge;
        };
        let Some((username, password)) = decode_basic(header) else {
            return AuthOutcome::Rejected(AuthRejection::MalformedHeader);
        };
        // Username matches case-insensitively, password must be exact.
        if username.to_lowercase() == credential.username.to_lowercase()
            && password == credential.password
        {
            AuthOutcome::Authenticated(username)
        } else {
            AuthOutcome::Rejected(AuthRejection::InvalidCredentials)
        }
    }
}

/// Parse a `Basic <base64(username:password)>` header value.
///
/// The payload splits on the first colon only; passwords may themselves
/// contain colons.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, payload) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(payload.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", BASE64.encode(raw))
    }

    fn gate() -> AuthenticationGate {
        AuthenticationGate::new(
            Some(Credential {
                username: "alice".to_string(),
                password: "secret".to_string(),
            }),
            "Package Server",
        )
    }

    #[test]
    fn anonymous_mode_accepts_with_and_without_headers() {
        let gate = AuthenticationGate::new(None, "Package Server");
        assert_eq!(gate.evaluate(None), AuthOutcome::Anonymous);
        assert_eq!(gate.evaluate(Some("Basic garbage")), AuthOutcome::Anonymous);
        assert!(gate.anonymous_mode());
    }

    #[test]
    fn blank_configured_credentials_mean_anonymous_mode() {
        let options: AppOptions = serde_json::from_value(serde_json::json!({
            "authentication": {"username": "", "password": "  "}
        }))
        .unwrap();
        let gate = AuthenticationGate::from_options(&options);
        assert_eq!(gate.evaluate(None), AuthOutcome::Anonymous);
    }

    #[test]
    fn missing_header_challenges_rather_than_rejects() {
        assert_eq!(gate().evaluate(None), AuthOutcome::Challenge);
        assert_eq!(gate().challenge_value(), "Basic realm=\"Package Server\"");
    }

    #[test]
    fn username_is_case_insensitive_password_is_not() {
        let gate = gate();
        assert_eq!(
            gate.evaluate(Some(&basic("Alice:secret"))),
            AuthOutcome::Authenticated("Alice".to_string())
        );
        assert_eq!(
            gate.evaluate(Some(&basic("alice:Secret"))),
            AuthOutcome::Rejected(AuthRejection::InvalidCredentials)
        );
    }

    #[test]
    fn password_may_contain_colons() {
        let gate = AuthenticationGate::new(
            Some(Credential {
                username: "alice".to_string(),
                password: "se:cr:et".to_string(),
            }),
            "Package Server",
        );
        assert_eq!(
            gate.evaluate(Some(&basic("alice:se:cr:et"))),
            AuthOutcome::Authenticated("alice".to_string())
        );
    }

    #[test]
    fn undecodable_headers_are_a_header_error_not_a_credentials_error() {
        let gate = gate();
        assert_eq!(
            gate.evaluate(Some("Basic not-base64!!!")),
            AuthOutcome::Rejected(AuthRejection::MalformedHeader)
        );
        assert_eq!(
            gate.evaluate(Some("Bearer abcdef")),
            AuthOutcome::Rejected(AuthRejection::MalformedHeader)
        );
        assert_eq!(
            gate.evaluate(Some("Basic")),
            AuthOutcome::Rejected(AuthRejection::MalformedHeader)
        );
        // A decodable payload with no colon is still a header problem.
        let no_colon = format!("Basic {}", BASE64.encode("alicesecret"));
        assert_eq!(
            gate.evaluate(Some(&no_colon)),
            AuthOutcome::Rejected(AuthRejection::MalformedHeader)
        );
    }

    #[test]
    fn rejection_reasons_do_not_leak_which_field_was_wrong() {
        assert_eq!(
            AuthRejection::InvalidCredentials.reason(),
            "invalid username or password"
        );
        assert!(!AuthRejection::InvalidCredentials.reason().contains("username was"));
    }
}
