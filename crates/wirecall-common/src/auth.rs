//! Basic-Authentication credentials for RPC connections.
//!
//! Authentication is optional and configured per connection. When a user is
//! set, every request carries an `Authorization: Basic` header built from
//! `user:password` — or `user:` with an empty password segment when no
//! password is configured, matching the historical header form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Credentials attached to a connection's requests.
///
/// # Example
///
/// ```
/// use wirecall_common::auth::Credentials;
///
/// let creds = Credentials::new("admin", "hunter2");
/// assert_eq!(creds.user(), "admin");
/// assert!(creds.authorization().starts_with("Basic "));
/// ```
#[derive(Clone, Debug)]
pub struct Credentials {
    user: String,
    password: Option<String>,
}

impl Credentials {
    /// Creates credentials with a user and password.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            user: user.into(),
            password: Some(password.into()),
        }
    }

    /// Creates credentials with a user and no password.
    ///
    /// The header value encodes `user:` with an empty password segment.
    pub fn user_only(user: impl Into<String>) -> Self {
        Credentials {
            user: user.into(),
            password: None,
        }
    }

    /// The configured user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The `Authorization` header value for these credentials.
    pub fn authorization(&self) -> String {
        let raw = match &self.password {
            Some(password) => format!("{}:{}", self.user, password),
            None => format!("{}:", self.user),
        };
        format!("Basic {}", STANDARD.encode(raw))
    }
}
