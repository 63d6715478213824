//! Binding session tokens to HTTP cookies.
//!
//! The manager only deals in token strings. This module renders the
//! `Set-Cookie` values that carry a token to the browser (and clear it
//! again on logout), and pulls the token back out of a `Cookie` request
//! header.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::SessionError;

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

impl FromStr for SameSite {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(SessionError::InvalidSameSite(s.to_string())),
        }
    }
}

/// How the session cookie is named and flagged.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name. Default: `cms_session`.
    pub name: String,
    /// Cookie path. Default: `/`.
    pub path: String,
    /// Send only over HTTPS. Default: `false` (local development).
    pub secure: bool,
    /// Default: [`SameSite::Lax`].
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "cms_session".to_string(),
            path: "/".to_string(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    /// Renders a `Set-Cookie` value carrying `token` for `max_age`.
    pub fn set_cookie(&self, token: &str, max_age: Duration) -> String {
        self.render(token, max_age.as_secs())
    }

    /// Renders a `Set-Cookie` value that deletes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    /// Extracts this cookie's value from a `Cookie` request header.
    ///
    /// Returns `None` if the cookie is missing or empty. If the header
    /// repeats the name, the first occurrence wins.
    pub fn token_from_header<'a>(&self, header: &'a str) -> Option<&'a str> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|value| !value.is_empty())
    }

    fn render(&self, value: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
            self.name, value, self.path, max_age_secs, self.same_site
        );
        // Browsers drop SameSite=None cookies that aren't Secure.
        if self.secure || self.same_site == SameSite::None {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
