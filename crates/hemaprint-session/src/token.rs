//! Opaque session tokens
//!
//! A token is a lookup key, not a credential: `session_` followed by eleven
//! random base-36 characters and the base-36 creation time in milliseconds.

use crate::error::SessionError;
use crate::keys::TOKEN_PREFIX;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RANDOM_LEN: usize = 11;
const MAX_BODY_LEN: usize = 48;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Token naming one published result bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token stamped with `now_millis`
    #[must_use]
    pub fn generate(now_millis: i64) -> Self {
        let mut rng = rand::rng();
        let mut token = String::with_capacity(TOKEN_PREFIX.len() + RANDOM_LEN + 9);
        token.push_str(TOKEN_PREFIX);
        for _ in 0..RANDOM_LEN {
            token.push(char::from(BASE36[rng.random_range(0..BASE36.len())]));
        }
        token.push_str(&to_base36(now_millis.unsigned_abs()));
        Self(token)
    }

    /// Validate an incoming token
    ///
    /// # Errors
    /// Returns [`SessionError::MalformedToken`] unless the input is the
    /// prefix followed by 1–48 lowercase alphanumerics
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        let well_formed = raw.strip_prefix(TOKEN_PREFIX).is_some_and(|body| {
            !body.is_empty()
                && body.len() <= MAX_BODY_LEN
                && body
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        });

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(SessionError::MalformedToken(raw.to_string()))
        }
    }

    /// Token text, which is also its storage key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionToken {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn generated_tokens_parse() {
        let token = SessionToken::generate(1_700_000_000_000);
        assert!(token.as_str().starts_with("session_"));
        assert_eq!(SessionToken::parse(token.as_str()).unwrap(), token);
    }

    #[test]
    fn time_suffix_is_base36_millis() {
        let token = SessionToken::generate(36 * 36);
        assert!(token.as_str().ends_with("100"));
        assert_eq!(to_base36(0), "0");
    }

    #[test]
    fn generated_tokens_are_unique() {
        let tokens: HashSet<_> = (0..1_000).map(|_| SessionToken::generate(42)).collect();
        assert_eq!(tokens.len(), 1_000);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for raw in [
            "",
            "session_",
            "abc123",
            "session_ABC",
            "session_a/b",
            "session_a b",
            "health_results_data",
        ] {
            assert!(SessionToken::parse(raw).is_err(), "accepted {raw:?}");
        }

        let too_long = format!("session_{}", "a".repeat(49));
        assert!(SessionToken::parse(&too_long).is_err());
    }

    #[test]
    fn serde_validates() {
        let ok: SessionToken = serde_json::from_str(r#""session_abc""#).unwrap();
        assert_eq!(ok.as_str(), "session_abc");
        assert!(serde_json::from_str::<SessionToken>(r#""nope""#).is_err());
    }

    proptest! {
        #[test]
        fn generation_always_parses(now in any::<i64>()) {
            let token = SessionToken::generate(now);
            prop_assert!(SessionToken::parse(token.as_str()).is_ok());
        }
    }
}
