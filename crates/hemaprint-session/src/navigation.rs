//! Navigation targets (path plus query string)
//!
//! The results address carries the token as `s=<token>`; older links used
//! `sid`. Both are stripped once the results view has read them.

use crate::token::SessionToken;
use std::fmt;
use url::form_urlencoded;

/// Path of the results view
pub const RESULTS_PATH: &str = "/result";

/// Query parameter carrying the session token
pub const TOKEN_PARAM: &str = "s";

/// Older name of [`TOKEN_PARAM`], still honored on input
pub const LEGACY_TOKEN_PARAM: &str = "sid";

/// A page address: path plus ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTarget {
    path: String,
    query: Vec<(String, String)>,
}

impl NavigationTarget {
    /// Target with no query
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parse `path?query`; a fragment is discarded
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let without_fragment = raw.split('#').next().unwrap_or_default();
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Results view for `token`: `/result?s=<token>`
    #[must_use]
    pub fn results(token: &SessionToken) -> Self {
        Self::new(RESULTS_PATH).with_query(TOKEN_PARAM, token.as_str())
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Path component
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every occurrence of a parameter, returning the first value
    pub fn remove_query(&mut self, name: &str) -> Option<String> {
        let first = self.query(name).map(str::to_string);
        self.query.retain(|(k, _)| k != name);
        first
    }

    /// Token carried by the target, `sid` taking precedence over `s`
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.query(LEGACY_TOKEN_PARAM)
            .or_else(|| self.query(TOKEN_PARAM))
            .filter(|t| !t.is_empty())
    }

    /// Remove the token parameters, returning the token that was carried
    pub fn strip_session_token(&mut self) -> Option<String> {
        let token = self.session_token().map(str::to_string);
        self.remove_query(LEGACY_TOKEN_PARAM);
        self.remove_query(TOKEN_PARAM);
        token
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{encoded}")?;
        }
        Ok(())
    }
}
