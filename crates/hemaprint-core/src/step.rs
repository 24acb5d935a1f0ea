//! Screening steps and their page paths

use std::fmt;

/// A page of the screening flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Consent capture
    Consent,
    /// Personal-information questionnaire
    PersonalInfo,
    /// Fingerprint capture and submission
    Fingerprint,
    /// Results view
    Results,
}

impl Step {
    /// Every step in flow order
    pub const ALL: [Step; 4] = [
        Step::Consent,
        Step::PersonalInfo,
        Step::Fingerprint,
        Step::Results,
    ];

    /// Page path
    #[inline]
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Consent => "/consent",
            Self::PersonalInfo => "/personal-info",
            Self::Fingerprint => "/fingerprint_analysis",
            Self::Results => hemaprint_session::navigation::RESULTS_PATH,
        }
    }

    /// Step served at `path`, ignoring a trailing slash
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Self::ALL.into_iter().find(|s| s.path() == trimmed)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
