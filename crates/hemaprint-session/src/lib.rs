//! Hemaprint Session Layer
//!
//! Cross-page state for one browsing session, built on the ephemeral store:
//!
//! - **Drafts**: the in-progress questionnaire, saved on every edit
//! - **Handoff**: a finished [`ResultBundle`](hemaprint_model::ResultBundle)
//!   stored under an opaque token, so the results address carries only the
//!   token and never the payload
//! - **Context**: one explicit object owning the store and both views,
//!   sweeping stale tokens when it opens
//!
//! # Architecture
//!
//! ```text
//!  questionnaire ──save/load/clear──→ DraftStore ─┐
//!                                                 ├─→ EphemeralStore ─→ KvBackend
//!  submission ──publish──→ ResultHandoff ─────────┘
//!      │                       ↑
//!      └── /result?s=<token> ──┘ resolve (token → current → fallback)
//! ```
//!
//! # Example
//!
//! ```rust
//! use hemaprint_model::ResultBundle;
//! use hemaprint_session::{SessionConfig, SessionContext};
//!
//! let ctx = SessionContext::in_memory(SessionConfig::default());
//! let handoff = ctx.handoff();
//!
//! let token = handoff.publish(&ResultBundle::default()).unwrap();
//! let mut target = handoff.results_target(&token);
//!
//! assert!(handoff.resolve(&mut target).is_some());
//! assert_eq!(target.to_string(), "/result");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod draft;
pub mod error;
pub mod handoff;
pub mod keys;
pub mod navigation;
pub mod token;

// Re-exports for convenience
pub use config::SessionConfig;
pub use context::SessionContext;
pub use draft::{DraftStore, FormDraft};
pub use error::{SessionError, SessionResult};
pub use handoff::{Resolved, ResolvedFrom, ResultHandoff};
pub use navigation::NavigationTarget;
pub use token::SessionToken;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with session state
    pub use crate::{
        DraftStore, FormDraft, NavigationTarget, ResultHandoff, SessionConfig, SessionContext,
        SessionToken,
    };
}
