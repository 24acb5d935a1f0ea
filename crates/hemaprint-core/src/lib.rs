//! Hemaprint Core
//!
//! The screening workflow that ties the other crates together, plus the
//! configuration and server plumbing behind the `hemaprint` binary.
//!
//! # Architecture
//!
//! ```text
//!                      ┌─────────────────────────┐
//!                      │   ScreeningWorkflow<C>  │
//!                      └───┬───────────────┬─────┘
//!                          │               │
//!              ┌───────────▼──┐      ┌─────▼──────────────┐
//!              │SessionContext│      │ C: PredictionClient│
//!              │ drafts       │      │ (HTTP or scripted) │
//!              │ handoff      │      └────────────────────┘
//!              └──────┬───────┘
//!                     │
//!              ┌──────▼───────┐
//!              │EphemeralStore│ ── memory / file backend
//!              └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hemaprint_client::{ClientConfig, HttpPredictionClient};
//! use hemaprint_core::{ScreeningConfig, server};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScreeningConfig::resolve(None)?;
//! let client = Arc::new(HttpPredictionClient::new(&config.api)?);
//! let workflow = server::open_workflow(&config, client)?;
//!
//! workflow.update_field("age", 30);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod server;
pub mod step;
pub mod workflow;

// Re-exports for convenience
pub use config::{
    ScreeningConfig, ServerConfig, StorageConfig, StorageKind, CONFIG_ENV, DEFAULT_PUBLIC_URL,
};
pub use error::{ConfigError, ConfigResult, ScreeningError, ScreeningResult};
pub use step::Step;
pub use workflow::{ResultsView, ScreeningWorkflow};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the screening flow
    pub use crate::{
        ResultsView, ScreeningConfig, ScreeningError, ScreeningResult, ScreeningWorkflow, Step,
    };
    pub use hemaprint_client::{PredictionClient, Submission};
    pub use hemaprint_model::{FingerName, FingerprintImage, FingerprintSet, ResultBundle};
    pub use hemaprint_session::{NavigationTarget, SessionConfig, SessionContext};
}
