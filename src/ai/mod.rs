//! AI module for SoccerX
//!
//! This module resolves chat messages against the Gemini API. Provider model
//! names churn, so instead of calling one hardcoded model it walks a cascade
//! of (mechanism, API version, model) attempts and classifies each failure.
//!
//! # Architecture
//!
//! - `candidates` - Model catalog and candidate ordering
//! - `outcome` - Classification of one attempt
//! - `backend` - Traits the cascade iterates over
//! - `gemini` - Direct REST mechanism and model discovery
//! - `sdk` - Secondary mechanism through the Rig Gemini client
//! - `cascade` - The resolution loop
//! - `session` - In-memory chat transcript on top of the cascade
//!
//! # Usage
//!
//! ```rust,no_run
//! use soccerx::ai::{
//!     CompletionBackend, GeminiRestBackend, ModelCascade, ModelCatalog, RigGeminiBackend,
//! };
//!
//! # async fn example() -> Result<(), soccerx::ai::ChatError> {
//! let key = "my-key";
//! let mechanisms: Vec<Box<dyn CompletionBackend>> = vec![
//!     Box::new(GeminiRestBackend::new(key)),
//!     Box::new(RigGeminiBackend::new(key)),
//! ];
//! let cascade = ModelCascade::new(
//!     Box::new(GeminiRestBackend::new(key)),
//!     mechanisms,
//!     ModelCatalog::default(),
//! );
//! let reply = cascade.resolve("Who plays tonight?", &[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod candidates;
pub mod cascade;
pub mod error;
pub mod gemini;
pub mod outcome;
pub mod prompt;
pub mod sdk;
pub mod session;

// Re-export main types
pub use backend::{CompletionBackend, ModelSource, NoDiscovery};
pub use candidates::{ApiVersion, ModelCandidate, ModelCatalog};
pub use cascade::ModelCascade;
pub use error::{ChatError, ChatResult, DiscoveryError};
pub use gemini::GeminiRestBackend;
pub use outcome::CallOutcome;
pub use sdk::RigGeminiBackend;
pub use session::ChatSession;
