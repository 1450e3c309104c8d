//! Request routing over the resource registry.
//!
//! The router consumes an already-classified [`Intent`] (intent
//! classification itself is out of scope) plus the original request
//! text, walks the ranked candidate namespaces in order, checks each
//! one's availability and declared dependencies, builds the effective
//! prompt from the resource's prompt sections, and dispatches through
//! the backend orchestrator. Per-candidate outcomes are recorded as a
//! [`RouterDecision`] and fed to the event log.

pub mod intent;
pub mod router;

pub use intent::Complexity;
pub use intent::Intent;
pub use intent::IntentMode;
pub use router::CandidateFeedback;
pub use router::CandidateOutcome;
pub use router::ExecutionRouter;
pub use router::RouterDecision;
pub use router::SkipReason;
