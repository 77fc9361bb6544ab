//! Fixed user-facing reply strings.
//!
//! The relay only ever answers with completion text or one of these
//! constants; backend error detail stays in the logs.

/// Transient indicator sent while a completion is in flight.
pub const WORKING: &str = "⏳ Working on it...";

/// The completion call exceeded its bounded wait.
pub const COMPLETION_TIMED_OUT: &str = "⚠️ The reply took too long. Please try again.";

/// The backend was unreachable or answered with a non-success status.
pub const SERVICE_UNAVAILABLE: &str = "⚠️ Sorry, the service has a temporary problem.";

/// The backend answered, but no usable reply could be read from it.
pub const NO_ANSWER: &str = "⚠️ I could not come up with a reply, please try again.";

/// Last-resort apology when the pipeline itself fails.
pub const PIPELINE_APOLOGY: &str = "❌ Sorry, something went wrong while processing.";
