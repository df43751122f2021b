//! Relay engine and the process-scoped state it works alongside

/// Shared-secret check for admin routes.
pub mod gate;
/// Open/closed voting state.
pub mod mode;
/// Ordered strategy fallback for a single vote.
pub mod relay;
/// Endpoint templates and payload encodings.
pub mod strategy;
/// Advisory local vote counters.
pub mod tally;
/// HTTP client seam towards the poll-hosting service.
pub mod upstream;
