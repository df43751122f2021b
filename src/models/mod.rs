//! Data types exchanged between the HTTP surface and the relay core

/// Relay results and the per-strategy attempt trace.
pub mod outcome;
/// Vote items and request-body normalization.
pub mod vote;
