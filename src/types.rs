//! Shared type aliases used across pipeline stages.

/// Raw, untyped review record as decoded from the input stream.
pub type RawRecord = serde_json::Value;

/// A single normalized text token.
pub type Token = String;

/// Unix timestamp key used for partitioning.
pub type UnixTime = i64;
