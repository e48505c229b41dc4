//! Parsing error types

use thiserror::Error;

/// Errors produced by identifier-pattern parsing.
///
/// Only pattern extraction fails typed-ly. Resolution and status
/// classification never error: malformed device text yields empty results or
/// the documented default classification instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PnpError {
    /// The pattern carries no 4-hex-digit `VID_xxxx` token
    #[error("no VID_xxxx token in pattern: {0:?}")]
    MissingVendorId(String),

    /// The pattern carries no 4-hex-digit `PID_xxxx` token after the vendor token
    #[error("no PID_xxxx token in pattern: {0:?}")]
    MissingProductId(String),
}
