//! Error types for copulas-rs.

use thiserror::Error;

use crate::bivariate::CopulaType;

/// Crate error type.
///
/// Every variant signals a contract violation by the caller or corrupted
/// persisted state, never a transient condition.
#[derive(Error, Debug)]
pub enum CopulaError {
  /// Unknown copula family identifier.
  #[error("invalid copula type: {0}")]
  InvalidFamily(String),

  /// Theta outside the family's valid interval or inside its excluded set.
  #[error("the computed theta value {theta} is out of limits for the given {family} copula")]
  InvalidParameter { family: CopulaType, theta: f64 },

  /// Distribution, density or inverse query on a model with no fitted theta.
  #[error("this model is not fitted")]
  NotFitted,

  /// Inconsistent model state, e.g. tau outside [-1, 1] at sampling time.
  #[error("invalid model state: {0}")]
  InvalidState(String),

  /// Malformed observation batch or data the family cannot represent.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Record (de)serialization error.
  #[error("record error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, CopulaError>;
