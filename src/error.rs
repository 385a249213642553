/// Result type alias for rewrite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for null-ordering rewrite operations.
///
/// Both rewrite failures are fatal to the whole call: hints are applied as a
/// chain, so a failure discards any rewrites already performed. Callers must
/// not execute the unmodified SQL as if it implemented the requested NULL
/// ordering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The supplied platform name matches none of the known dialect families.
   /// This is a configuration error, not a per-query condition.
   #[error("null ordering is not implemented for platform '{0}'")]
   UnsupportedPlatform(String),

   /// The sort-inversion strategy found the field in the ORDER BY clause but
   /// could not read an ASC/DESC token to invert.
   #[error("cannot invert sort for field '{field}': expected ASC or DESC, found '{matched}'")]
   InvalidSortDirection { field: String, matched: String },

   /// A hinted field name fails the identifier charset check.
   ///
   /// Field names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `alias.column`).
   #[error("invalid sort field name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidFieldName { name: String },
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::UnsupportedPlatform(_) => "UNSUPPORTED_PLATFORM".to_string(),
         Error::InvalidSortDirection { .. } => "INVALID_SORT_DIRECTION".to_string(),
         Error::InvalidFieldName { .. } => "INVALID_FIELD_NAME".to_string(),
      }
   }
}
