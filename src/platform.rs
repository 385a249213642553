//! Database platform identification and strategy selection.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The database dialect families the rewriter knows how to target.
///
/// The set is closed on purpose: each variant maps to exactly one rewriting
/// strategy, and an unknown platform name is a configuration error rather
/// than something to guess a strategy for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
   /// MySQL family — no native NULLS FIRST/LAST syntax
   MySql,
   /// Oracle — native `NULLS FIRST` / `NULLS LAST` support
   Oracle,
   /// PostgreSQL — native `NULLS FIRST` / `NULLS LAST` support
   PostgreSql,
}

/// How a platform's `ORDER BY` segments get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RewriteStrategy {
   /// Negate the sort key and flip the direction (NULLS LAST emulation)
   SortInversion,
   /// Append the literal NULLS FIRST/LAST phrase after the direction
   ExplicitClause,
}

impl Platform {
   /// Resolve a platform from its canonical dialect name.
   ///
   /// Recognized names are `mysql`, `oracle`, and `postgresql` — the names a
   /// connection layer reports for its active dialect. Anything else fails
   /// with [`Error::UnsupportedPlatform`] carrying the offending identifier.
   pub fn from_name(name: &str) -> Result<Self> {
      match name {
         "mysql" => Ok(Platform::MySql),
         "oracle" => Ok(Platform::Oracle),
         "postgresql" => Ok(Platform::PostgreSql),
         other => Err(Error::UnsupportedPlatform(other.to_string())),
      }
   }

   /// The canonical dialect name.
   pub fn name(self) -> &'static str {
      match self {
         Platform::MySql => "mysql",
         Platform::Oracle => "oracle",
         Platform::PostgreSql => "postgresql",
      }
   }

   pub(crate) fn strategy(self) -> RewriteStrategy {
      match self {
         Platform::MySql => RewriteStrategy::SortInversion,
         Platform::Oracle | Platform::PostgreSql => RewriteStrategy::ExplicitClause,
      }
   }
}

impl std::fmt::Display for Platform {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.write_str(self.name())
   }
}
