//! Per-query sort hints and the execution-context hint store.
//!
//! [`SortHints`] is the contract the rewriter consumes: an insertion-ordered
//! map from field name to requested NULL placement. [`QueryHints`] models the
//! per-execution context the hints travel in — a string-keyed store of JSON
//! values with a well-known key for the null-ordering map. The rewriter only
//! ever reads the store; populating it is the caller's job, done once before
//! query execution.
//!
//! # Example
//!
//! ```
//! use sql_null_order::{NullOrdering, QueryHints, SortHints};
//!
//! let hints = SortHints::new()
//!    .nulls_last("score")
//!    .nulls_first("updated_at");
//!
//! let mut ctx = QueryHints::new();
//! ctx.set_null_ordering(&hints);
//!
//! let stored = ctx.null_ordering().unwrap();
//! assert_eq!(stored.get("score"), Some(NullOrdering::NullsLast));
//! ```

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Well-known [`QueryHints`] key under which the null-ordering field map is
/// stored for a query execution.
pub const NULL_ORDERING_HINT: &str = "null_order.fields";

/// Requested placement of NULL sort-key rows within the result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NullOrdering {
   /// Rows with NULL sort keys come before all non-NULL rows
   NullsFirst,
   /// Rows with NULL sort keys come after all non-NULL rows
   NullsLast,
}

impl NullOrdering {
   /// The SQL keyword phrase for dialects with native support.
   pub fn sql_keyword(self) -> &'static str {
      match self {
         NullOrdering::NullsFirst => "NULLS FIRST",
         NullOrdering::NullsLast => "NULLS LAST",
      }
   }
}

/// Ordered mapping from sort field name to requested NULL placement.
///
/// At most one entry per field; inserting a field again replaces its mode.
/// Iteration follows insertion order, which is also the order the rewriter
/// applies fields in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortHints {
   fields: IndexMap<String, NullOrdering>,
}

impl SortHints {
   /// Create an empty hint map.
   pub fn new() -> Self {
      Self::default()
   }

   /// Add a NULLS FIRST hint for `field`, consuming and returning the map.
   pub fn nulls_first(mut self, field: impl Into<String>) -> Self {
      self.fields.insert(field.into(), NullOrdering::NullsFirst);
      self
   }

   /// Add a NULLS LAST hint for `field`, consuming and returning the map.
   pub fn nulls_last(mut self, field: impl Into<String>) -> Self {
      self.fields.insert(field.into(), NullOrdering::NullsLast);
      self
   }

   /// Add or replace a hint for `field`.
   pub fn insert(&mut self, field: impl Into<String>, ordering: NullOrdering) {
      self.fields.insert(field.into(), ordering);
   }

   /// Look up the requested placement for `field`.
   pub fn get(&self, field: &str) -> Option<NullOrdering> {
      self.fields.get(field).copied()
   }

   /// Whether the map contains no hints.
   pub fn is_empty(&self) -> bool {
      self.fields.is_empty()
   }

   /// Number of hinted fields.
   pub fn len(&self) -> usize {
      self.fields.len()
   }

   /// Iterate hints in insertion order.
   pub fn iter(&self) -> impl Iterator<Item = (&str, NullOrdering)> {
      self.fields.iter().map(|(field, ordering)| (field.as_str(), *ordering))
   }
}

/// Per-query-execution hint store.
///
/// A string-keyed map of JSON hint values, read by query post-processors and
/// written by whoever sets the query up. Keys are namespaced by convention
/// (`"null_order.fields"`); unrelated hints coexist without collision.
#[derive(Debug, Clone, Default)]
pub struct QueryHints {
   values: IndexMap<String, JsonValue>,
}

impl QueryHints {
   /// Create an empty hint store.
   pub fn new() -> Self {
      Self::default()
   }

   /// Store a raw JSON hint value under `key`, replacing any previous value.
   pub fn set(&mut self, key: impl Into<String>, value: JsonValue) {
      self.values.insert(key.into(), value);
   }

   /// Read the hint under `key`, deserialized to `T`.
   ///
   /// Returns `None` when the key is absent or the stored value does not
   /// deserialize to `T` — an unusable hint and a missing one are treated
   /// the same by consumers.
   pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
      let value = self.values.get(key)?;
      serde_json::from_value(value.clone()).ok()
   }

   /// Whether a hint is stored under `key`.
   pub fn contains(&self, key: &str) -> bool {
      self.values.contains_key(key)
   }

   /// Store the null-ordering field map under [`NULL_ORDERING_HINT`].
   pub fn set_null_ordering(&mut self, fields: &SortHints) {
      let value = serde_json::to_value(fields)
         .expect("a map of strings always serializes to a JSON object");
      self.set(NULL_ORDERING_HINT, value);
   }

   /// Read the null-ordering field map stored under [`NULL_ORDERING_HINT`].
   pub fn null_ordering(&self) -> Option<SortHints> {
      self.get(NULL_ORDERING_HINT)
   }
}
