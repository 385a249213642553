//! Null-ordering rewrite strategies over generated SQL text.
//!
//! Takes a complete SQL statement as produced by a query compiler, the
//! per-field [`SortHints`], and the target [`Platform`], and rewrites the
//! statement's top-level `ORDER BY` clause so rows with NULL sort keys land
//! where the hints ask. Everything outside that clause passes through
//! untouched.
//!
//! # How It Works
//!
//! The top-level `ORDER BY` keyword is located with a scanner that tracks
//! parenthesis depth and skips string literals, quoted identifiers, and
//! comments, so `ORDER BY` text inside subqueries or literals is never
//! rewritten. Each hinted field is then applied in insertion order with an
//! anchored pattern built from the validated, escaped field name:
//!
//! - **Sort inversion** (MySQL): the dialect has no NULLS FIRST/LAST syntax
//!   and sorts NULLs first under ascending order. NULLS FIRST is therefore a
//!   no-op; NULLS LAST negates the sort key and flips the direction, which
//!   moves NULLs (negation of NULL is NULL) to the tail. Rewrites the first
//!   matching segment only.
//! - **Explicit clause** (Oracle, PostgreSQL): appends the literal
//!   `NULLS FIRST` / `NULLS LAST` phrase after the direction token of every
//!   matching segment, preserving the direction.
//!
//! Hints are chained: each field's rewrite re-scans the output of the
//! previous one. Re-applying a sort-inversion rewrite to its own output is
//! not idempotent (the direction has already been flipped), so callers invoke
//! the rewriter exactly once per query execution.
//!
//! # Example
//!
//! ```
//! use sql_null_order::{Platform, SortHints, rewrite_null_ordering};
//!
//! let hints = SortHints::new().nulls_last("score");
//!
//! let sql = rewrite_null_ordering(
//!    "SELECT id, score FROM posts ORDER BY score ASC",
//!    &hints,
//!    Platform::PostgreSql,
//! )?;
//! assert_eq!(sql, "SELECT id, score FROM posts ORDER BY score ASC NULLS LAST");
//!
//! let sql = rewrite_null_ordering(
//!    "SELECT id, score FROM posts ORDER BY score ASC",
//!    &hints,
//!    Platform::MySql,
//! )?;
//! assert_eq!(sql, "SELECT id, score FROM posts ORDER BY -score DESC");
//! # Ok::<(), sql_null_order::Error>(())
//! ```

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{Error, Result};
use crate::hints::{NullOrdering, QueryHints, SortHints};
use crate::platform::{Platform, RewriteStrategy};

/// Rewrite the top-level `ORDER BY` clause of `sql` per the hinted NULL
/// placements, using the strategy `platform` requires.
///
/// No-op paths (the input is returned unchanged, not an error): empty hints,
/// no top-level `ORDER BY` clause, or hinted fields that do not appear in the
/// clause.
///
/// Fails with [`Error::InvalidFieldName`] when a hinted field fails the
/// identifier check, and with [`Error::InvalidSortDirection`] when the
/// sort-inversion strategy finds a field segment without a recognizable
/// `ASC`/`DESC` token. A failure discards the whole call — no partially
/// rewritten SQL is ever returned.
pub fn rewrite_null_ordering(sql: &str, hints: &SortHints, platform: Platform) -> Result<String> {
   if hints.is_empty() {
      return Ok(sql.to_string());
   }

   // Validate all field names before any of them reaches a rewrite pattern
   for (field, _) in hints.iter() {
      validate_field_name(field)?;
   }

   debug!(platform = %platform, fields = hints.len(), "rewriting ORDER BY null placement");

   let mut rewritten = sql.to_string();
   for (field, ordering) in hints.iter() {
      rewritten = match platform.strategy() {
         RewriteStrategy::SortInversion => match ordering {
            // Ascending order already sorts NULLs first under this dialect's
            // default collation; only NULLS LAST needs the inversion trick.
            NullOrdering::NullsFirst => rewritten,
            NullOrdering::NullsLast => invert_sort(&rewritten, field)?,
         },
         RewriteStrategy::ExplicitClause => append_nulls_keyword(&rewritten, field, ordering),
      };
   }

   Ok(rewritten)
}

/// Execution-layer entry point: resolve the platform name, read the
/// null-ordering map from the query's hint store, and rewrite.
///
/// An unknown platform name fails with [`Error::UnsupportedPlatform`] before
/// the hint store is consulted — a misconfigured connection is an error even
/// when no hints are set. With no null-ordering hint stored, the input is
/// returned unchanged.
pub fn rewrite_query(sql: &str, hints: &QueryHints, platform_name: &str) -> Result<String> {
   let platform = Platform::from_name(platform_name)?;

   let Some(fields) = hints.null_ordering() else {
      return Ok(sql.to_string());
   };

   rewrite_null_ordering(sql, &fields, platform)
}

/// Validate that a hinted field name is safe for pattern interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain
/// column names, qualified names (e.g., `alias.column`), and underscored
/// identifiers. The name is additionally regex-escaped when interpolated, so
/// this check enforces identifier discipline rather than pattern safety.
fn validate_field_name(name: &str) -> Result<()> {
   if name.is_empty() {
      return Err(Error::InvalidFieldName {
         name: name.to_string(),
      });
   }

   let mut chars = name.chars();
   let first = chars.next().unwrap();
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(Error::InvalidFieldName {
         name: name.to_string(),
      });
   }

   for ch in chars {
      if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
         return Err(Error::InvalidFieldName {
            name: name.to_string(),
         });
      }
   }

   Ok(())
}

/// Check whether `keyword` appears as a standalone keyword at position `i`
/// in the uppercased byte slice `bytes` (length `len`).
///
/// "Standalone" means the character before and after the keyword (if present)
/// is not an identifier character (`[A-Z0-9_]`).
fn is_keyword_at(bytes: &[u8], len: usize, i: usize, keyword: &[u8]) -> bool {
   let klen = keyword.len();
   if i + klen > len {
      return false;
   }
   if &bytes[i..i + klen] != keyword {
      return false;
   }
   let before_ok = i == 0 || (!bytes[i - 1].is_ascii_alphanumeric() && bytes[i - 1] != b'_');
   let after_ok =
      i + klen >= len || (!bytes[i + klen].is_ascii_alphanumeric() && bytes[i + klen] != b'_');

   before_ok && after_ok
}

/// Advance the scanner index past a quoted literal or identifier.
///
/// `quote` is the opening quote character (`'` or `"`). The scanner handles
/// SQL-standard doubled-quote escaping (`''` or `""`).
fn skip_quoted(bytes: &[u8], len: usize, i: usize, quote: u8) -> usize {
   let mut j = i + 1;
   while j < len {
      if bytes[j] == quote {
         // Doubled quote is an escape — skip both and continue
         if j + 1 < len && bytes[j + 1] == quote {
            j += 2;
            continue;
         }
         // End of quoted section
         return j;
      }
      j += 1;
   }
   j // unterminated — return end
}

/// Advance the scanner index past a `--` line comment (until newline or end).
fn skip_line_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2; // skip the `--`
   while j < len && bytes[j] != b'\n' {
      j += 1;
   }
   j
}

/// Advance the scanner index past a `/* … */` block comment.
fn skip_block_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2; // skip the `/*`
   while j + 1 < len {
      if bytes[j] == b'*' && bytes[j + 1] == b'/' {
         return j + 1; // position of the closing `/`
      }
      j += 1;
   }
   len.saturating_sub(1) // unterminated — return end
}

/// Check for the two-word `ORDER BY` keyword (any amount of whitespace
/// between the words) starting at position `i`. Returns the byte offset just
/// past `BY` — where the sort list begins — or `None`.
fn order_by_at(bytes: &[u8], len: usize, i: usize) -> Option<usize> {
   if !is_keyword_at(bytes, len, i, b"ORDER") {
      return None;
   }
   let mut j = i + 5;
   let whitespace_start = j;
   while j < len && bytes[j].is_ascii_whitespace() {
      j += 1;
   }
   if j == whitespace_start {
      return None;
   }
   if !is_keyword_at(bytes, len, j, b"BY") {
      return None;
   }
   Some(j + 2)
}

/// Locate the statement's top-level `ORDER BY` clause.
///
/// Scans at parenthesis depth 0, outside string literals, quoted identifiers,
/// and comments, so the keyword inside a subquery, a literal, or a comment is
/// never taken for the statement's own clause. Returns the byte offset of the
/// sort list (just past `BY`), or `None` when the statement has no top-level
/// clause.
///
/// The scan runs over an ASCII-uppercased copy, which preserves byte offsets
/// for the original text.
fn find_sort_list(sql: &str) -> Option<usize> {
   let upper = sql.to_ascii_uppercase();
   let bytes = upper.as_bytes();
   let len = bytes.len();
   let mut depth: i32 = 0;
   let mut i = 0;

   while i < len {
      match bytes[i] {
         b'(' => depth += 1,
         b')' => depth -= 1,
         // Single-quoted string literal (with '' escape handling)
         b'\'' => {
            i = skip_quoted(bytes, len, i, b'\'');
         }
         // Double-quoted identifier (with "" escape handling)
         b'"' => {
            i = skip_quoted(bytes, len, i, b'"');
         }
         // Line comment: --
         b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
            i = skip_line_comment(bytes, len, i);
         }
         // Block comment: /* ... */
         b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
            i = skip_block_comment(bytes, len, i);
         }
         _ if depth == 0 => {
            if let Some(list_start) = order_by_at(bytes, len, i) {
               return Some(list_start);
            }
         }
         _ => {}
      }
      i += 1;
   }

   None
}

/// Pattern matching the first sort segment for `field` within the sort list:
/// an optional `alias.` qualifier, the field itself, and an optional
/// following word captured as the direction-token candidate.
fn inversion_pattern(field: &str) -> Regex {
   Regex::new(&format!(
      r"(?is)^(.*?)\b((?:[A-Za-z_][A-Za-z0-9_]*\.)?{})\b(?:\s+([A-Za-z]+))?",
      regex::escape(field)
   ))
   .expect("escaped field name always yields a valid pattern")
}

/// Pattern matching every sort segment for `field` within the sort list: the
/// optionally qualified field plus an optional `ASC`/`DESC` token (captured
/// with its leading whitespace, so original spacing is preserved).
fn explicit_pattern(field: &str) -> Regex {
   Regex::new(&format!(
      r"(?i)\b((?:[A-Za-z_][A-Za-z0-9_]*\.)?{})\b(\s+(?:ASC|DESC)\b)?",
      regex::escape(field)
   ))
   .expect("escaped field name always yields a valid pattern")
}

/// Sort-inversion strategy (NULLS LAST on dialects without native syntax).
///
/// Rewrites the first segment ordering by `field`: prefixes the column
/// reference with a unary minus and flips the `ASC`/`DESC` token. A segment
/// without a recognizable direction token is an error — the direction must be
/// read to be inverted.
fn invert_sort(sql: &str, field: &str) -> Result<String> {
   let Some(list_start) = find_sort_list(sql) else {
      return Ok(sql.to_string());
   };
   let (head, list) = sql.split_at(list_start);

   let Some(caps) = inversion_pattern(field).captures(list) else {
      // The field is not ordered by — nothing to invert
      return Ok(sql.to_string());
   };

   let column = caps
      .get(2)
      .expect("column group participates in every match");
   let Some(direction) = caps.get(3) else {
      return Err(Error::InvalidSortDirection {
         field: field.to_string(),
         matched: caps[0].trim().to_string(),
      });
   };

   let flipped = if direction.as_str().eq_ignore_ascii_case("ASC") {
      "DESC"
   } else if direction.as_str().eq_ignore_ascii_case("DESC") {
      "ASC"
   } else {
      return Err(Error::InvalidSortDirection {
         field: field.to_string(),
         matched: direction.as_str().to_string(),
      });
   };

   let mut out = String::with_capacity(sql.len() + 1);
   out.push_str(head);
   out.push_str(&list[..column.start()]);
   out.push('-');
   out.push_str(column.as_str());
   out.push(' ');
   out.push_str(flipped);
   out.push_str(&list[direction.end()..]);
   Ok(out)
}

/// Explicit-clause strategy (dialects with native NULLS FIRST/LAST syntax).
///
/// Appends the keyword phrase after the direction token of every segment
/// ordering by `field`. A segment without a direction token sorts ascending
/// by dialect default; the phrase then directly follows the column reference.
fn append_nulls_keyword(sql: &str, field: &str, ordering: NullOrdering) -> String {
   let Some(list_start) = find_sort_list(sql) else {
      return sql.to_string();
   };
   let (head, list) = sql.split_at(list_start);

   let keyword = ordering.sql_keyword();
   let rewritten = explicit_pattern(field).replace_all(list, |caps: &Captures<'_>| {
      match caps.get(2) {
         Some(direction) => format!("{}{} {}", &caps[1], direction.as_str(), keyword),
         None => format!("{} {}", &caps[1], keyword),
      }
   });

   format!("{head}{rewritten}")
}

#[cfg(test)]
mod tests {
   use super::*;

   // ─── find_sort_list ───

   #[test]
   fn locates_top_level_order_by() {
      let sql = "SELECT * FROM posts ORDER BY id";
      let list_start = find_sort_list(sql).unwrap();
      assert_eq!(&sql[list_start..], " id");
   }

   #[test]
   fn locates_lowercase_order_by() {
      let sql = "select * from posts order by id desc";
      let list_start = find_sort_list(sql).unwrap();
      assert_eq!(&sql[list_start..], " id desc");
   }

   #[test]
   fn no_order_by_clause() {
      assert!(find_sort_list("SELECT * FROM posts").is_none());
   }

   #[test]
   fn ignores_order_by_inside_subquery() {
      let sql = "SELECT * FROM (SELECT * FROM posts ORDER BY id LIMIT 5) sub";
      assert!(find_sort_list(sql).is_none());
   }

   #[test]
   fn finds_outer_clause_past_a_subquery() {
      let sql = "SELECT * FROM (SELECT * FROM posts ORDER BY score) sub ORDER BY id";
      let list_start = find_sort_list(sql).unwrap();
      assert_eq!(&sql[list_start..], " id");
   }

   #[test]
   fn ignores_order_by_in_string_literal() {
      assert!(find_sort_list("SELECT * FROM posts WHERE name = 'ORDER BY id'").is_none());
   }

   #[test]
   fn ignores_order_by_in_literal_with_escaped_quote() {
      assert!(find_sort_list("SELECT * FROM t WHERE name = 'it''s ORDER BY here'").is_none());
   }

   #[test]
   fn ignores_order_by_in_comments() {
      assert!(find_sort_list("SELECT * FROM posts -- ORDER BY id").is_none());
      assert!(find_sort_list("SELECT * FROM posts /* ORDER BY id */").is_none());
   }

   #[test]
   fn finds_clause_after_a_comment() {
      let sql = "SELECT * FROM posts /* newest first */ ORDER BY id DESC";
      let list_start = find_sort_list(sql).unwrap();
      assert_eq!(&sql[list_start..], " id DESC");
   }

   #[test]
   fn ignores_order_by_in_quoted_identifier() {
      assert!(find_sort_list(r#"SELECT "ORDER BY" FROM posts"#).is_none());
   }

   #[test]
   fn order_prefix_of_identifier_is_not_a_keyword() {
      assert!(find_sort_list("SELECT ordering FROM posts").is_none());
   }

   #[test]
   fn keyword_split_across_lines() {
      let sql = "SELECT * FROM posts ORDER\n   BY id";
      let list_start = find_sort_list(sql).unwrap();
      assert_eq!(&sql[list_start..], " id");
   }

   // ─── validate_field_name ───

   #[test]
   fn field_name_valid() {
      assert!(validate_field_name("score").is_ok());
      assert!(validate_field_name("_private").is_ok());
      assert!(validate_field_name("t0_.score").is_ok());
   }

   #[test]
   fn field_name_rejects_empty() {
      assert!(validate_field_name("").is_err());
   }

   #[test]
   fn field_name_rejects_injection() {
      assert!(validate_field_name("score; DROP TABLE posts --").is_err());
      assert!(validate_field_name("score)--").is_err());
      assert!(validate_field_name("1bad").is_err());
      assert!(validate_field_name("sco re").is_err());
   }

   // ─── invert_sort ───

   #[test]
   fn inverts_ascending_segment() {
      let sql = invert_sort("SELECT * FROM posts ORDER BY score ASC", "score").unwrap();
      assert_eq!(sql, "SELECT * FROM posts ORDER BY -score DESC");
   }

   #[test]
   fn inverts_descending_segment() {
      let sql = invert_sort("SELECT * FROM posts ORDER BY score DESC", "score").unwrap();
      assert_eq!(sql, "SELECT * FROM posts ORDER BY -score ASC");
   }

   #[test]
   fn inverts_qualified_column_with_its_qualifier() {
      let sql = invert_sort("SELECT * FROM posts p ORDER BY p.score ASC", "score").unwrap();
      assert_eq!(sql, "SELECT * FROM posts p ORDER BY -p.score DESC");
   }

   #[test]
   fn inverts_lowercase_direction() {
      let sql = invert_sort("select * from posts order by score asc", "score").unwrap();
      assert_eq!(sql, "select * from posts order by -score DESC");
   }

   #[test]
   fn inversion_rewrites_first_occurrence_only() {
      let sql = invert_sort("SELECT * FROM posts ORDER BY score ASC, score DESC", "score").unwrap();
      assert_eq!(sql, "SELECT * FROM posts ORDER BY -score DESC, score DESC");
   }

   #[test]
   fn inversion_leaves_other_segments_alone() {
      let sql =
         invert_sort("SELECT * FROM posts ORDER BY name ASC, score ASC, id ASC", "score").unwrap();
      assert_eq!(
         sql,
         "SELECT * FROM posts ORDER BY name ASC, -score DESC, id ASC"
      );
   }

   #[test]
   fn inversion_ignores_absent_field() {
      let input = "SELECT * FROM posts ORDER BY name ASC";
      assert_eq!(invert_sort(input, "score").unwrap(), input);
   }

   #[test]
   fn inversion_does_not_match_field_as_identifier_suffix() {
      let input = "SELECT * FROM posts ORDER BY high_score ASC";
      assert_eq!(invert_sort(input, "score").unwrap(), input);
   }

   #[test]
   fn inversion_fails_without_direction_token() {
      let err = invert_sort("SELECT * FROM posts ORDER BY score", "score").unwrap_err();
      assert!(matches!(err, Error::InvalidSortDirection { ref field, .. } if field == "score"));
   }

   #[test]
   fn inversion_fails_on_unrecognized_direction_token() {
      let err = invert_sort("SELECT * FROM posts ORDER BY score SIDEWAYS", "score").unwrap_err();
      assert!(
         matches!(err, Error::InvalidSortDirection { ref matched, .. } if matched == "SIDEWAYS")
      );
   }

   #[test]
   fn inversion_fails_on_directionless_segment_before_others() {
      let err = invert_sort("SELECT * FROM posts ORDER BY score, name ASC", "score").unwrap_err();
      assert!(matches!(err, Error::InvalidSortDirection { ref field, .. } if field == "score"));
   }

   // ─── append_nulls_keyword ───

   #[test]
   fn appends_after_ascending_direction() {
      let sql = append_nulls_keyword(
         "SELECT * FROM posts ORDER BY name ASC",
         "name",
         NullOrdering::NullsLast,
      );
      assert_eq!(sql, "SELECT * FROM posts ORDER BY name ASC NULLS LAST");
   }

   #[test]
   fn appends_after_descending_direction() {
      let sql = append_nulls_keyword(
         "SELECT * FROM posts ORDER BY name DESC",
         "name",
         NullOrdering::NullsFirst,
      );
      assert_eq!(sql, "SELECT * FROM posts ORDER BY name DESC NULLS FIRST");
   }

   #[test]
   fn appends_directly_after_directionless_column() {
      let sql = append_nulls_keyword(
         "SELECT * FROM posts ORDER BY name, id ASC",
         "name",
         NullOrdering::NullsLast,
      );
      assert_eq!(sql, "SELECT * FROM posts ORDER BY name NULLS LAST, id ASC");
   }

   #[test]
   fn appends_to_every_matching_segment() {
      let sql = append_nulls_keyword(
         "SELECT * FROM posts ORDER BY score ASC, score DESC",
         "score",
         NullOrdering::NullsLast,
      );
      assert_eq!(
         sql,
         "SELECT * FROM posts ORDER BY score ASC NULLS LAST, score DESC NULLS LAST"
      );
   }

   #[test]
   fn appends_keeping_qualifier() {
      let sql = append_nulls_keyword(
         "SELECT * FROM posts p ORDER BY p.name ASC",
         "name",
         NullOrdering::NullsFirst,
      );
      assert_eq!(sql, "SELECT * FROM posts p ORDER BY p.name ASC NULLS FIRST");
   }

   #[test]
   fn append_ignores_absent_field() {
      let input = "SELECT * FROM posts ORDER BY name ASC";
      assert_eq!(
         append_nulls_keyword(input, "score", NullOrdering::NullsLast),
         input
      );
   }

   #[test]
   fn append_ignores_field_outside_order_by() {
      // `score` in the select list is before the clause; only the sort
      // segment is rewritten
      let sql = append_nulls_keyword(
         "SELECT score FROM posts ORDER BY name ASC",
         "score",
         NullOrdering::NullsLast,
      );
      assert_eq!(sql, "SELECT score FROM posts ORDER BY name ASC");
   }
}
