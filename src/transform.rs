use crate::error::PgHelperError;
use crate::types::{DbValue, NamedParams, ParamValue, QueryParams};

/// Rewrite a query with named placeholders into positional form.
///
/// Positional parameter lists (and absent parameters) pass through unchanged.
/// For a named set, every occurrence of each key is replaced by its assigned
/// positional placeholder, and list values are spread into a comma-joined run
/// (`$ids` bound to three values becomes `$4, $5, $6`). Assigned indices are
/// contiguous starting at 1 and match the returned parameter list exactly.
///
/// Replacement is literal: the key is treated as a fixed string, never as a
/// pattern. The transformer has no SQL awareness: a key that also appears
/// inside a string literal or comment is replaced there too. Keep parameter
/// names distinct from literal query text; this is a documented limitation.
///
/// ```rust
/// use pg_helper::transform::transform;
/// use pg_helper::types::{DbValue, NamedParams, QueryParams};
///
/// let params = NamedParams::new()
///     .set("$name", DbValue::Text("John".into()))
///     .set("$age", DbValue::Int(25));
/// let (sql, positional) = transform(
///     "SELECT * FROM users WHERE name = $name AND age = $age",
///     QueryParams::named(params),
/// )
/// .unwrap();
/// assert_eq!(sql, "SELECT * FROM users WHERE name = $1 AND age = $2");
/// assert_eq!(positional.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`PgHelperError::InvalidParameterName`] if any key does not start
/// with `$`. Validation covers every key, used or not, before any rewriting.
pub fn transform(
    query: &str,
    params: QueryParams,
) -> Result<(String, Vec<DbValue>), PgHelperError> {
    match params {
        QueryParams::None => Ok((query.to_owned(), Vec::new())),
        QueryParams::Positional(values) => Ok((query.to_owned(), values)),
        QueryParams::Named(named) => rewrite_named(query, named),
    }
}

fn rewrite_named(
    query: &str,
    params: NamedParams,
) -> Result<(String, Vec<DbValue>), PgHelperError> {
    let mut entries = params.into_entries();
    for (name, _) in &entries {
        if !name.starts_with('$') {
            return Err(PgHelperError::InvalidParameterName { name: name.clone() });
        }
    }

    // Longest name first, so a short name that prefixes a longer one ($id vs
    // $id_2) never matches inside the longer name's occurrences. The sort is
    // stable: equal-length names keep insertion order.
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut rewritten = query.to_owned();
    let mut positional: Vec<DbValue> = Vec::new();
    for (name, value) in entries {
        // Unused parameters are not errors; they just never enter the output.
        if !rewritten.contains(name.as_str()) {
            continue;
        }
        let replacement = match value {
            ParamValue::Scalar(v) => {
                positional.push(v);
                format!("${}", positional.len())
            }
            ParamValue::List(values) => {
                let first = positional.len() + 1;
                let last = positional.len() + values.len();
                positional.extend(values);
                (first..=last)
                    .map(|i| format!("${i}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        rewritten = rewritten.replace(name.as_str(), &replacement);
    }

    Ok((rewritten, positional))
}
