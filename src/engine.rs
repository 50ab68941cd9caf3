//! The view engine: pure transformations from (records, search text,
//! category filter, page index, page size) to (visible rows, page count)
//! plus the derived filter option list. No I/O, no side effects; the model
//! re-runs these after every state change.

use serde_json::Value;

use crate::domain::ColumnSpec;

/// One row of source data, a flat field-to-value mapping.
pub type Record = serde_json::Map<String, Value>;

/// Name of the fixed field the category filter matches against.
pub const CATEGORY_FIELD: &str = "category";

/// Result of slicing the filtered record set to one page.
#[derive(Debug, PartialEq)]
pub struct PageView<'a> {
    pub visible_rows: Vec<&'a Record>,
    pub total_pages: usize,
    pub filtered_count: usize,
}

// Scalar cell values rendered/search-matched as text. Arrays and nested
// objects are not scalars and never match.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Cell text for one record field; absent or non-scalar fields render empty.
pub fn cell_text(record: &Record, accessor: &str) -> String {
    record
        .get(accessor)
        .and_then(scalar_text)
        .unwrap_or_default()
}

fn matches_search(record: &Record, columns: &[ColumnSpec], needle: &str) -> bool {
    columns.iter().any(|col| {
        record
            .get(&col.accessor)
            .and_then(scalar_text)
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn matches_category(record: &Record, wanted: &str) -> bool {
    record
        .get(CATEGORY_FIELD)
        .and_then(scalar_text)
        .is_some_and(|cat| cat.trim().to_lowercase() == wanted)
}

/// Applies search, category filter and pagination in that order.
///
/// The search keeps a record if ANY column's value, rendered as text and
/// lower-cased, contains `search_text` lower-cased as a substring; an empty
/// query matches everything. The category filter is an exact match
/// (case-insensitive, trimmed) on the `category` field; records lacking it
/// never match a non-empty filter. The page slice is the half-open range
/// `[(page_index-1)*page_size, page_index*page_size)` clamped to the
/// filtered set; an out-of-range `page_index` yields an empty slice, the
/// caller is responsible for keeping `page_index` in bounds.
///
/// `page_index >= 1` and `page_size >= 1` are preconditions.
pub fn compute_visible_rows<'a>(
    records: &'a [Record],
    columns: &[ColumnSpec],
    search_text: &str,
    category_filter: &str,
    page_index: usize,
    page_size: usize,
) -> PageView<'a> {
    debug_assert!(page_index >= 1, "page_index is 1-based");
    debug_assert!(page_size >= 1, "page_size must be positive");

    let needle = search_text.to_lowercase();
    let wanted = category_filter.trim().to_lowercase();

    let filtered: Vec<&Record> = records
        .iter()
        .filter(|r| needle.is_empty() || matches_search(r, columns, &needle))
        .filter(|r| wanted.is_empty() || matches_category(r, &wanted))
        .collect();

    let filtered_count = filtered.len();
    let total_pages = filtered_count.div_ceil(page_size);

    let begin = page_index.saturating_sub(1) * page_size;
    let end = std::cmp::min(begin + page_size, filtered_count);
    let visible_rows = if begin < filtered_count {
        filtered[begin..end].to_vec()
    } else {
        Vec::new()
    };

    PageView {
        visible_rows,
        total_pages,
        filtered_count,
    }
}

/// Distinct values of the `category` field across ALL records (never the
/// filtered subset), first-seen order, duplicates removed. Records lacking
/// the field contribute no entry.
pub fn compute_filter_options(records: &[Record]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for record in records {
        if let Some(cat) = record.get(CATEGORY_FIELD).and_then(|v| scalar_text(v))
            && !options.contains(&cat)
        {
            options.push(cat);
        }
    }
    options
}
