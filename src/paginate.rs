//! Client-side ordering and truncation of already fetched records.

use std::cmp::Ordering;

use crate::ast::{Record, SortDirection, SortKey, Value};

/// Stable multi-key sort. Records that tie on every key keep their input
/// order; a missing field sorts as `Null`, which goes last ascending and
/// first descending.
pub fn order_records(mut records: Vec<Record>, keys: &[SortKey]) -> Vec<Record> {
    if keys.is_empty() {
        return records;
    }
    records.sort_by(|a, b| compare_records(a, b, keys));
    records
}

/// The first `limit` records. Shorter inputs are returned as is.
pub fn paginate_records(mut records: Vec<Record>, limit: usize) -> Vec<Record> {
    records.truncate(limit);
    records
}

fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.get(&key.field).unwrap_or(&Value::Null);
        let right = b.get(&key.field).unwrap_or(&Value::Null);
        let ord = match key.direction {
            SortDirection::Asc => left.sort_cmp(right),
            SortDirection::Desc => right.sort_cmp(left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
