//! Keyset pagination conditions.
//!
//! Given an order list, a cursor record and a direction, build the predicate
//! selecting the records strictly after (forward) or before (backward) the
//! cursor under that order.
//!
//! A record is *after* the cursor when, walking the order from the first
//! level, some level compares strictly past the cursor while every earlier
//! level ties. The id attribute is the final, always unique tie-breaker.
//!
//! The predicate is built from the last level to the first:
//!
//! ```text
//! order: [ e0, e1, ..., en ]
//!          |<---------|   |
//!          fold steps      base step
//!
//! base:  en relaxed v_n               (strict if en is the id attribute)
//! step:  AND( ei relaxed v_i, OR( ei strict v_i, previous ) )
//! ```

use serde::{Deserialize, Serialize};

use crate::ast::{Cursor, OrderEntry, Operator, SortDirection, Value};
use crate::error::{SiftError, SiftResult};
use crate::predicate::Predicate;

/// Pagination direction relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageDirection {
    /// Records after the cursor
    Forward,
    /// Records before the cursor
    Backward,
}

impl PageDirection {
    /// `(relaxed, strict)` comparison for one order level.
    pub fn operators(self, direction: SortDirection) -> (Operator, Operator) {
        match (self, direction) {
            (PageDirection::Forward, SortDirection::Asc)
            | (PageDirection::Backward, SortDirection::Desc) => (Operator::Gte, Operator::Gt),
            (PageDirection::Forward, SortDirection::Desc)
            | (PageDirection::Backward, SortDirection::Asc) => (Operator::Lte, Operator::Lt),
        }
    }
}

/// What to do when the cursor inputs cannot identify a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Skip cursor filtering: the condition matches every record.
    #[default]
    Unconstrained,
    /// Fail with [`SiftError::MalformedCursor`].
    Reject,
}

/// Why a cursor condition could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDefect {
    MissingIdAttribute,
    OrderWithoutId,
    CursorWithoutId,
}

impl std::fmt::Display for CursorDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorDefect::MissingIdAttribute => write!(f, "no id attribute given"),
            CursorDefect::OrderWithoutId => write!(f, "order does not include the id attribute"),
            CursorDefect::CursorWithoutId => write!(f, "cursor has no value for the id attribute"),
        }
    }
}

/// Builder for a keyset pagination condition.
///
/// # Example
///
/// ```
/// use siftql::ast::{OrderEntry, record};
/// use siftql::cursor::CursorCondition;
///
/// let order = [OrderEntry::desc("age"), OrderEntry::asc("id")];
/// let cursor = record([("age", 30), ("id", 7)]);
/// let after = CursorCondition::new(&order, &cursor, "id").after().unwrap();
/// assert_eq!(after.to_string(), "(age <= 30 AND (age < 30 OR id > 7))");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CursorCondition<'a> {
    order: &'a [OrderEntry],
    cursor: &'a Cursor,
    id_attribute: &'a str,
    include_cursor: bool,
    fallback: Fallback,
}

impl<'a> CursorCondition<'a> {
    pub fn new(order: &'a [OrderEntry], cursor: &'a Cursor, id_attribute: &'a str) -> Self {
        Self {
            order,
            cursor,
            id_attribute,
            include_cursor: false,
            fallback: Fallback::default(),
        }
    }

    /// Also match the cursor record itself.
    pub fn include_cursor(mut self, include: bool) -> Self {
        self.include_cursor = include;
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Records after the cursor.
    pub fn after(&self) -> SiftResult<Predicate> {
        self.build(PageDirection::Forward)
    }

    /// Records before the cursor.
    pub fn before(&self) -> SiftResult<Predicate> {
        self.build(PageDirection::Backward)
    }

    pub fn build(&self, direction: PageDirection) -> SiftResult<Predicate> {
        if let Some(defect) = self.defect() {
            return match self.fallback {
                Fallback::Unconstrained => {
                    tracing::warn!(%defect, "cursor condition skipped; all records match");
                    Ok(Predicate::True)
                }
                Fallback::Reject => Err(SiftError::MalformedCursor(defect.to_string())),
            };
        }

        let mut levels = self.order.iter().rev();
        let Some(last) = levels.next() else {
            return Ok(Predicate::True);
        };

        let (relaxed, strict) = direction.operators(last.direction);
        let mut predicate =
            Predicate::compare(&last.field, self.boundary(last, relaxed, strict), self.value(last));

        for entry in levels {
            let (relaxed, strict) = direction.operators(entry.direction);
            let value = self.value(entry);
            predicate = Predicate::And(vec![
                Predicate::compare(
                    &entry.field,
                    self.boundary(entry, relaxed, strict),
                    value.clone(),
                ),
                Predicate::Or(vec![
                    Predicate::compare(&entry.field, strict, value),
                    predicate,
                ]),
            ]);
        }

        tracing::debug!(?direction, %predicate, "built cursor condition");
        Ok(predicate)
    }

    fn defect(&self) -> Option<CursorDefect> {
        if self.id_attribute.is_empty() {
            Some(CursorDefect::MissingIdAttribute)
        } else if !self.order.iter().any(|e| e.field == self.id_attribute) {
            Some(CursorDefect::OrderWithoutId)
        } else if !self.cursor.contains_key(self.id_attribute) {
            Some(CursorDefect::CursorWithoutId)
        } else {
            None
        }
    }

    /// The id level is strict unless the cursor itself is included.
    fn boundary(&self, entry: &OrderEntry, relaxed: Operator, strict: Operator) -> Operator {
        if !self.include_cursor && entry.field == self.id_attribute {
            strict
        } else {
            relaxed
        }
    }

    fn value(&self, entry: &OrderEntry) -> Value {
        match self.cursor.get(&entry.field) {
            Some(v) => v.clone(),
            None => {
                tracing::debug!(field = %entry.field, "cursor has no value for ordered field");
                Value::Null
            }
        }
    }
}

/// Condition for records after `cursor`; unconstrained on malformed input.
pub fn build_after(
    order: &[OrderEntry],
    cursor: &Cursor,
    id_attribute: &str,
    include_cursor: bool,
) -> Predicate {
    CursorCondition::new(order, cursor, id_attribute)
        .include_cursor(include_cursor)
        .after()
        .unwrap_or(Predicate::True)
}

/// Condition for records before `cursor`; unconstrained on malformed input.
pub fn build_before(
    order: &[OrderEntry],
    cursor: &Cursor,
    id_attribute: &str,
    include_cursor: bool,
) -> Predicate {
    CursorCondition::new(order, cursor, id_attribute)
        .include_cursor(include_cursor)
        .before()
        .unwrap_or(Predicate::True)
}
