use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ast::SortDirection;
use crate::error::{SiftError, SiftResult};

/// One level of a sort order. Serialized as `["field", "ASC"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, SortDirection)", into = "(String, SortDirection)")]
pub struct OrderEntry {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderEntry {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl From<(String, SortDirection)> for OrderEntry {
    fn from((field, direction): (String, SortDirection)) -> Self {
        Self { field, direction }
    }
}

impl From<OrderEntry> for (String, SortDirection) {
    fn from(entry: OrderEntry) -> Self {
        (entry.field, entry.direction)
    }
}

impl std::fmt::Display for OrderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// An ordered list of sort levels, most significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderList(Vec<OrderEntry>);

impl OrderList {
    pub fn new(entries: Vec<OrderEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append `(id_attribute, ASC)` unless the id attribute is already ordered.
    pub fn with_tie_breaker(mut self, id_attribute: &str) -> Self {
        if !self.contains(id_attribute) {
            self.0.push(OrderEntry::asc(id_attribute));
        }
        self
    }

    /// The same levels with every direction flipped.
    pub fn reversed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|e| OrderEntry::new(e.field.clone(), e.direction.reverse()))
                .collect(),
        )
    }

    /// Check the list has exactly one id entry and no duplicate fields.
    pub fn validate(&self, id_attribute: &str) -> SiftResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.0 {
            if !seen.insert(entry.field.as_str()) {
                return Err(SiftError::InvalidOrder(format!(
                    "field '{}' appears more than once",
                    entry.field
                )));
            }
        }
        if !seen.contains(id_attribute) {
            return Err(SiftError::InvalidOrder(format!(
                "id attribute '{}' is not ordered",
                id_attribute
            )));
        }
        Ok(())
    }
}

impl From<Vec<OrderEntry>> for OrderList {
    fn from(entries: Vec<OrderEntry>) -> Self {
        Self(entries)
    }
}

impl std::ops::Deref for OrderList {
    type Target = [OrderEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for OrderList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Sort key for client-side ordering. Input direction tokens are
/// case-insensitive (`{"field": "age", "order": "desc"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(rename = "order", deserialize_with = "direction_ignore_case")]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Build a key from a raw direction token of any case.
    pub fn parse(field: impl Into<String>, direction: &str) -> SiftResult<Self> {
        Ok(Self::new(field, SortDirection::parse_ignore_case(direction)?))
    }
}

impl From<&OrderEntry> for SortKey {
    fn from(entry: &OrderEntry) -> Self {
        Self::new(entry.field.clone(), entry.direction)
    }
}

fn direction_ignore_case<'de, D>(deserializer: D) -> Result<SortDirection, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let token = String::deserialize(deserializer)?;
    SortDirection::parse_ignore_case(&token).map_err(serde::de::Error::custom)
}
