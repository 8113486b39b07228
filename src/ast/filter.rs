use serde::{Deserialize, Serialize};

use crate::ast::{Operator, Value};

/// How the `value` of a filter node should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Comma separated list, split into [`Value::Array`]
    Array,
    /// Any scalar type name
    #[serde(other)]
    Scalar,
}

/// One node of a user supplied filter tree.
///
/// Input shape: `{field?, value?, valueType?, operator?, search?}` where
/// `search` carries the child nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, rename = "search", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FilterNode>>,
}

/// Structural reading of a [`FilterNode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// No operator, or neither value nor children
    Empty,
    /// Operator applied to a value with no field target
    Global { op: Operator, value: &'a Value },
    /// `field op value`
    Leaf {
        field: &'a str,
        op: Operator,
        value: &'a Value,
    },
    /// Operator across child nodes
    Combine {
        op: Operator,
        children: &'a [FilterNode],
    },
    /// Field operator with child nodes as its right-hand side
    Grouped {
        field: &'a str,
        op: Operator,
        children: &'a [FilterNode],
    },
}

impl FilterNode {
    /// The empty filter.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `field op value`
    pub fn leaf(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: Some(field.into()),
            value: Some(value.into()),
            operator: Some(op),
            ..Self::default()
        }
    }

    /// `field op value` where `value` is a comma separated list.
    pub fn list(field: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self {
            value_type: Some(ValueType::Array),
            ..Self::leaf(field, op, value)
        }
    }

    /// Operator applied to a value without a field target.
    pub fn global(op: Operator, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            operator: Some(op),
            ..Self::default()
        }
    }

    /// Operator applied across child nodes.
    pub fn combine(op: Operator, children: Vec<FilterNode>) -> Self {
        Self {
            operator: Some(op),
            children: Some(children),
            ..Self::default()
        }
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::combine(Operator::And, children)
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::combine(Operator::Or, children)
    }

    /// Children grouped under a shared field context.
    pub fn grouped(field: impl Into<String>, op: Operator, children: Vec<FilterNode>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::combine(op, children)
        }
    }

    /// Classify the node. Children take precedence over a value.
    pub fn kind(&self) -> NodeKind<'_> {
        let Some(op) = self.operator else {
            return NodeKind::Empty;
        };
        match (&self.field, &self.value, &self.children) {
            (_, None, None) => NodeKind::Empty,
            (None, Some(value), None) => NodeKind::Global { op, value },
            (Some(field), Some(value), None) => NodeKind::Leaf { field, op, value },
            (None, _, Some(children)) => NodeKind::Combine { op, children },
            (Some(field), _, Some(children)) => NodeKind::Grouped {
                field,
                op,
                children,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind(), NodeKind::Empty)
    }

    /// The value as the compilers should read it: list-typed string input is
    /// split on `,`.
    pub fn parsed_value(&self) -> Option<Value> {
        let value = self.value.as_ref()?;
        match (self.value_type, value) {
            (Some(ValueType::Array), Value::String(s)) => Some(Value::Array(
                s.split(',').map(|part| Value::String(part.to_string())).collect(),
            )),
            _ => Some(value.clone()),
        }
    }
}
