//! Containment matching for array attributes stored as delimited strings.
//!
//! Stores without native array columns keep `[String]` attributes as text
//! such as `["a","b","c"]`. Membership of `v` is then one of four shapes:
//! the sole element, the first, a middle or the last one.

use serde::{Deserialize, Serialize};

use crate::ast::{AttributeType, Operator, Value};
use crate::predicate::Predicate;

/// How `in` / `notIn` against an array-shaped attribute are compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayStrategy {
    /// Pattern matching over the `[v1,v2]` text encoding
    #[default]
    DelimitedString,
    /// The store has real array columns; compile a plain comparison
    Native,
}

/// The four patterns locating one element inside `[v1,v2,...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentPatterns {
    pub sole: String,
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl ContainmentPatterns {
    pub fn new(element: &str) -> Self {
        Self {
            sole: format!("[{}]", element),
            first: format!("[{},%", element),
            middle: format!("%,{},%", element),
            last: format!("%,{}]", element),
        }
    }

    /// Any of the four shapes matches.
    pub fn membership(&self, field: &str) -> Predicate {
        Predicate::Or(vec![
            Predicate::compare(field, Operator::Eq, self.sole.as_str()),
            Predicate::compare(field, Operator::Like, self.first.as_str()),
            Predicate::compare(field, Operator::Like, self.middle.as_str()),
            Predicate::compare(field, Operator::Like, self.last.as_str()),
        ])
    }

    /// None of the four shapes matches.
    pub fn exclusion(&self, field: &str) -> Predicate {
        Predicate::And(vec![
            Predicate::compare(field, Operator::Ne, self.sole.as_str()),
            Predicate::compare(field, Operator::NotLike, self.first.as_str()),
            Predicate::compare(field, Operator::NotLike, self.middle.as_str()),
            Predicate::compare(field, Operator::NotLike, self.last.as_str()),
        ])
    }
}

/// Element text as stored: string-like element types are double quoted.
/// List values render each element, comma-joined.
pub fn element_text(value: &Value, element_type: &AttributeType) -> String {
    let quoted = element_type.is_quoted();
    let render = |v: &Value| {
        if quoted {
            format!("\"{}\"", v.raw_text())
        } else {
            v.raw_text()
        }
    };
    match value {
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        scalar => render(scalar),
    }
}

/// Compile `field op value` for an array-shaped attribute, if `op` is a
/// containment operator.
pub fn containment(
    field: &str,
    op: Operator,
    value: &Value,
    attribute: &AttributeType,
) -> Option<Predicate> {
    let patterns = ContainmentPatterns::new(&element_text(value, attribute.element()));
    match op {
        Operator::In => Some(patterns.membership(field)),
        Operator::NotIn => Some(patterns.exclusion(field)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_patterns_for_quoted_element() {
        let ty = AttributeType::from_decl("[String]");
        let p = containment("tags", Operator::In, &Value::from("x"), &ty).unwrap();
        let Predicate::Or(alternatives) = p else {
            panic!("expected disjunction");
        };
        assert_eq!(alternatives.len(), 4);
        assert_eq!(alternatives[0], Predicate::compare("tags", Operator::Eq, "[\"x\"]"));
        assert_eq!(alternatives[1], Predicate::compare("tags", Operator::Like, "[\"x\",%"));
        assert_eq!(alternatives[2], Predicate::compare("tags", Operator::Like, "%,\"x\",%"));
        assert_eq!(alternatives[3], Predicate::compare("tags", Operator::Like, "%,\"x\"]"));
    }

    #[test]
    fn test_unquoted_numeric_elements() {
        let ty = AttributeType::from_decl("[Int]");
        let p = containment("scores", Operator::NotIn, &Value::Int(4), &ty).unwrap();
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::compare("scores", Operator::Ne, "[4]"),
                Predicate::compare("scores", Operator::NotLike, "[4,%"),
                Predicate::compare("scores", Operator::NotLike, "%,4,%"),
                Predicate::compare("scores", Operator::NotLike, "%,4]"),
            ])
        );
    }

    #[test]
    fn test_other_operators_pass_through() {
        let ty = AttributeType::from_decl("[Int]");
        assert!(containment("scores", Operator::Eq, &Value::Int(4), &ty).is_none());
    }

    #[test]
    fn test_list_value_quotes_each_element() {
        let ty = AttributeType::from_decl("[String]");
        assert_eq!(element_text(&Value::from(vec!["a", "b"]), ty.element()), "\"a\",\"b\"");
    }
}
