//! Nested boolean predicates (the output of the predicate backend and of the
//! cursor builder).
//!
//! A [`Predicate`] renders to the nested JSON shape consumed by
//! predicate-based stores:
//!
//! ```text
//! { "$and": [ { "age": { "$lte": 30 } },
//!             { "$or": [ { "age": { "$lt": 30 } }, { "id": { "$gt": 7 } } ] } ] }
//! ```
//!
//! and can be evaluated in memory against a [`Record`].

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json, json};

use crate::ast::{Operator, Record, Value};
use crate::error::{SiftError, SiftResult};

/// A boolean expression over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No constraint; matches every record
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// `field op value`
    Compare {
        field: String,
        op: Operator,
        value: Value,
    },
    /// Operator applied to a value with no field target
    Global { op: Operator, value: Value },
    /// Field operator whose right-hand side is a list of predicates
    Scoped {
        field: String,
        op: Operator,
        children: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Conjunction that drops unconstrained operands.
    pub fn and_all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        let preds: Vec<Predicate> = preds.into_iter().filter(|p| !p.is_true()).collect();
        match preds.len() {
            0 => Predicate::True,
            1 => preds.into_iter().next().unwrap_or(Predicate::True),
            _ => Predicate::And(preds),
        }
    }

    /// Render to the nested `$and`/`$or` JSON structure.
    pub fn to_json(&self) -> Json {
        match self {
            Predicate::True => Json::Object(Map::new()),
            Predicate::And(preds) => json!({ "$and": preds.iter().map(Predicate::to_json).collect::<Vec<_>>() }),
            Predicate::Or(preds) => json!({ "$or": preds.iter().map(Predicate::to_json).collect::<Vec<_>>() }),
            Predicate::Not(inner) => json!({ "$not": inner.to_json() }),
            Predicate::Compare { field, op, value } => {
                let mut cmp = Map::new();
                cmp.insert(op.predicate_key(), Json::from(value));
                let mut obj = Map::new();
                obj.insert(field.clone(), Json::Object(cmp));
                Json::Object(obj)
            }
            Predicate::Global { op, value } => {
                let mut obj = Map::new();
                obj.insert(op.predicate_key(), Json::from(value));
                Json::Object(obj)
            }
            Predicate::Scoped {
                field,
                op,
                children,
            } => {
                let mut cmp = Map::new();
                cmp.insert(
                    op.predicate_key(),
                    Json::Array(children.iter().map(Predicate::to_json).collect()),
                );
                let mut obj = Map::new();
                obj.insert(field.clone(), Json::Object(cmp));
                Json::Object(obj)
            }
        }
    }

    /// Evaluate against a record. Missing fields read as `Null`, and any
    /// relational comparison involving `Null` is false, as in SQL.
    pub fn matches(&self, record: &Record) -> SiftResult<bool> {
        match self {
            Predicate::True => Ok(true),
            Predicate::And(preds) => {
                for p in preds {
                    if !p.matches(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(preds) => {
                for p in preds {
                    if p.matches(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not(inner) => Ok(!inner.matches(record)?),
            Predicate::Compare { field, op, value } => {
                let actual = record.get(field).unwrap_or(&Value::Null);
                eval_compare(actual, *op, value)
            }
            Predicate::Global { op, .. } => Err(SiftError::Evaluation(format!(
                "global operator '{}' has no field to evaluate",
                op
            ))),
            Predicate::Scoped { field, op, .. } => Err(SiftError::Evaluation(format!(
                "scoped operator '{}' on '{}' cannot be evaluated in memory",
                op, field
            ))),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::True => write!(f, "TRUE"),
            Predicate::And(preds) => write_joined(f, preds, " AND "),
            Predicate::Or(preds) => write_joined(f, preds, " OR "),
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            Predicate::Global { op, value } => write!(f, "{} {}", op.symbol(), value),
            Predicate::Scoped {
                field,
                op,
                children,
            } => {
                write!(f, "{} {} ", field, op.symbol())?;
                write_joined(f, children, ", ")
            }
        }
    }
}

fn write_joined(f: &mut std::fmt::Formatter<'_>, preds: &[Predicate], sep: &str) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, p) in preds.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, ")")
}

fn eval_compare(actual: &Value, op: Operator, expected: &Value) -> SiftResult<bool> {
    use std::cmp::Ordering;

    let ord = || actual.compare(expected);
    let result = match op {
        Operator::Eq => ord() == Some(Ordering::Equal),
        Operator::Ne => ord().is_some_and(|o| o != Ordering::Equal),
        Operator::Gt => ord() == Some(Ordering::Greater),
        Operator::Gte => matches!(ord(), Some(Ordering::Greater | Ordering::Equal)),
        Operator::Lt => ord() == Some(Ordering::Less),
        Operator::Lte => matches!(ord(), Some(Ordering::Less | Ordering::Equal)),
        Operator::In | Operator::NotIn => {
            let Value::Array(items) = expected else {
                return Err(SiftError::Evaluation(format!("'{}' expects a list value", op)));
            };
            let found = items
                .iter()
                .any(|item| actual.compare(item) == Some(Ordering::Equal));
            if op == Operator::In { found } else { !found && !actual.is_null() }
        }
        Operator::Like | Operator::NotLike | Operator::ILike | Operator::NotILike => {
            let (Some(text), Some(pattern)) = (actual.as_str(), expected.as_str()) else {
                return Ok(false);
            };
            let hit = if matches!(op, Operator::ILike | Operator::NotILike) {
                like_match(&text.to_lowercase(), &pattern.to_lowercase())
            } else {
                like_match(text, pattern)
            };
            if matches!(op, Operator::Like | Operator::ILike) { hit } else { !hit }
        }
        Operator::Between | Operator::NotBetween => {
            let Value::Array(bounds) = expected else {
                return Err(SiftError::Evaluation(format!("'{}' expects two bounds", op)));
            };
            let [low, high] = bounds.as_slice() else {
                return Err(SiftError::Evaluation(format!("'{}' expects two bounds", op)));
            };
            let inside = matches!(actual.compare(low), Some(Ordering::Greater | Ordering::Equal))
                && matches!(actual.compare(high), Some(Ordering::Less | Ordering::Equal));
            if op == Operator::Between { inside } else { !inside }
        }
        Operator::Is => actual == expected,
        other => {
            return Err(SiftError::Evaluation(format!(
                "operator '{}' cannot be evaluated in memory",
                other
            )));
        }
    };
    Ok(result)
}

/// SQL LIKE: `%` matches any run, `_` any single character.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let p = Predicate::And(vec![
            Predicate::compare("age", Operator::Lte, 30),
            Predicate::Or(vec![
                Predicate::compare("age", Operator::Lt, 30),
                Predicate::compare("id", Operator::Gt, 7),
            ]),
        ]);
        assert_eq!(
            p.to_json(),
            json!({"$and": [
                {"age": {"$lte": 30}},
                {"$or": [{"age": {"$lt": 30}}, {"id": {"$gt": 7}}]}
            ]})
        );
        assert_eq!(Predicate::True.to_json(), json!({}));
    }

    #[test]
    fn test_display() {
        let p = Predicate::Or(vec![
            Predicate::compare("name", Operator::Eq, "Bob"),
            Predicate::compare("age", Operator::Gte, 18),
        ]);
        assert_eq!(p.to_string(), "(name = 'Bob' OR age >= 18)");
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("[\"x\",\"y\"]", "[\"x\",%"));
        assert!(like_match("[a,x,b]", "%,x,%"));
        assert!(!like_match("[a,xy,b]", "%,x,%"));
        assert!(like_match("abc", "a_c"));
        assert!(like_match("", "%"));
    }

    #[test]
    fn test_matches_missing_field_is_null() {
        let r = record([("id", 1)]);
        assert!(!Predicate::compare("age", Operator::Gt, 3).matches(&r).unwrap());
        assert!(Predicate::compare("age", Operator::Is, Value::Null).matches(&r).unwrap());
    }

    #[test]
    fn test_matches_in_and_between() {
        let r = record([("id", 5)]);
        let in_list = Predicate::compare("id", Operator::In, vec![1, 5]);
        assert!(in_list.matches(&r).unwrap());
        let between = Predicate::compare("id", Operator::NotBetween, vec![6, 9]);
        assert!(between.matches(&r).unwrap());
    }

    #[test]
    fn test_scoped_is_not_evaluable() {
        let p = Predicate::Scoped {
            field: "a".into(),
            op: Operator::Or,
            children: vec![],
        };
        assert!(p.matches(&Record::new()).is_err());
    }

    #[test]
    fn test_and_all_flattens_true() {
        let p = Predicate::and_all([Predicate::True, Predicate::compare("a", Operator::Eq, 1)]);
        assert_eq!(p, Predicate::compare("a", Operator::Eq, 1));
        assert_eq!(Predicate::and_all([Predicate::True]), Predicate::True);
    }
}
