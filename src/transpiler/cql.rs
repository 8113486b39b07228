//! Compiler for flat CQL-style filter strings.
//!
//! CQL only accepts a conjunction of simple relations, so the accepted tree
//! is either a single leaf or an `and` whose children are all leaves.

use crate::ast::{AttributeTypeMap, FilterNode, NodeKind, Operator, Value};
use crate::error::{SiftError, SiftResult};
use crate::transpiler::FilterCompiler;

/// Compiles a [`FilterNode`] tree into a CQL `WHERE` fragment.
#[derive(Debug, Clone, Copy)]
pub struct CqlCompiler<'a> {
    types: &'a AttributeTypeMap,
    allow_filtering: bool,
}

impl<'a> CqlCompiler<'a> {
    pub const BACKEND: &'static str = "CQL";

    pub fn new(types: &'a AttributeTypeMap) -> Self {
        Self {
            types,
            allow_filtering: false,
        }
    }

    /// Append `ALLOW FILTERING` to a non-empty expression so the store
    /// accepts a non-indexed scan.
    pub fn allow_filtering(mut self, allow: bool) -> Self {
        self.allow_filtering = allow;
        self
    }

    fn compile_node(&self, node: &FilterNode, nested: bool) -> SiftResult<String> {
        if node.operator == Some(Operator::Or) {
            return Err(SiftError::unsupported(Operator::Or, Self::BACKEND));
        }

        match node.kind() {
            NodeKind::Empty => Ok(String::new()),
            NodeKind::Global { op, .. } => Err(SiftError::structure(
                Self::BACKEND,
                format!("operator '{}' without a field", op),
            )),
            NodeKind::Leaf { field, op, .. } => {
                let value = node.parsed_value().unwrap_or_default();
                match op {
                    Operator::TokenLt | Operator::TokenGt => Ok(format!(
                        "token({}) {} token({})",
                        field,
                        op.symbol(),
                        quote(&value.raw_text())
                    )),
                    _ => Ok(format!(
                        "{} {} {}",
                        field,
                        relation(op)?,
                        self.literal(field, &value)
                    )),
                }
            }
            NodeKind::Combine {
                op: Operator::And,
                children,
            } => {
                if nested {
                    return Err(SiftError::structure(
                        Self::BACKEND,
                        "nested 'and' groups; only a conjunction of relations is allowed",
                    ));
                }
                let parts = children
                    .iter()
                    .map(|child| self.compile_node(child, true))
                    .collect::<SiftResult<Vec<_>>>()?;
                Ok(parts
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" and "))
            }
            NodeKind::Combine { op, .. } => Err(SiftError::unsupported(op, Self::BACKEND)),
            NodeKind::Grouped { field, op, .. } => Err(SiftError::structure(
                Self::BACKEND,
                format!("operator '{}' grouped under field '{}'", op, field),
            )),
        }
    }

    /// Render a value for `field`, quoting string-like declared types.
    /// Undeclared fields quote string values.
    fn literal(&self, field: &str, value: &Value) -> String {
        let quoted = match self.types.get(field) {
            Some(ty) => ty.element().is_quoted(),
            None => matches!(value, Value::String(_) | Value::Timestamp(_)),
        };
        render(value, quoted)
    }
}

impl FilterCompiler for CqlCompiler<'_> {
    type Output = String;

    fn backend(&self) -> &'static str {
        Self::BACKEND
    }

    fn compile(&self, node: &FilterNode) -> SiftResult<String> {
        let mut cql = self.compile_node(node, false)?;
        if self.allow_filtering && !cql.is_empty() {
            cql.push_str(" ALLOW FILTERING");
        }
        tracing::debug!(%cql, "compiled CQL filter");
        Ok(cql)
    }
}

/// CQL relation for a leaf operator.
fn relation(op: Operator) -> SiftResult<&'static str> {
    match op {
        Operator::Eq => Ok("="),
        Operator::Lt => Ok("<"),
        Operator::Gt => Ok(">"),
        Operator::Lte => Ok("<="),
        Operator::Gte => Ok(">="),
        Operator::In => Ok("IN"),
        Operator::Contains => Ok("CONTAINS"),
        Operator::ContainsKey => Ok("CONTAINS KEY"),
        Operator::And => Err(SiftError::MissingChildren(op.to_string())),
        other => Err(SiftError::unsupported(other, CqlCompiler::BACKEND)),
    }
}

fn render(value: &Value, quoted: bool) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Array(items) => format!(
            "({})",
            items
                .iter()
                .map(|item| render(item, quoted))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        v if quoted => quote(&v.raw_text()),
        v => v.raw_text(),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::compile_expression_string;
    use pretty_assertions::assert_eq;

    fn types() -> AttributeTypeMap {
        AttributeTypeMap::new()
            .with("name", "String")
            .with("age", "Int")
            .with("born", "Date")
            .with("tags", "[String]")
    }

    fn cql(node: &FilterNode) -> SiftResult<String> {
        CqlCompiler::new(&types()).compile(node)
    }

    #[test]
    fn test_conjunction_quotes_string_fields_only() {
        let node = FilterNode::and(vec![
            FilterNode::leaf("age", Operator::Gt, 10),
            FilterNode::leaf("name", Operator::Eq, "Bob"),
        ]);
        assert_eq!(cql(&node).unwrap(), "age > 10 and name = 'Bob'");
    }

    #[test]
    fn test_or_is_rejected() {
        let node = FilterNode::or(vec![
            FilterNode::leaf("age", Operator::Gt, 10),
            FilterNode::leaf("age", Operator::Lt, 5),
        ]);
        let err = cql(&node).unwrap_err();
        assert_eq!(err.to_string(), "Operator 'or' not supported by CQL");

        let bare = FilterNode::combine(Operator::Or, vec![]);
        assert!(matches!(cql(&bare), Err(SiftError::UnsupportedOperator { .. })));
    }

    #[test]
    fn test_nested_and_rejected() {
        let node = FilterNode::and(vec![FilterNode::and(vec![FilterNode::leaf(
            "age",
            Operator::Gt,
            10,
        )])]);
        assert!(matches!(cql(&node), Err(SiftError::UnsupportedStructure { .. })));
    }

    #[test]
    fn test_and_without_children() {
        let node = FilterNode::leaf("age", Operator::And, 1);
        assert!(matches!(cql(&node), Err(SiftError::MissingChildren(_))));
    }

    #[test]
    fn test_unsupported_leaf_operator() {
        let err = cql(&FilterNode::leaf("name", Operator::Like, "B%")).unwrap_err();
        assert_eq!(err.to_string(), "Operator 'like' not supported by CQL");
    }

    #[test]
    fn test_global_and_grouped_rejected() {
        assert!(cql(&FilterNode::global(Operator::Eq, 1)).is_err());
        assert!(cql(&FilterNode::grouped("age", Operator::And, vec![])).is_err());
    }

    #[test]
    fn test_token_range() {
        let node = FilterNode::leaf("id", Operator::TokenGt, "abc");
        assert_eq!(cql(&node).unwrap(), "token(id) > token('abc')");
        let node = FilterNode::leaf("id", Operator::TokenLt, 42);
        assert_eq!(cql(&node).unwrap(), "token(id) < token('42')");
    }

    #[test]
    fn test_in_list_and_contains() {
        let node = FilterNode::and(vec![
            FilterNode::list("name", Operator::In, "ann,o'neil"),
            FilterNode::leaf("tags", Operator::Contains, "red"),
            FilterNode::leaf("born", Operator::Gte, "2000-01-01"),
        ]);
        assert_eq!(
            cql(&node).unwrap(),
            "name IN ('ann', 'o''neil') and tags CONTAINS 'red' and born >= '2000-01-01'"
        );
    }

    #[test]
    fn test_undeclared_field_quotes_strings() {
        let node = FilterNode::and(vec![
            FilterNode::leaf("city", Operator::Eq, "Oslo"),
            FilterNode::leaf("rank", Operator::Lte, 3),
        ]);
        assert_eq!(cql(&node).unwrap(), "city = 'Oslo' and rank <= 3");
    }

    #[test]
    fn test_allow_filtering() {
        let types = types();
        let compiler = CqlCompiler::new(&types).allow_filtering(true);
        assert_eq!(
            compiler.compile(&FilterNode::leaf("age", Operator::Eq, 3)).unwrap(),
            "age = 3 ALLOW FILTERING"
        );
    }

    #[test]
    fn test_empty_filter_has_no_directive() {
        let types = types();
        let compiler = CqlCompiler::new(&types).allow_filtering(true);
        assert_eq!(compiler.compile(&FilterNode::empty()).unwrap(), "");
        let blank = FilterNode::and(vec![FilterNode::empty()]);
        assert_eq!(compiler.compile(&blank).unwrap(), "");

        let fragment = compile_expression_string(&FilterNode::empty(), &types, true).unwrap();
        let query = if fragment.is_empty() {
            "SELECT * FROM t".to_string()
        } else {
            format!("SELECT * FROM t WHERE {}", fragment)
        };
        assert_eq!(query, "SELECT * FROM t");
    }

    #[test]
    fn test_empty_children_skipped() {
        let node = FilterNode::and(vec![FilterNode::empty(), FilterNode::leaf("age", Operator::Eq, 1)]);
        assert_eq!(cql(&node).unwrap(), "age = 1");
    }
}
