//! Compiler for nested predicate stores (full boolean nesting).

use crate::ast::{AttributeTypeMap, FilterNode, NodeKind, Operator};
use crate::error::{SiftError, SiftResult};
use crate::predicate::Predicate;
use crate::transpiler::array::{self, ArrayStrategy};
use crate::transpiler::{FilterCompiler, MAX_FILTER_DEPTH};

/// Compiles a [`FilterNode`] tree into a [`Predicate`].
#[derive(Debug, Clone, Copy)]
pub struct PredicateCompiler<'a> {
    types: &'a AttributeTypeMap,
    arrays: ArrayStrategy,
}

impl<'a> PredicateCompiler<'a> {
    pub const BACKEND: &'static str = "predicate backend";

    pub fn new(types: &'a AttributeTypeMap) -> Self {
        Self {
            types,
            arrays: ArrayStrategy::default(),
        }
    }

    pub fn with_array_strategy(mut self, arrays: ArrayStrategy) -> Self {
        self.arrays = arrays;
        self
    }

    fn compile_node(&self, node: &FilterNode, depth: usize) -> SiftResult<Predicate> {
        if depth > MAX_FILTER_DEPTH {
            return Err(SiftError::structure(
                Self::BACKEND,
                format!("filter nested deeper than {} levels", MAX_FILTER_DEPTH),
            ));
        }
        tracing::trace!(depth, operator = ?node.operator, field = ?node.field, "compiling predicate node");

        match node.kind() {
            NodeKind::Empty => Ok(Predicate::True),
            NodeKind::Global { op, .. } => {
                self.check(op)?;
                Ok(Predicate::Global {
                    op,
                    value: node.parsed_value().unwrap_or_default(),
                })
            }
            NodeKind::Leaf { field, op, .. } => {
                let value = node.parsed_value().unwrap_or_default();
                if self.arrays == ArrayStrategy::DelimitedString {
                    if let Some(attribute) = self.types.get(field).filter(|ty| ty.is_array()) {
                        if let Some(pred) = array::containment(field, op, &value, &attribute) {
                            return Ok(pred);
                        }
                    }
                }
                self.check(op)?;
                Ok(Predicate::Compare {
                    field: field.to_string(),
                    op,
                    value,
                })
            }
            NodeKind::Combine { op, children } => {
                let children = self.compile_children(children, depth)?;
                match op {
                    Operator::And => Ok(Predicate::And(children)),
                    Operator::Or => Ok(Predicate::Or(children)),
                    Operator::Not => Ok(Predicate::Not(Box::new(match children.len() {
                        1 => children.into_iter().next().unwrap_or(Predicate::True),
                        _ => Predicate::And(children),
                    }))),
                    other => Err(SiftError::unsupported(
                        format!("{} (as a combinator)", other),
                        Self::BACKEND,
                    )),
                }
            }
            NodeKind::Grouped {
                field,
                op,
                children,
            } => {
                self.check(op)?;
                Ok(Predicate::Scoped {
                    field: field.to_string(),
                    op,
                    children: self.compile_children(children, depth)?,
                })
            }
        }
    }

    fn compile_children(&self, children: &[FilterNode], depth: usize) -> SiftResult<Vec<Predicate>> {
        children
            .iter()
            .map(|child| self.compile_node(child, depth + 1))
            .collect()
    }

    fn check(&self, op: Operator) -> SiftResult<()> {
        match op {
            Operator::Contains | Operator::ContainsKey | Operator::TokenLt | Operator::TokenGt => {
                Err(SiftError::unsupported(op, Self::BACKEND))
            }
            _ => Ok(()),
        }
    }
}

impl FilterCompiler for PredicateCompiler<'_> {
    type Output = Predicate;

    fn backend(&self) -> &'static str {
        Self::BACKEND
    }

    fn compile(&self, node: &FilterNode) -> SiftResult<Predicate> {
        let predicate = self.compile_node(node, 0)?;
        tracing::debug!(%predicate, "compiled filter predicate");
        Ok(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn types() -> AttributeTypeMap {
        AttributeTypeMap::new()
            .with("name", "String")
            .with("age", "Int")
            .with("tags", "[String]")
    }

    fn compile(node: &FilterNode) -> SiftResult<Predicate> {
        PredicateCompiler::new(&types()).compile(node)
    }

    #[test]
    fn test_empty_is_true() {
        assert_eq!(compile(&FilterNode::empty()).unwrap(), Predicate::True);
    }

    #[test]
    fn test_leaf() {
        let p = compile(&FilterNode::leaf("age", Operator::Gt, 10)).unwrap();
        assert_eq!(p.to_json(), json!({"age": {"$gt": 10}}));
    }

    #[test]
    fn test_list_value_leaf() {
        let p = compile(&FilterNode::list("name", Operator::In, "ann,bob")).unwrap();
        assert_eq!(p.to_json(), json!({"name": {"$in": ["ann", "bob"]}}));
    }

    #[test]
    fn test_global_form() {
        let p = compile(&FilterNode::global(Operator::Eq, 3)).unwrap();
        assert_eq!(p.to_json(), json!({"$eq": 3}));
    }

    #[test]
    fn test_nested_combinators() {
        let node = FilterNode::or(vec![
            FilterNode::leaf("name", Operator::Eq, "Bob"),
            FilterNode::and(vec![
                FilterNode::leaf("age", Operator::Gte, 18),
                FilterNode::leaf("age", Operator::Lt, 65),
            ]),
        ]);
        assert_eq!(
            compile(&node).unwrap().to_json(),
            json!({"$or": [
                {"name": {"$eq": "Bob"}},
                {"$and": [{"age": {"$gte": 18}}, {"age": {"$lt": 65}}]}
            ]})
        );
    }

    #[test]
    fn test_grouped_under_field() {
        let node = FilterNode::grouped(
            "age",
            Operator::Or,
            vec![FilterNode::global(Operator::Lt, 10), FilterNode::global(Operator::Gt, 90)],
        );
        assert_eq!(
            compile(&node).unwrap().to_json(),
            json!({"age": {"$or": [{"$lt": 10}, {"$gt": 90}]}})
        );
    }

    #[test]
    fn test_array_field_in_uses_patterns() {
        let p = compile(&FilterNode::leaf("tags", Operator::In, "x")).unwrap();
        assert_eq!(
            p.to_json(),
            json!({"$or": [
                {"tags": {"$eq": "[\"x\"]"}},
                {"tags": {"$like": "[\"x\",%"}},
                {"tags": {"$like": "%,\"x\",%"}},
                {"tags": {"$like": "%,\"x\"]"}}
            ]})
        );
    }

    #[test]
    fn test_native_arrays_skip_patterns() {
        let types = types();
        let compiler = PredicateCompiler::new(&types).with_array_strategy(ArrayStrategy::Native);
        let p = compiler.compile(&FilterNode::leaf("tags", Operator::In, "x")).unwrap();
        assert_eq!(p, Predicate::compare("tags", Operator::In, Value::from("x")));
    }

    #[test]
    fn test_array_patterns_evaluate_against_stored_text() {
        let p = compile(&FilterNode::leaf("tags", Operator::NotIn, "b")).unwrap();
        let stored = |s: &str| crate::ast::record([("tags", s)]);
        assert!(!p.matches(&stored("[\"a\",\"b\",\"c\"]")).unwrap());
        assert!(!p.matches(&stored("[\"b\"]")).unwrap());
        assert!(p.matches(&stored("[\"a\",\"bb\"]")).unwrap());
    }

    #[test]
    fn test_cql_only_operators_rejected() {
        let err = compile(&FilterNode::leaf("id", Operator::TokenGt, 5)).unwrap_err();
        assert!(matches!(err, SiftError::UnsupportedOperator { ref operator, .. } if operator == "tgt"));
    }

    #[test]
    fn test_comparison_operator_as_combinator_rejected() {
        let node = FilterNode::combine(Operator::Gt, vec![FilterNode::leaf("a", Operator::Eq, 1)]);
        assert!(compile(&node).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut node = FilterNode::leaf("a", Operator::Eq, 1);
        for _ in 0..=MAX_FILTER_DEPTH {
            node = FilterNode::and(vec![node]);
        }
        assert!(matches!(compile(&node), Err(SiftError::UnsupportedStructure { .. })));
    }
}
