//! Filter transpilers.
//!
//! One [`FilterCompiler`] capability, two targets:
//!
//! | Target | Compiler | Output |
//! |--------|----------|--------|
//! | Nested predicate store | [`PredicateCompiler`] | [`Predicate`] |
//! | Flat CQL string | [`CqlCompiler`] | `String` |

pub mod array;
pub mod cql;
pub mod predicate;

pub use array::ArrayStrategy;
pub use cql::CqlCompiler;
pub use predicate::PredicateCompiler;

use crate::ast::{AttributeTypeMap, FilterNode};
use crate::error::SiftResult;
use crate::predicate::Predicate;

/// Deepest filter nesting accepted before compilation is refused.
pub const MAX_FILTER_DEPTH: usize = 64;

/// Compiles a filter tree for one backend.
pub trait FilterCompiler {
    type Output;

    /// Backend name used in error messages.
    fn backend(&self) -> &'static str;

    fn compile(&self, node: &FilterNode) -> SiftResult<Self::Output>;
}

/// Trait for compiling filter nodes into nested predicates.
pub trait ToPredicate {
    fn to_predicate(&self, types: &AttributeTypeMap) -> SiftResult<Predicate>;
}

/// Trait for compiling filter nodes into CQL.
pub trait ToCql {
    fn to_cql(&self, types: &AttributeTypeMap, allow_filtering: bool) -> SiftResult<String>;
}

impl ToPredicate for FilterNode {
    fn to_predicate(&self, types: &AttributeTypeMap) -> SiftResult<Predicate> {
        compile_predicate(self, types)
    }
}

impl ToCql for FilterNode {
    fn to_cql(&self, types: &AttributeTypeMap, allow_filtering: bool) -> SiftResult<String> {
        compile_expression_string(self, types, allow_filtering)
    }
}

/// Compile for the nested predicate backend.
pub fn compile_predicate(node: &FilterNode, types: &AttributeTypeMap) -> SiftResult<Predicate> {
    PredicateCompiler::new(types).compile(node)
}

/// Compile for the flat string backend. `allow_broad_scan` appends the
/// full-scan directive.
pub fn compile_expression_string(
    node: &FilterNode,
    types: &AttributeTypeMap,
    allow_broad_scan: bool,
) -> SiftResult<String> {
    CqlCompiler::new(types)
        .allow_filtering(allow_broad_scan)
        .compile(node)
}
