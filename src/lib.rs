//! # SiftQL — Keyset Pagination & Filter Compiler
//!
//! > **Describe the page. Let the backend find it.**
//!
//! SiftQL turns a sort order, a cursor record and a nested search tree into
//! backend conditions: a nested predicate for stores with full boolean
//! nesting, and a flat CQL `WHERE` fragment for wide-column stores.
//!
//! ## Quick Example
//!
//! ```rust
//! use siftql::prelude::*;
//!
//! let order = siftql::parse_order("age|DESC,id|ASC").unwrap();
//! let cursor = record([("age", 30), ("id", 7)]);
//! let after = build_after(&order, &cursor, "id", false);
//! assert_eq!(after.to_string(), "(age <= 30 AND (age < 30 OR id > 7))");
//!
//! let types = AttributeTypeMap::new().with("name", "String");
//! let search = FilterNode::and(vec![
//!     FilterNode::leaf("age", Operator::Gt, 10),
//!     FilterNode::leaf("name", Operator::Eq, "Bob"),
//! ]);
//! let cql = compile_expression_string(&search, &types, false).unwrap();
//! assert_eq!(cql, "age > 10 and name = 'Bob'");
//! ```
//!
//! ## Modules
//!
//! | Module         | Function                                         |
//! |----------------|--------------------------------------------------|
//! | [`cursor`]     | Keyset conditions after/before a cursor          |
//! | [`transpiler`] | Search tree to predicate or CQL                  |
//! | [`predicate`]  | Nested predicate, JSON rendering, evaluation     |
//! | [`paginate`]   | Client-side ordering and limit                   |
//! | [`connection`] | Items with position tokens, continuation info    |
//! | [`existence`]  | Concurrent "which ids are missing" check         |
//! | [`config`]     | `siftql.toml`                                    |

pub mod ast;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod existence;
pub mod paginate;
pub mod parser;
pub mod predicate;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::SiftConfig;
    pub use crate::connection::{
        assemble, decode_position, Connection, Edge, KeysetEncoder, PositionEncoder,
        RecordEncoder,
    };
    pub use crate::cursor::{build_after, build_before, CursorCondition, Fallback, PageDirection};
    pub use crate::error::*;
    pub use crate::existence::{id_filter, missing};
    pub use crate::paginate::{order_records, paginate_records};
    pub use crate::parser::{parse_attribute_type, parse_order};
    pub use crate::predicate::Predicate;
    pub use crate::transpiler::{
        compile_expression_string, compile_predicate, ArrayStrategy, CqlCompiler,
        FilterCompiler, PredicateCompiler, ToCql, ToPredicate,
    };
}

/// Parse an order string into an order list.
///
/// # Example
///
/// ```
/// use siftql::parse_order;
///
/// let order = parse_order("age|DESC,id").unwrap();
/// assert_eq!(order.to_string(), "age DESC, id ASC");
/// ```
pub fn parse_order(input: &str) -> error::SiftResult<ast::OrderList> {
    parser::parse_order(input)
}
