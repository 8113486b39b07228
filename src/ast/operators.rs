use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SiftError;

/// Filter operators understood by the compilers.
///
/// The wire names follow the filter input vocabulary (`eq`, `notIn`, `_in`,
/// ...). Each backend decides which subset it can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Membership in a list. `_in` is accepted as an alias.
    In,
    /// Non-membership in a list
    NotIn,
    /// LIKE pattern match
    Like,
    /// NOT LIKE pattern match
    NotLike,
    /// Case-insensitive LIKE
    ILike,
    /// Case-insensitive NOT LIKE
    NotILike,
    /// Regular expression match
    Regexp,
    /// Negated regular expression match
    NotRegexp,
    /// BETWEEN x AND y (value is a two element list)
    Between,
    /// NOT BETWEEN x AND y
    NotBetween,
    /// IS (null / boolean identity)
    Is,
    /// Logical negation
    Not,
    /// Logical conjunction
    And,
    /// Logical disjunction
    Or,
    /// Collection contains value (CQL `CONTAINS`)
    Contains,
    /// Map contains key (CQL `CONTAINS KEY`)
    ContainsKey,
    /// Partition token less than (CQL `token(col) < token(v)`)
    TokenLt,
    /// Partition token greater than (CQL `token(col) > token(v)`)
    TokenGt,
}

impl Operator {
    /// Every operator, in reference order.
    pub const ALL: [Operator; 24] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::Like,
        Operator::NotLike,
        Operator::ILike,
        Operator::NotILike,
        Operator::Regexp,
        Operator::NotRegexp,
        Operator::Between,
        Operator::NotBetween,
        Operator::Is,
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Contains,
        Operator::ContainsKey,
        Operator::TokenLt,
        Operator::TokenGt,
    ];

    /// The operator's name in filter input.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Like => "like",
            Operator::NotLike => "notLike",
            Operator::ILike => "iLike",
            Operator::NotILike => "notILike",
            Operator::Regexp => "regexp",
            Operator::NotRegexp => "notRegexp",
            Operator::Between => "between",
            Operator::NotBetween => "notBetween",
            Operator::Is => "is",
            Operator::Not => "not",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Contains => "cont",
            Operator::ContainsKey => "ctk",
            Operator::TokenLt => "tlt",
            Operator::TokenGt => "tgt",
        }
    }

    /// Key used in the nested predicate rendering (`$gte`, `$notIn`, ...).
    pub fn predicate_key(&self) -> String {
        format!("${}", self.name())
    }

    /// Returns true for the logical combinators.
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }

    /// Symbol used when a predicate is displayed as text.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::Regexp => "REGEXP",
            Operator::NotRegexp => "NOT REGEXP",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::Is => "IS",
            Operator::Not => "NOT",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Contains => "CONTAINS",
            Operator::ContainsKey => "CONTAINS KEY",
            Operator::TokenLt => "<",
            Operator::TokenGt => ">",
        }
    }
}

impl FromStr for Operator {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "_in" {
            return Ok(Operator::In);
        }
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| SiftError::UnknownOperator(s.to_string()))
    }
}

impl TryFrom<String> for Operator {
    type Error = SiftError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.name().to_string()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sort order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction token regardless of case (`asc`, `Desc`, ...).
    pub fn parse_ignore_case(token: &str) -> Result<Self, SiftError> {
        token.trim().to_ascii_uppercase().parse()
    }

    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = SiftError;

    /// Strict parse: only upper-case `ASC` / `DESC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(SiftError::InvalidOrder(format!(
                "direction '{}' (expected ASC or DESC)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}
