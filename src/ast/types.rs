use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SiftResult;
use crate::parser::parse_attribute_type;

/// Declared types whose literals must be quoted.
pub const QUOTED_TYPES: [&str; 4] = ["String", "Date", "DateTime", "Time"];

/// A parsed attribute type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    /// `Int`, `String`, `DateTime`, ...
    Scalar(String),
    /// `[String]`: stored as a delimited string `[v1,v2,v3]`
    Array(Box<AttributeType>),
}

impl AttributeType {
    /// Interpret a declaration leniently: anything with a leading `[` is
    /// array-shaped even if the strict parser rejects it.
    pub fn from_decl(decl: &str) -> Self {
        match parse_attribute_type(decl) {
            Ok(ty) => ty,
            Err(_) => {
                let compact: String = decl.chars().filter(|c| !c.is_whitespace()).collect();
                match compact.strip_prefix('[') {
                    Some(rest) => AttributeType::Array(Box::new(AttributeType::Scalar(
                        rest.trim_end_matches(']').to_string(),
                    ))),
                    None => AttributeType::Scalar(compact),
                }
            }
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, AttributeType::Array(_))
    }

    /// Element type for arrays, the type itself for scalars.
    pub fn element(&self) -> &AttributeType {
        match self {
            AttributeType::Array(inner) => inner,
            scalar => scalar,
        }
    }

    /// Whether literals of this (scalar) type are quoted.
    pub fn is_quoted(&self) -> bool {
        match self {
            AttributeType::Scalar(name) => QUOTED_TYPES.contains(&name.as_str()),
            AttributeType::Array(_) => false,
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Scalar(name) => write!(f, "{}", name),
            AttributeType::Array(inner) => write!(f, "[{}]", inner),
        }
    }
}

/// Field name to declared type string, as found in a model definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTypeMap(HashMap<String, String>);

impl AttributeTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, decl: impl Into<String>) {
        self.0.insert(field.into(), decl.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, decl: impl Into<String>) -> Self {
        self.insert(field, decl);
        self
    }

    pub fn declaration(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<AttributeType> {
        self.declaration(field).map(AttributeType::from_decl)
    }

    pub fn is_array(&self, field: &str) -> bool {
        self.get(field).is_some_and(|ty| ty.is_array())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strictly parse every declaration.
    pub fn validate(&self) -> SiftResult<()> {
        for decl in self.0.values() {
            parse_attribute_type(decl)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeTypeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
