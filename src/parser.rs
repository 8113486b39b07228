//! Small text grammars using nom.
//!
//! # Order lists
//!
//! ```text
//! age|DESC, name, ^!created_at, id|ASC
//! ──┬─ ─┬─  ─┬──  ─────┬──────
//!   │   │    │         └── Peak shorthand: ^field (ASC) / ^!field (DESC)
//!   │   │    └── Bare field, ascending
//!   │   └── Direction token, upper-case only
//!   └── Field name
//! ```
//!
//! # Attribute types
//!
//! `String`, `Int`, `[String]`, `[ DateTime ]`. Whitespace is ignored and a
//! leading `[` marks an array-shaped attribute.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::ast::{AttributeType, OrderEntry, OrderList, SortDirection};
use crate::error::{SiftError, SiftResult};

/// Parse an order string such as `age|DESC,id|ASC`.
pub fn parse_order(input: &str) -> SiftResult<OrderList> {
    let input = input.trim();

    match parse_order_entries(input) {
        Ok(("", entries)) => Ok(OrderList::new(entries)),
        Ok((remaining, _)) => Err(SiftError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(SiftError::parse(0, format!("Parse failed: {:?}", e))),
    }
}

/// Parse an attribute type declaration such as `[String]`.
pub fn parse_attribute_type(input: &str) -> SiftResult<AttributeType> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    match parse_type(&compact) {
        Ok(("", ty)) => Ok(ty),
        Ok((remaining, _)) => Err(SiftError::parse(
            compact.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(SiftError::parse(0, format!("Parse failed: {:?}", e))),
    }
}

fn parse_order_entries(input: &str) -> IResult<&str, Vec<OrderEntry>> {
    separated_list1(
        tuple((multispace0, char(','), multispace0)),
        alt((parse_peak_entry, parse_piped_entry)),
    )(input)
}

/// `^field` or `^!field`.
fn parse_peak_entry(input: &str) -> IResult<&str, OrderEntry> {
    let (input, _) = char('^')(input)?;
    let (input, desc) = opt(char('!'))(input)?;
    let (input, field) = parse_field(input)?;

    let direction = if desc.is_some() {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    Ok((input, OrderEntry::new(field, direction)))
}

/// `field`, `field|DIR` or `field DIR`.
fn parse_piped_entry(input: &str) -> IResult<&str, OrderEntry> {
    let (input, field) = parse_field(input)?;
    let (input, direction) = opt(preceded(
        alt((
            delimited(multispace0, tag("|"), multispace0),
            take_while1(|c: char| c == ' ' || c == '\t'),
        )),
        parse_direction,
    ))(input)?;

    Ok((
        input,
        OrderEntry::new(field, direction.unwrap_or(SortDirection::Asc)),
    ))
}

fn parse_direction(input: &str) -> IResult<&str, SortDirection> {
    alt((
        value(SortDirection::Desc, tag("DESC")),
        value(SortDirection::Asc, tag("ASC")),
    ))(input)
}

/// Field names may be dotted (`author.name`).
fn parse_field(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

fn parse_type(input: &str) -> IResult<&str, AttributeType> {
    alt((
        map(delimited(char('['), parse_type_name, char(']')), |name| {
            AttributeType::Array(Box::new(AttributeType::Scalar(name.to_string())))
        }),
        map(parse_type_name, |name| AttributeType::Scalar(name.to_string())),
    ))(input)
}

/// GraphQL style names, with an optional non-null `!`.
fn parse_type_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '!')(input)
}
