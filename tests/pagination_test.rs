//! Cursor conditions checked against an in-memory record set.
//!
//! For every record used as a cursor, the records matched by the condition
//! must be exactly the ones sorted after (or before) it.

use pretty_assertions::assert_eq;
use siftql::prelude::*;

fn people() -> Vec<Record> {
    let rows: [(i64, &str, i64); 8] = [
        (1, "ann", 30),
        (2, "bob", 25),
        (3, "cat", 30),
        (4, "ann", 30),
        (5, "dan", 41),
        (6, "bob", 25),
        (7, "eve", 19),
        (8, "cat", 41),
    ];
    rows.iter()
        .map(|(id, name, age)| {
            record([
                ("id", Value::from(*id)),
                ("name", Value::from(*name)),
                ("age", Value::from(*age)),
            ])
        })
        .collect()
}

fn sorted(order: &OrderList) -> Vec<Record> {
    let keys: Vec<SortKey> = order.iter().map(SortKey::from).collect();
    order_records(people(), &keys)
}

fn ids(records: &[Record]) -> Vec<Value> {
    records.iter().map(|r| r["id"].clone()).collect()
}

fn matching(predicate: &Predicate, records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| predicate.matches(r).unwrap())
        .cloned()
        .collect()
}

fn check_order(order_text: &str) {
    let order = parse_order(order_text).unwrap();
    let all = sorted(&order);

    for (i, cursor) in all.iter().enumerate() {
        let after = build_after(&order, cursor, "id", false);
        assert_eq!(
            ids(&matching(&after, &all)),
            ids(&all[i + 1..]),
            "after cursor {:?} under {}",
            cursor,
            order
        );

        let before = build_before(&order, cursor, "id", false);
        assert_eq!(
            ids(&matching(&before, &all)),
            ids(&all[..i]),
            "before cursor {:?} under {}",
            cursor,
            order
        );

        let inclusive = build_after(&order, cursor, "id", true);
        assert_eq!(ids(&matching(&inclusive, &all)), ids(&all[i..]));

        let inclusive = build_before(&order, cursor, "id", true);
        assert_eq!(ids(&matching(&inclusive, &all)), ids(&all[..=i]));
    }
}

#[test]
fn test_single_id_order() {
    check_order("id|ASC");
    check_order("id|DESC");
}

#[test]
fn test_two_level_orders() {
    check_order("age|DESC,id|ASC");
    check_order("name|ASC,id|DESC");
}

#[test]
fn test_three_level_orders() {
    check_order("age|ASC,name|DESC,id|ASC");
    check_order("name|DESC,age|DESC,id|DESC");
}

#[test]
fn test_id_in_the_middle() {
    check_order("age|ASC,id|ASC,name|ASC");
}

#[test]
fn test_before_is_after_with_reversed_order() {
    let order = parse_order("age|DESC,name|ASC,id|ASC").unwrap();
    let reversed = order.reversed();
    for cursor in people() {
        assert_eq!(
            build_before(&order, &cursor, "id", false),
            build_after(&reversed, &cursor, "id", false)
        );
    }
}

#[test]
fn test_paging_through_the_whole_set() {
    let order = parse_order("age|DESC,id|ASC").unwrap();
    let keys: Vec<SortKey> = order.iter().map(SortKey::from).collect();
    let encoder = KeysetEncoder::new(["age", "id"]);

    let mut seen = Vec::new();
    let mut position: Option<String> = None;
    loop {
        let condition = match &position {
            Some(token) => build_after(&order, &decode_position(token).unwrap(), "id", false),
            None => Predicate::True,
        };
        let page = paginate_records(
            order_records(matching(&condition, &people()), &keys),
            3,
        );
        let has_more = matching(&condition, &people()).len() > page.len();
        let conn = assemble(page, &encoder, has_more).unwrap();

        seen.extend(conn.items.iter().map(|e| e.value["id"].clone()));
        if !conn.has_more {
            break;
        }
        position = conn.end_position;
    }

    assert_eq!(seen, ids(&sorted(&order)));
}

#[test]
fn test_cursor_combined_with_filter() {
    let order = parse_order("age|ASC,id|ASC").unwrap();
    let cursor = record([("age", 25), ("id", 6)]);
    let search = FilterNode::leaf("name", Operator::Ne, "cat");
    let filter = compile_predicate(&search, &AttributeTypeMap::new()).unwrap();
    let condition = Predicate::and_all([filter, build_after(&order, &cursor, "id", false)]);

    let result = matching(&condition, &sorted(&order));
    assert_eq!(
        ids(&result),
        vec![Value::Int(1), Value::Int(4), Value::Int(5)]
    );
}

#[test]
fn test_strict_policy_surfaces_defects() {
    let order = parse_order("age|ASC").unwrap();
    let cursor = record([("age", 25), ("id", 6)]);
    let result = CursorCondition::new(&order, &cursor, "id")
        .fallback(Fallback::Reject)
        .before();
    assert!(matches!(result, Err(SiftError::MalformedCursor(_))));
    assert_eq!(build_before(&order, &cursor, "id", false), Predicate::True);
}

#[test]
fn test_null_ordered_values_follow_sql_semantics() {
    let order = parse_order("age|DESC,id|ASC").unwrap();
    let keys: Vec<SortKey> = order.iter().map(SortKey::from).collect();
    let rows = vec![
        record([("id", Value::from(2)), ("age", Value::from(30))]),
        record([("id", Value::from(1)), ("age", Value::Null)]),
        record([("id", Value::from(3)), ("age", Value::from(20))]),
    ];

    let all = order_records(rows, &keys);
    assert_eq!(ids(&all), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    // Comparisons against a null cursor value are never true.
    let from_null = build_after(&order, &all[0], "id", false);
    assert!(matching(&from_null, &all).is_empty());

    // A null-valued record is never selected by a cursor condition.
    let before_third = build_before(&order, &all[2], "id", false);
    assert_eq!(ids(&matching(&before_third, &all)), vec![Value::Int(2)]);
}
