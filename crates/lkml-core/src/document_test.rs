use super::*;

fn loc(line: u32) -> SourceLocation {
    SourceLocation::point("views/orders.view.lkml", line, 1)
}

fn prop(name: &str, value: Value, line: u32) -> Property {
    Property {
        name: name.to_string(),
        value,
        location: loc(line),
    }
}

fn dimension(name: &str, properties: Vec<Property>) -> Block {
    Block {
        kind: BlockKind::Dimension,
        name: Some(name.to_string()),
        properties,
        children: vec![],
        location: loc(2),
    }
}

#[test]
fn block_kind_round_trips_keywords() {
    for keyword in ["view", "explore", "dimension_group", "measure", "join", "map_layer"] {
        assert_eq!(BlockKind::from_keyword(keyword).as_str(), keyword);
    }
    let unknown = BlockKind::from_keyword("flux_capacitor");
    assert_eq!(unknown, BlockKind::Other("flux_capacitor".to_string()));
    assert!(!unknown.is_known());
}

#[test]
fn field_kinds() {
    assert!(BlockKind::Dimension.is_field());
    assert!(BlockKind::Parameter.is_field());
    assert!(!BlockKind::Join.is_field());
    assert!(!BlockKind::View.is_field());
}

#[test]
fn last_property_wins() {
    let block = dimension(
        "status",
        vec![
            prop("label", Value::String("First".into()), 3),
            prop("label", Value::String("Second".into()), 4),
        ],
    );
    assert_eq!(block.get_str("label"), Some("Second"));
    assert_eq!(block.occurrences("label").count(), 2);

    let dups = block.duplicate_properties();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].0, "label");
    assert_eq!(dups[0].1[0].location.line, 3);
    assert_eq!(dups[0].1[1].location.line, 4);
}

#[test]
fn repeatable_properties_are_not_duplicates() {
    let block = dimension(
        "status",
        vec![
            prop("link", Value::String("a".into()), 3),
            prop("link", Value::String("b".into()), 4),
        ],
    );
    assert!(block.duplicate_properties().is_empty());
}

#[test]
fn hidden_and_type_helpers() {
    let block = dimension(
        "id",
        vec![
            prop("type", Value::String("number".into()), 3),
            prop("hidden", Value::Bool(true), 4),
        ],
    );
    assert_eq!(block.field_type(), Some("number"));
    assert!(block.is_hidden());
    assert!(!dimension("x", vec![]).is_hidden());
}

#[test]
fn value_strings_accepts_scalar_and_list() {
    let scalar = Value::String("base".into());
    assert_eq!(scalar.strings(), vec!["base"]);

    let list = Value::List(vec![
        Value::String("a".into()),
        Value::Number(1.0),
        Value::String("b".into()),
    ]);
    assert_eq!(list.strings(), vec!["a", "b"]);
}

#[test]
fn descendants_include_anonymous_blocks() {
    let derived = Block {
        kind: BlockKind::DerivedTable,
        name: None,
        properties: vec![prop("sql", Value::String("SELECT 1".into()), 3)],
        children: vec![],
        location: loc(2),
    };
    let view = Block {
        kind: BlockKind::View,
        name: Some("orders".into()),
        properties: vec![prop("derived_table", Value::Block(Box::new(derived)), 2)],
        children: vec![dimension("id", vec![])],
        location: loc(1),
    };
    let kinds: Vec<&str> = view.descendants().iter().map(|b| b.kind.as_str()).collect();
    assert_eq!(kinds, vec!["view", "derived_table", "dimension"]);
}

#[test]
fn document_file_helpers() {
    let doc = Document {
        path: "project/views/orders.view.lkml".into(),
        properties: vec![],
        blocks: vec![],
    };
    assert!(doc.is_view_file());
    assert!(!doc.is_model_file());
    assert_eq!(doc.file_name(), "orders.view.lkml");
    assert_eq!(doc.stem(), "orders");
}

#[test]
fn document_includes_flatten_lists() {
    let doc = Document {
        path: "shop.model.lkml".into(),
        properties: vec![
            prop("include", Value::String("views/*.view.lkml".into()), 1),
            prop(
                "include",
                Value::List(vec![Value::String("/explores/*.lkml".into())]),
                2,
            ),
        ],
        blocks: vec![],
    };
    assert!(doc.is_model_file());
    assert_eq!(doc.includes(), vec!["views/*.view.lkml", "/explores/*.lkml"]);
}

#[test]
fn block_kind_serializes_as_keyword() {
    let json = serde_json::to_string(&BlockKind::DimensionGroup).unwrap();
    assert_eq!(json, r#""dimension_group""#);
    let back: BlockKind = serde_json::from_str(r#""widget""#).unwrap();
    assert_eq!(back, BlockKind::Other("widget".into()));
}
