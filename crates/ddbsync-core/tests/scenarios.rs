//! End-to-end scenarios for inference, reconciliation and rendering.

use ddbsync_core::prelude::*;

fn people() -> Vec<SourceRecord> {
    vec![
        SourceRecord::new().field("id", "1").field("name", "Alice"),
        SourceRecord::new()
            .field("id", "2")
            .field("name", "Bob")
            .field("age", 30),
    ]
}

/// Simulates applying a plan to a target catalog.
fn apply(plan: &MigrationPlan, dialect: &dyn TargetDialect, catalog: &mut Vec<ExistingColumn>) {
    let creating = matches!(plan, MigrationPlan::CreateTable { .. });
    for column in plan.columns() {
        let mut existing = ExistingColumn::new(column.name.clone(), dialect.type_name(column));
        existing.is_primary_key = creating && column.is_primary_key;
        catalog.push(existing);
    }
}

#[test]
fn heterogeneous_records_produce_three_columns() {
    let schema = infer(&people(), &KeySchema::new("id")).expect("records are not empty");

    assert_eq!(schema.len(), 3);

    let id = schema.get("id").unwrap();
    assert_eq!(id.category, TypeCategory::Integer);
    assert!(id.is_primary_key);

    let name = schema.get("name").unwrap();
    assert_eq!(name.category, TypeCategory::Varchar);
    // "Alice" (5) + 2
    assert_eq!(name.length, 7);

    let age = schema.get("age").unwrap();
    assert_eq!(age.category, TypeCategory::Integer);
    assert!(!age.is_primary_key);
}

#[test]
fn second_run_against_unchanged_records_is_a_no_op() {
    let dialect = MySqlDialect::new();
    let schema = infer(&people(), &KeySchema::new("id")).unwrap();

    let first = reconcile("people", &schema, None);
    assert!(matches!(first, MigrationPlan::CreateTable { .. }));

    let mut catalog = Vec::new();
    apply(&first, &dialect, &mut catalog);

    let again = infer(&people(), &KeySchema::new("id")).unwrap();
    let second = reconcile("people", &again, Some(catalog.as_slice()));
    assert!(matches!(second, MigrationPlan::AddColumns { .. }));
    assert!(second.is_empty());
    assert!(dialect.plan_statements(&second, &TableOptions::default()).is_empty());
}

#[test]
fn new_field_evolves_existing_table() {
    let dialect = MySqlDialect::new();
    let keys = KeySchema::new("id");

    let schema = infer(&people(), &keys).unwrap();
    let mut catalog = Vec::new();
    apply(&reconcile("people", &schema, None), &dialect, &mut catalog);

    let mut grown = people();
    grown.push(
        SourceRecord::new()
            .field("id", "3")
            .field("name", "Carol")
            .field("email", "carol@example.com")
            .field("score", 9.5),
    );
    let schema = infer(&grown, &keys).unwrap();
    let plan = reconcile("people", &schema, Some(catalog.as_slice()));

    let statements = dialect.plan_statements(&plan, &TableOptions::default());
    assert_eq!(
        statements,
        vec![
            "ALTER TABLE `people` ADD COLUMN `email` VARCHAR(25)",
            "ALTER TABLE `people` ADD COLUMN `score` DECIMAL(6, 2)",
        ]
    );

    apply(&plan, &dialect, &mut catalog);
    assert!(reconcile("people", &schema, Some(catalog.as_slice())).is_empty());
}

#[test]
fn signed_numbers_classify_as_decimal() {
    assert_eq!(classify(&ScalarValue::Int(-3)), TypeCategory::Decimal);
    assert_eq!(classify(&ScalarValue::Int(5)), TypeCategory::Integer);
    assert_eq!(classify(&ScalarValue::from("12.0")), TypeCategory::Text);

    let records = vec![
        SourceRecord::new().field("id", "1").field("n", 5),
        SourceRecord::new().field("id", "2").field("n", "12.0"),
    ];
    let schema = infer(&records, &KeySchema::new("id")).unwrap();
    // The string "12.0" is text, not decimal, so the column becomes text.
    assert_eq!(schema.get("n").unwrap().category, TypeCategory::Varchar);
}

#[test]
fn create_plan_renders_for_both_dialects() {
    let keys = KeySchema::new("id").other_key("name");
    let schema = infer(&people(), &keys).unwrap();
    let plan = reconcile("people", &schema, None);

    let mysql = MySqlDialect::new().plan_statements(&plan, &TableOptions::default());
    assert_eq!(
        mysql,
        vec![
            "CREATE TABLE IF NOT EXISTS `people` (`name` VARCHAR(7), INDEX(`name`), \
             `id` BIGINT PRIMARY KEY, `age` BIGINT) ENGINE=InnoDB DEFAULT CHARSET=utf8"
        ]
    );

    let sqlite = SqliteDialect::new().plan_statements(&plan, &TableOptions::default());
    assert_eq!(sqlite.len(), 2);
    assert!(sqlite[1].contains("\"idx_people_name\""));
}
