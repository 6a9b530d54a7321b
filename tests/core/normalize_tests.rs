//! Tests for the column name normalization system
//!
//! Tests cover:
//! - Built-in alias mappings
//! - Custom alias support
//! - Idempotence
//! - Ambiguous and missing channel detection

use std::collections::HashMap;
use idclog::normalize::{
    get_builtin_mappings, normalize_column_name, normalize_columns, require_current_channels,
    ColumnAliases, SchemaError,
};
use idclog::parsers::types::LogTable;

fn table_with_columns(columns: &[&str]) -> LogTable {
    LogTable::from_records(columns.iter().map(|c| c.to_string()).collect(), vec![])
}

// ============================================
// Basic Normalization Tests
// ============================================

#[test]
fn test_normalize_channel_variants() {
    let aliases = ColumnAliases::builtin();
    assert_eq!(normalize_column_name("Idc1(A)", &aliases), "Idc_1(A)");
    assert_eq!(normalize_column_name("Idc 1(A)", &aliases), "Idc_1(A)");
    assert_eq!(normalize_column_name("Idc2(A)", &aliases), "Idc_2(A)");
    assert_eq!(normalize_column_name("Idc 2(A)", &aliases), "Idc_2(A)");
    assert_eq!(normalize_column_name("Idc3(A)", &aliases), "Idc_3(A)");
    assert_eq!(normalize_column_name("Idc 3(A)", &aliases), "Idc_3(A)");
}

#[test]
fn test_normalize_trims_whitespace() {
    let aliases = ColumnAliases::builtin();
    assert_eq!(normalize_column_name("  Date ", &aliases), "Date");
    assert_eq!(normalize_column_name(" Idc1(A)\t", &aliases), "Idc_1(A)");
}

#[test]
fn test_normalize_is_case_sensitive() {
    let aliases = ColumnAliases::builtin();
    assert_eq!(normalize_column_name("idc1(a)", &aliases), "idc1(a)");
    assert_eq!(normalize_column_name("IDC 1(A)", &aliases), "IDC 1(A)");
}

#[test]
fn test_builtin_mappings_cover_all_channels() {
    let mappings = get_builtin_mappings();
    let canonical: Vec<&str> = mappings.iter().map(|(c, _)| *c).collect();
    assert_eq!(canonical, vec!["Idc_1(A)", "Idc_2(A)", "Idc_3(A)"]);
    assert_eq!(ColumnAliases::builtin().len(), 6);
}

// ============================================
// Table Normalization Tests
// ============================================

#[test]
fn test_normalize_columns_is_idempotent() {
    let aliases = ColumnAliases::builtin();
    let table = table_with_columns(&[" Date", "Time ", "Idc1(A)", "Idc 2(A)", "Idc_3(A)", "Other"]);

    let once = normalize_columns(table, &aliases).unwrap();
    let twice = normalize_columns(once.clone(), &aliases).unwrap();

    assert_eq!(once.columns, twice.columns);
    assert_eq!(
        once.columns,
        vec!["Date", "Time", "Idc_1(A)", "Idc_2(A)", "Idc_3(A)", "Other"]
    );
}

#[test]
fn test_normalize_columns_is_idempotent_with_chained_custom_aliases() {
    let mut custom = HashMap::new();
    custom.insert("I1".to_string(), "Current1".to_string());
    custom.insert("Current1".to_string(), "Idc_1(A)".to_string());
    let aliases = ColumnAliases::with_custom(&custom);
    let table = table_with_columns(&["I1", "Idc_2(A)", "Idc_3(A)"]);

    let once = normalize_columns(table, &aliases).unwrap();
    let twice = normalize_columns(once.clone(), &aliases).unwrap();

    assert_eq!(once.columns, vec!["Idc_1(A)", "Idc_2(A)", "Idc_3(A)"]);
    assert_eq!(once.columns, twice.columns);
    assert!(require_current_channels(&once).is_ok());
}

#[test]
fn test_alias_next_to_canonical_is_ambiguous() {
    let table = table_with_columns(&["Idc_1(A)", "Idc1(A)", "Idc_2(A)", "Idc_3(A)"]);
    let err = normalize_columns(table, &ColumnAliases::builtin()).unwrap_err();
    assert_eq!(
        err,
        SchemaError::AmbiguousColumn {
            column: "Idc_1(A)".to_string(),
            sources: vec!["Idc_1(A)".to_string(), "Idc1(A)".to_string()],
        }
    );
}

#[test]
fn test_two_aliases_of_one_channel_are_ambiguous() {
    let table = table_with_columns(&["Idc 2(A)", "Idc2(A)"]);
    let err = normalize_columns(table, &ColumnAliases::builtin()).unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousColumn { column, .. } if column == "Idc_2(A)"));
}

// ============================================
// Custom Alias Tests
// ============================================

#[test]
fn test_custom_aliases() {
    let mut custom = HashMap::new();
    custom.insert("CH1 [A]".to_string(), "Idc_1(A)".to_string());
    custom.insert("Idc1(A)".to_string(), "Something else".to_string());
    let aliases = ColumnAliases::with_custom(&custom);

    assert_eq!(normalize_column_name("CH1 [A]", &aliases), "Idc_1(A)");
    // Built-in aliases cannot be remapped
    assert_eq!(normalize_column_name("Idc1(A)", &aliases), "Idc_1(A)");
    assert_eq!(aliases.len(), 7);
}

#[test]
fn test_custom_alias_to_builtin_alias_resolves_to_canonical() {
    let mut custom = HashMap::new();
    custom.insert("I1".to_string(), "Idc1(A)".to_string());
    let aliases = ColumnAliases::with_custom(&custom);

    assert_eq!(normalize_column_name("I1", &aliases), "Idc_1(A)");
    assert_eq!(aliases.canonical_name("I1"), Some("Idc_1(A)"));
}

#[test]
fn test_custom_alias_cycle_is_dropped() {
    let mut custom = HashMap::new();
    custom.insert("A".to_string(), "B".to_string());
    custom.insert("B".to_string(), "A".to_string());
    let aliases = ColumnAliases::with_custom(&custom);

    assert_eq!(normalize_column_name("A", &aliases), "A");
    assert_eq!(normalize_column_name("B", &aliases), "B");
    assert_eq!(aliases, ColumnAliases::builtin());
}

#[test]
fn test_custom_cycle_through_builtin_alias_keeps_builtin() {
    let mut custom = HashMap::new();
    custom.insert("Idc_1(A)".to_string(), "Idc1(A)".to_string());
    let aliases = ColumnAliases::with_custom(&custom);

    assert_eq!(normalize_column_name("Idc1(A)", &aliases), "Idc_1(A)");
    assert_eq!(normalize_column_name("Idc_1(A)", &aliases), "Idc_1(A)");
}

// ============================================
// Required Channel Tests
// ============================================

#[test]
fn test_required_channels_present() {
    let table = table_with_columns(&["Idc_3(A)", "Idc_2(A)", "Idc_1(A)"]);
    assert!(require_current_channels(&table).is_ok());
}

#[test]
fn test_missing_channels_listed_in_order() {
    let table = table_with_columns(&["Date", "Idc_2(A)"]);
    assert_eq!(
        require_current_channels(&table).unwrap_err(),
        SchemaError::MissingChannels(vec!["Idc_1(A)".to_string(), "Idc_3(A)".to_string()])
    );
}
