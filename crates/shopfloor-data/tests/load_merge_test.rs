//! Integration tests for loading, joining and auditing sales data.

use rstest::rstest;
use shopfloor_data::{
    ColumnType, DataError, LoadOptions, audit_missing_values, load_attributes, load_records,
    merge_left,
};
use std::fs;
use std::path::PathBuf;

const TRAIN: &str = "\
Store,DayOfWeek,Date,Sales,Customers,Open,Promo,StateHoliday,SchoolHoliday
1,5,2015-07-31,5263,555,1,1,0,1
2,5,2015-07-31,6064,625,1,1,0,1
3,5,2015-07-31,8314,821,1,1,0,1
1,4,2015-07-30,5020,546,1,1,0,1
2,4,2015-07-30,0,0,0,0,a,1
9,4,2015-07-30,4000,500,1,0,0,0
";

const STORE: &str = "\
Store,StoreType,Assortment,CompetitionDistance,Promo2SinceWeek,PromoInterval
1,c,a,1270,,
2,a,a,570,13,\"Jan,Apr,Jul,Oct\"
3,a,a,14130,14,\"Jan,Apr,Jul,Oct\"
4,c,c,,,
";

fn fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_train() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "train.csv", TRAIN);
    let options = LoadOptions::new("Date").with_key_column("Store");
    let store = load_records(&path, &options).unwrap();

    assert_eq!(store.shape(), (6, 9));
    assert_eq!(store.index_column(), "Date");
    assert_eq!(store.column_type("Sales").unwrap(), Some(ColumnType::Integer));
    assert_eq!(store.column_type("StateHoliday").unwrap(), Some(ColumnType::Text));
}

const STORE_WITH_NINE: &str = "\
Store,StoreType,Assortment,CompetitionDistance,Promo2SinceWeek,PromoInterval
1,c,a,1270,,
2,a,a,570,13,\"Jan,Apr,Jul,Oct\"
3,a,a,14130,14,\"Jan,Apr,Jul,Oct\"
9,a,c,2030,,
";

#[rstest]
#[case::with_unmatched(STORE)]
#[case::all_matched(STORE_WITH_NINE)]
fn test_merge_preserves_row_count(#[case] attributes_csv: &str) {
    let dir = tempfile::tempdir().unwrap();
    let records = load_records(
        fixture(&dir, "train.csv", TRAIN),
        &LoadOptions::new("Date"),
    )
    .unwrap();
    let attributes = load_attributes(
        fixture(&dir, "store.csv", attributes_csv),
        "Store",
        &LoadOptions::default(),
    )
    .unwrap();

    let merged = merge_left(&records, &attributes, "Store").unwrap();
    assert_eq!(merged.height(), records.height());
    assert_eq!(merged.width(), records.width() + attributes.frame().width() - 1);
}

#[test]
fn test_merge_unmatched_store_gets_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let records = load_records(
        fixture(&dir, "train.csv", TRAIN),
        &LoadOptions::new("Date"),
    )
    .unwrap();
    let attributes = load_attributes(
        fixture(&dir, "store.csv", STORE),
        "Store",
        &LoadOptions::default(),
    )
    .unwrap();

    let merged = merge_left(&records, &attributes, "Store").unwrap();
    let store_type = merged.column("StoreType").unwrap().str().unwrap();
    assert_eq!(store_type.get(5), None);
    assert_eq!(store_type.null_count(), 1);
}

#[test]
fn test_audit_after_merge() {
    let dir = tempfile::tempdir().unwrap();
    let records = load_records(
        fixture(&dir, "train.csv", TRAIN),
        &LoadOptions::new("Date"),
    )
    .unwrap();
    let attributes = load_attributes(
        fixture(&dir, "store.csv", STORE),
        "Store",
        &LoadOptions::default(),
    )
    .unwrap();
    let merged = merge_left(&records, &attributes, "Store").unwrap();

    let report = audit_missing_values(&merged).unwrap();
    assert!(report.entries.iter().all(|e| e.missing_percent != 0.0));
    assert!(
        report
            .entries
            .windows(2)
            .all(|w| w[0].missing_percent >= w[1].missing_percent)
    );
    // Store 1 and store 9 have no promo interval.
    let promo_interval = report.get("PromoInterval").unwrap();
    assert_eq!(promo_interval.missing_count, 3);
    assert!(report.get("Sales").is_none());
}

#[test]
fn test_missing_merge_key_is_structural_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_attributes(
        fixture(&dir, "store.csv", STORE),
        "StoreId",
        &LoadOptions::default(),
    );
    assert!(matches!(result, Err(DataError::MissingColumn { .. })));
}
