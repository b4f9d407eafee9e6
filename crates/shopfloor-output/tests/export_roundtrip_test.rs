//! Export then reload an enriched store.

use shopfloor_data::{LoadOptions, RecordStore, load_records};
use shopfloor_features::tag_holidays;
use shopfloor_output::export_store;
use std::fs;

const TRAIN: &str = "\
Store,Date,Sales,CompetitionDistance,StateHoliday
1,2014-01-01,0,1270.5,a
2,2014-01-02,6064,,0
1,2014-01-02,5020,1270.5,0
";

fn load(contents: &str, dir: &tempfile::TempDir, name: &str) -> RecordStore {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    load_records(&path, &LoadOptions::new("Date").with_key_column("Store")).unwrap()
}

#[test]
fn test_export_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = tag_holidays(load(TRAIN, &dir, "train.csv"), &[2014]).into_store();

    let path = export_store(&store, dir.path().join("out"), "clean.csv").unwrap();
    let reloaded = load_records(&path, &LoadOptions::new("Date")).unwrap();

    assert_eq!(reloaded.shape(), store.shape());
    assert_eq!(reloaded.column_names(), store.column_names());
    assert_eq!(reloaded.index_dates().unwrap(), store.index_dates().unwrap());
    for column in ["Store", "Sales", "CompetitionDistance", "is_holiday"] {
        assert_eq!(
            reloaded.numeric_values(column).unwrap(),
            store.numeric_values(column).unwrap(),
            "{column}"
        );
    }
    assert!(
        reloaded
            .column("StateHoliday")
            .unwrap()
            .as_materialized_series()
            .equals_missing(store.column("StateHoliday").unwrap().as_materialized_series())
    );
}

#[test]
fn test_export_twice_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let first = load(TRAIN, &dir, "first.csv");
    let second = load(
        "Store,Date,Sales,CompetitionDistance,StateHoliday\n3,2015-07-31,8314,14130,0\n",
        &dir,
        "second.csv",
    );

    export_store(&first, dir.path(), "clean.csv").unwrap();
    let path = export_store(&second, dir.path(), "clean.csv").unwrap();

    let reloaded = load_records(&path, &LoadOptions::new("Date")).unwrap();
    assert_eq!(reloaded.height(), 1);
}
