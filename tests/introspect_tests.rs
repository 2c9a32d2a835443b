mod common;

use common::*;
use std::fs;
use tempfile::tempdir;
use tquant_data::{Catalog, DataError, StoreConfig, TableAssembler};

#[test]
fn subfolders_report_distinct_value_columns() {
    init_test_logging();
    let tmp = tempdir().unwrap();
    let root = tmp.path();

    write_parquet(
        &root.join("收盤價").join("收盤價.parquet"),
        &raw_table("收盤價", &[("2024-01-02", "2330", 1.0)]),
    );
    write_parquet(
        &root.join("財報").join("a.parquet"),
        &text_table(&[
            ("mdate", vec!["x"]),
            ("coid", vec!["y"]),
            ("營收", vec!["1"]),
            ("__index_level_0__", vec!["0"]),
        ]),
    );
    write_parquet(
        &root.join("財報").join("b.parquet"),
        &text_table(&[("營收", vec!["1"]), ("淨利", vec!["2"])]),
    );
    fs::write(root.join("財報").join("c.parquet"), b"garbage").unwrap();
    write_parquet(
        &root.join("旗標").join("旗標.parquet"),
        &key_only_table(&[("2024-01-02", "2330")]),
    );
    fs::write(root.join("stray.parquet"), b"not a folder").unwrap();

    let assembler = TableAssembler::from_config(&StoreConfig::new(root.to_string_lossy(), ""));
    let scan = assembler.list_subfolders().unwrap();

    let names: Vec<&str> = scan.folders.iter().map(|f| f.name.as_str()).collect();
    let mut expected = vec!["收盤價", "財報", "旗標"];
    expected.sort();
    assert_eq!(names, expected);

    let report = scan.folders.iter().find(|f| f.name == "財報").unwrap();
    assert_eq!(report.distinct_column_count, 2);
    assert_eq!(report.distinct_column_names, vec!["淨利", "營收"]);

    let close = scan.folders.iter().find(|f| f.name == "收盤價").unwrap();
    assert_eq!(close.distinct_column_names, vec!["收盤價"]);

    let flags = scan.folders.iter().find(|f| f.name == "旗標").unwrap();
    assert_eq!(flags.distinct_column_count, 0);

    assert_eq!(scan.skipped.len(), 1);
    assert!(scan.skipped[0].item.ends_with("c.parquet"));
}

#[test]
fn subfolders_need_an_existing_root() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("nope");
    let assembler =
        TableAssembler::from_config(&StoreConfig::new(missing.to_string_lossy(), ""));
    assert!(matches!(
        assembler.list_subfolders(),
        Err(DataError::MissingPath { .. })
    ));
}

#[test]
fn datasets_follow_catalog_order() {
    let assembler = TableAssembler::from_config(&StoreConfig::default());
    let expected: Vec<String> = Catalog::builtin().names().map(str::to_string).collect();
    assert_eq!(assembler.list_datasets(), expected);
    assert_eq!(expected.len(), 20);
    assert!(expected.iter().any(|n| n == "股價交易資訊"));
}

#[test]
fn data_files_are_listed_sorted() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("d");
    fs::create_dir_all(&dir).unwrap();
    for name in ["b.parquet", "a.parquet", "notes.txt"] {
        fs::write(dir.join(name), b"").unwrap();
    }
    fs::create_dir_all(dir.join("nested.parquet.dir")).unwrap();

    let assembler = TableAssembler::from_config(&StoreConfig::default());
    assert_eq!(
        assembler.list_data_files(&dir).unwrap(),
        vec!["a.parquet", "b.parquet"]
    );
    assert!(matches!(
        assembler.list_data_files(tmp.path().join("missing")),
        Err(DataError::MissingPath { .. })
    ));
}
