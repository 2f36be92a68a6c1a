use super::{load_records, LoadConfig};
use crate::store::RecordStore;
use crate::Error;
use std::io::Cursor;
use tempfile::NamedTempFile;

fn temp_store() -> (NamedTempFile, RecordStore) {
    let file = NamedTempFile::new().unwrap();
    let store = RecordStore::create(file.path()).unwrap();
    (file, store)
}

#[test]
fn loads_all_well_formed_lines() {
    let (_file, store) = temp_store();
    let input = Cursor::new("1::122::5::838985046\n2::185::3.5::838983525\n3::231::4\n");

    let loaded = load_records(&store, "ratings", input, &LoadConfig::default()).unwrap();

    assert_eq!(loaded, 3);
    let records = store.records("ratings").unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].user_id, 1);
    assert_eq!(records[0].item_id, 122);
    assert_eq!(records[0].rating, 5.0);
    assert_eq!(records[1].rating, 3.5);
}

#[test]
fn second_load_appends_instead_of_replacing() {
    let (_file, store) = temp_store();
    let config = LoadConfig::default();

    load_records(&store, "ratings", Cursor::new("1::10::4\n"), &config).unwrap();
    load_records(&store, "ratings", Cursor::new("2::20::2\n"), &config).unwrap();

    assert_eq!(store.table_len("ratings").unwrap(), 2);
}

#[test]
fn partial_final_batch_is_flushed() {
    let (_file, store) = temp_store();
    let config = LoadConfig::new(2, "::").unwrap();
    let input = Cursor::new("1::1::1\n2::2::2\n3::3::3\n4::4::4\n5::5::5\n");

    let loaded = load_records(&store, "ratings", input, &config).unwrap();

    assert_eq!(loaded, 5);
    assert_eq!(store.table_len("ratings").unwrap(), 5);
}

#[test]
fn malformed_line_aborts_but_keeps_flushed_batches() {
    let (_file, store) = temp_store();
    let config = LoadConfig::new(2, "::").unwrap();
    let input = Cursor::new("1::1::1\n2::2::2\n3::3::3\n4::4::4\nnot-a-number::9::1\n");

    let result = load_records(&store, "ratings", input, &config);

    assert!(matches!(result, Err(Error::Load(_))));
    // the two full batches were committed before the bad line was reached
    assert_eq!(store.table_len("ratings").unwrap(), 4);
}

#[test]
fn short_line_is_rejected() {
    let (_file, store) = temp_store();
    let input = Cursor::new("1::2\n");

    let result = load_records(&store, "ratings", input, &LoadConfig::default());

    assert!(matches!(result, Err(Error::Load(_))));
    assert_eq!(store.table_len("ratings").unwrap(), 0);
}

#[test]
fn config_rejects_zero_batch_size_and_empty_delimiter() {
    assert!(LoadConfig::new(0, "::").is_err());
    assert!(LoadConfig::new(100, "").is_err());
    assert!(LoadConfig::new(100, "\t").is_ok());
}
