use chrono::NaiveDate;
use tally_core::DailyTally;
use tally_database::MemoryCounterStore;
use tally_error::DatabaseErrorKind;
use tally_interface::CounterStore;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[tokio::test]
async fn test_record_overwrites_same_day() {
    let store = MemoryCounterStore::new();

    store.record(DailyTally::new(day(1), 2)).await.unwrap();
    store.record(DailyTally::new(day(1), 5)).await.unwrap();

    assert_eq!(
        store.get(day(1)).await.unwrap(),
        Some(DailyTally::new(day(1), 5))
    );
    assert_eq!(store.get(day(2)).await.unwrap(), None);
}

#[tokio::test]
async fn test_select_lists_rows_in_date_order() {
    let store = MemoryCounterStore::new();
    store.record(DailyTally::new(day(2), 1)).await.unwrap();
    store.record(DailyTally::new(day(1), 3)).await.unwrap();

    let result = store.execute("SELECT * FROM counts").await.unwrap();

    assert_eq!(
        result,
        "date: 2024-05-01\ncount: 3\n--------\ndate: 2024-05-02\ncount: 1\n(2 rows)"
    );
}

#[tokio::test]
async fn test_empty_select() {
    let store = MemoryCounterStore::new();

    assert_eq!(store.execute("select 1").await.unwrap(), "(0 rows)");
}

#[tokio::test]
async fn test_writes_are_unsupported() {
    let store = MemoryCounterStore::new();

    let err = store.execute("DELETE FROM counts").await.unwrap_err();

    assert!(matches!(err.kind, DatabaseErrorKind::Unsupported(_)));
}
