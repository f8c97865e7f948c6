//! In-process counter store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tally_core::DailyTally;
use tally_error::{DatabaseError, DatabaseErrorKind};
use tally_interface::CounterStore;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{QueryReport, is_row_query};

/// Counter store that lives only as long as the process.
///
/// Row queries list every stored day; other statements are rejected.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counts: RwLock<BTreeMap<NaiveDate, i32>>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    #[instrument(skip(self))]
    async fn record(&self, tally: DailyTally) -> Result<(), DatabaseError> {
        self.counts.write().await.insert(tally.date, tally.count);
        debug!("Recorded daily count");
        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<DailyTally>, DatabaseError> {
        Ok(self
            .counts
            .read()
            .await
            .get(&date)
            .map(|count| DailyTally::new(date, *count)))
    }

    async fn execute(&self, statement: &str) -> Result<String, DatabaseError> {
        if !is_row_query(statement) {
            return Err(DatabaseError::new(DatabaseErrorKind::Unsupported(
                "the in-memory store only answers SELECT".to_string(),
            )));
        }

        let rows = self
            .counts
            .read()
            .await
            .iter()
            .map(|(date, count)| {
                vec![
                    ("date".to_string(), date.to_string()),
                    ("count".to_string(), count.to_string()),
                ]
            })
            .collect();
        Ok(QueryReport::rows(rows).to_string())
    }
}
