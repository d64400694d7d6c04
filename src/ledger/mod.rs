pub mod entities;

use std::{collections::BTreeSet, io::ErrorKind, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Duration;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use crate::{
    ledger::entities::{duration_to_seconds, DayRecord, StoreDocument},
    utils::{clock::Clock, time::date_to_day_id},
};

/// Owner of all persisted [DayRecord]s. Wraps a single JSON document store
/// file that is assumed to belong exclusively to this process; the file locks
/// only guard against torn reads from external viewers.
pub struct Ledger {
    path: PathBuf,
    collection: String,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Opens the store, failing fast on an unreadable or corrupt file. A
    /// missing file is a fresh store, it gets created on first write.
    pub async fn open(
        path: PathBuf,
        collection: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let ledger = Self {
            path,
            collection: collection.into(),
            clock,
        };
        ledger
            .read_document()
            .await
            .context("Activity store is unreadable")?;
        Ok(ledger)
    }

    /// Today's partition key, formatted YYYYMMDD.
    pub fn current_day_id(&self) -> String {
        date_to_day_id(self.clock.today())
    }

    pub async fn get(&self, day_id: &str) -> Result<Option<DayRecord>> {
        let document = self.read_document().await?;
        let record = self
            .records(&document)
            .find(|record| record.day == day_id)
            .cloned();
        Ok(record)
    }

    /// Replaces today's total elapsed time, inserting a fresh record with
    /// empty orders when the day is new.
    pub async fn upsert_elapsed(&self, elapsed: Duration) -> Result<()> {
        let day_id = self.current_day_id();
        let mut document = self.read_document().await?;
        let collection = document.entry(self.collection.clone()).or_default();

        match collection.values_mut().find(|record| record.day == day_id) {
            Some(record) => record.elapsed = duration_to_seconds(elapsed),
            None => {
                let record_id = next_record_id(collection);
                collection.insert(record_id, DayRecord::new(day_id, elapsed));
            }
        }

        self.write_document(&document).await
    }

    /// Adds `delta` to today's bucket for `name`. When today has no record
    /// yet this is a silent skip, sessions only gain a record once elapsed
    /// time has been flushed at least once.
    pub async fn accumulate_activity(&self, name: &str, delta: Duration) -> Result<()> {
        let day_id = self.current_day_id();
        let mut document = self.read_document().await?;
        let Some(record) = document
            .get_mut(&self.collection)
            .and_then(|collection| collection.values_mut().find(|record| record.day == day_id))
        else {
            debug!("No record for day {day_id}, skipping accumulation for {name}");
            return Ok(());
        };

        *record.orders.entry(name.to_string()).or_insert(0.0) += duration_to_seconds(delta);

        self.write_document(&document).await
    }

    /// Every order name ever recorded, across all days. Powers input
    /// suggestions in the shell.
    pub async fn known_activity_names(&self) -> Result<BTreeSet<String>> {
        let document = self.read_document().await?;
        Ok(self
            .records(&document)
            .flat_map(|record| record.orders.keys().cloned())
            .collect())
    }

    pub async fn all_records(&self) -> Result<Vec<DayRecord>> {
        let document = self.read_document().await?;
        Ok(self.records(&document).cloned().collect())
    }

    fn records<'a>(&self, document: &'a StoreDocument) -> impl Iterator<Item = &'a DayRecord> {
        document
            .get(&self.collection)
            .into_iter()
            .flat_map(|collection| collection.values())
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::new()),
            Err(e) => return Err(e).context(format!("Failed to open store {:?}", self.path)),
        };
        file.lock_shared()?;
        let mut text = String::new();
        let read_result = file.read_to_string(&mut text).await;
        file.unlock_async().await?;
        read_result?;

        serde_json::from_str(&text)
            .with_context(|| format!("Store file {:?} contains invalid data", self.path))
    }

    async fn write_document(&self, document: &StoreDocument) -> Result<()> {
        let text = serde_json::to_string_pretty(document)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open store {:?} for writing", self.path))?;
        file.lock_exclusive()?;
        let write_result = write_all(&mut file, text.as_bytes()).await;
        file.unlock_async().await?;
        write_result
    }
}

async fn write_all(file: &mut File, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Record ids mimic the original store format: stringified integers counting
/// up from 1.
fn next_record_id(collection: &std::collections::BTreeMap<String, DayRecord>) -> String {
    let max = collection
        .keys()
        .filter_map(|key| key.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}
