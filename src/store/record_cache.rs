use crate::model::{Id, Record};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::watch;

/// Process-wide record store keyed by record id.
///
/// Every key is backed by a watch channel so views can subscribe to a single
/// record. Writes are id-keyed upserts: the last write wins.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: RwLock<HashMap<Id, watch::Sender<Option<Record>>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current copy of a record if present
    pub fn get(&self, id: &Id) -> Option<Record> {
        let entries = self.entries.read();
        entries.get(id).and_then(|sender| sender.borrow().clone())
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.get(id).is_some()
    }

    /// Insert or overwrite a record, notifying subscribers of that id
    pub fn upsert(&self, record: Record) {
        let mut entries = self.entries.write();
        match entries.get(&record.id) {
            Some(sender) => {
                sender.send_replace(Some(record));
            }
            None => {
                let id = record.id.clone();
                let (sender, _) = watch::channel(Some(record));
                entries.insert(id, sender);
            }
        }
    }

    pub fn upsert_many<I>(&self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.upsert(record);
        }
    }

    /// Subscribe to one record id. Subscribing to an unknown id is allowed
    /// and yields `None` until the record is written.
    pub fn subscribe(&self, id: &Id) -> watch::Receiver<Option<Record>> {
        let mut entries = self.entries.write();
        entries
            .entry(id.clone())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        let entries = self.entries.read();
        entries
            .values()
            .filter(|sender| sender.borrow().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
