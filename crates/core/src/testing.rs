//! In-memory test doubles for the repository and object store.
//!
//! Both doubles can share one [`EventLog`] so tests can assert the order in
//! which record writes and object deletes happened.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;

use crate::resource::{
    CREATED_AT, FieldChange, ListQuery, Record, RecordKey, ResourceDefinition, ResourceError,
    ResourceRepository, SortDirection, UPDATED_AT, format_timestamp,
};
use crate::storage::{AssetStore, StorageError};

/// Ordered log of side effects shared between doubles.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Position of the first entry equal to `entry`.
pub fn position(log: &EventLog, entry: &str) -> Option<usize> {
    log.lock().unwrap().iter().position(|e| e == entry)
}

/// Repository keeping one row list per table.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<HashMap<&'static str, Vec<Record>>>,
    sequences: Mutex<HashMap<&'static str, i64>>,
    log: EventLog,
    fail_updates: AtomicBool,
    fail_reference_checks: AtomicBool,
}

impl MemoryRepository {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn fail_reference_checks(&self, fail: bool) {
        self.fail_reference_checks.store(fail, AtomicOrdering::SeqCst);
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn expand(&self, def: &ResourceDefinition, row: &Record) -> Record {
        let tables = self.tables.lock().unwrap();
        let mut out = row.clone();

        for relation in def.relations {
            let fk = row.get(relation.field).cloned().unwrap_or(Value::Null);
            let target = tables.get(relation.target.table).and_then(|rows| {
                rows.iter()
                    .find(|r| !fk.is_null() && r.get(relation.target.key.name) == Some(&fk))
            });

            let nested = target.map_or(Value::Null, |t| {
                let projected: Record = relation
                    .projection
                    .iter()
                    .map(|name| {
                        (
                            (*name).to_string(),
                            t.get(*name).cloned().unwrap_or(Value::Null),
                        )
                    })
                    .collect();
                Value::Object(projected)
            });
            out.insert(relation.name.to_string(), nested);
        }

        out
    }
}

fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

impl ResourceRepository for MemoryRepository {
    async fn list(
        &self,
        def: &'static ResourceDefinition,
        query: &ListQuery,
    ) -> Result<Vec<Record>, ResourceError> {
        let mut rows: Vec<Record> = self
            .tables
            .lock()
            .unwrap()
            .get(def.table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| row.get(f.field.name) == Some(&f.value.to_json()))
            })
            .collect();

        rows.sort_by(|a, b| {
            def.order
                .iter()
                .map(|o| {
                    let ord = compare_json(&a[o.field], &b[o.field]);
                    match o.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| compare_json(&a[def.key.name], &b[def.key.name]))
        });

        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(rows.iter().map(|row| self.expand(def, row)).collect())
    }

    async fn find(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> Result<Option<Record>, ResourceError> {
        let row = self
            .tables
            .lock()
            .unwrap()
            .get(def.table)
            .and_then(|rows| rows.iter().find(|r| r[def.key.name] == key.to_json()).cloned());
        Ok(row.map(|row| self.expand(def, &row)))
    }

    async fn insert(
        &self,
        def: &'static ResourceDefinition,
        key: Option<RecordKey>,
        changes: &[FieldChange],
    ) -> Result<RecordKey, ResourceError> {
        let key = match key {
            Some(key) => key,
            None => {
                let mut sequences = self.sequences.lock().unwrap();
                let next = sequences.entry(def.table).or_insert(0);
                *next += 1;
                RecordKey::Integer(*next)
            }
        };

        let now = Value::String(format_timestamp(&Utc::now()));
        let mut row = Record::new();
        row.insert(def.key.name.to_string(), key.to_json());
        for field in def.fields {
            row.insert(field.name.to_string(), Value::Null);
        }
        for change in changes {
            row.insert(change.field.name.to_string(), change.value.to_json());
        }
        row.insert(CREATED_AT.to_string(), now.clone());
        row.insert(UPDATED_AT.to_string(), now);

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(def.table).or_default();
        if rows.iter().any(|r| r[def.key.name] == key.to_json()) {
            return Err(ResourceError::validation(format!(
                "{} '{key}' already exists",
                def.name
            )));
        }
        rows.push(row);
        drop(tables);

        self.record(format!("repo:insert:{}:{key}", def.table));
        Ok(key)
    }

    async fn update(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
        changes: &[FieldChange],
    ) -> Result<bool, ResourceError> {
        if self.fail_updates.load(AtomicOrdering::SeqCst) {
            return Err(ResourceError::repository("injected update failure"));
        }

        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables
            .get_mut(def.table)
            .and_then(|rows| rows.iter_mut().find(|r| r[def.key.name] == key.to_json()))
        else {
            return Ok(false);
        };

        for change in changes {
            row.insert(change.field.name.to_string(), change.value.to_json());
        }
        row.insert(
            UPDATED_AT.to_string(),
            Value::String(format_timestamp(&Utc::now())),
        );
        drop(tables);

        self.record(format!("repo:update:{}:{key}", def.table));
        Ok(true)
    }

    async fn delete(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> Result<bool, ResourceError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(def.table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| r[def.key.name] != key.to_json());
        let removed = rows.len() < before;
        drop(tables);

        if removed {
            self.record(format!("repo:delete:{}:{key}", def.table));
        }
        Ok(removed)
    }

    async fn is_asset_referenced(
        &self,
        defs: &[&'static ResourceDefinition],
        references: &[String],
    ) -> Result<bool, ResourceError> {
        if self.fail_reference_checks.load(AtomicOrdering::SeqCst) {
            return Err(ResourceError::repository("injected lookup failure"));
        }

        let tables = self.tables.lock().unwrap();
        let referenced = defs.iter().any(|def| {
            tables.get(def.table).is_some_and(|rows| {
                rows.iter().any(|row| {
                    def.asset_fields().any(|field| {
                        row.get(field.name)
                            .and_then(Value::as_str)
                            .is_some_and(|v| references.iter().any(|r| r == v))
                    })
                })
            })
        });
        Ok(referenced)
    }
}

/// Calls observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put(String),
    Delete(String),
    Exists(String),
    List(String),
    CreateFolder(String),
}

/// Object store double with failure injection.
#[derive(Default)]
pub struct RecordingStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    calls: Mutex<Vec<StoreCall>>,
    log: EventLog,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    block_deletes: AtomicBool,
}

impl RecordingStore {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Place an object without recording a call.
    pub fn seed(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(b"seed"));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Make every delete hang forever, simulating a crash mid-operation.
    pub fn block_deletes(&self, block: bool) {
        self.block_deletes.store(block, AtomicOrdering::SeqCst);
    }

    fn call(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AssetStore for RecordingStore {
    async fn put(&self, key: &str, payload: Bytes, _content_type: &str) -> Result<(), StorageError> {
        self.call(StoreCall::Put(key.to_string()));
        if self.fail_puts.load(AtomicOrdering::SeqCst) {
            return Err(StorageError::operation("injected put failure"));
        }
        self.objects.lock().unwrap().insert(key.to_string(), payload);
        self.log.lock().unwrap().push(format!("store:put:{key}"));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.call(StoreCall::Delete(key.to_string()));
        if self.block_deletes.load(AtomicOrdering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_deletes.load(AtomicOrdering::SeqCst) {
            return Err(StorageError::operation("injected delete failure"));
        }
        self.objects.lock().unwrap().remove(key);
        self.log.lock().unwrap().push(format!("store:delete:{key}"));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.call(StoreCall::Exists(key.to_string()));
        Ok(self.contains(key))
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StorageError> {
        self.call(StoreCall::List(prefix.to_string()));
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_folder(&self, folder: &str) -> Result<(), StorageError> {
        self.call(StoreCall::CreateFolder(folder.to_string()));
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{folder}/"), Bytes::new());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://assets.test/{key}")
    }
}
