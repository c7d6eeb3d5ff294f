//! Registry of known bulbs keyed by address.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::errors::Error;
use crate::record::{DeviceRecord, sort_by_display_name};
use crate::status::ReportedState;

type Result<T> = std::result::Result<T, Error>;

/// Durable store of [`DeviceRecord`]s.
///
/// Listing operations return records ordered by display name. Every write
/// replaces a single record as a whole. `update_state` and `mark_offline`
/// fail with [`Error::UnknownAddress`] for unregistered addresses, `rename`
/// and `delete` with [`Error::DeviceNotFound`].
pub trait Registry: Send + Sync {
    fn get(&self, address: &str) -> impl Future<Output = Result<Option<DeviceRecord>>> + Send;

    fn all(&self) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send;

    /// Records whose power state is not the offline sentinel.
    fn online(&self) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send;

    /// Records whose address or display name equals `key`.
    fn by_address_or_name(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send;

    /// Create a record with defaults. Returns `false` when one already exists.
    fn insert_if_absent(&self, address: &str) -> impl Future<Output = Result<bool>> + Send;

    fn update_state(
        &self,
        address: &str,
        state: &ReportedState,
    ) -> impl Future<Output = Result<DeviceRecord>> + Send;

    fn mark_offline(&self, address: &str) -> impl Future<Output = Result<DeviceRecord>> + Send;

    fn rename(
        &self,
        address: &str,
        name: &str,
    ) -> impl Future<Output = Result<DeviceRecord>> + Send;

    fn delete(&self, address: &str) -> impl Future<Output = Result<DeviceRecord>> + Send;
}

/// Plain record table shared by the registry implementations.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<DeviceRecord>", into = "Vec<DeviceRecord>")]
struct RegistryTable {
    records: BTreeMap<String, DeviceRecord>,
}

impl From<Vec<DeviceRecord>> for RegistryTable {
    fn from(records: Vec<DeviceRecord>) -> Self {
        RegistryTable {
            records: records
                .into_iter()
                .map(|r| (r.address().to_string(), r))
                .collect(),
        }
    }
}

impl From<RegistryTable> for Vec<DeviceRecord> {
    fn from(table: RegistryTable) -> Self {
        table.sorted(|_| true)
    }
}

impl RegistryTable {
    fn get(&self, address: &str) -> Option<DeviceRecord> {
        self.records.get(address).cloned()
    }

    fn contains(&self, address: &str) -> bool {
        self.records.contains_key(address)
    }

    fn sorted(&self, keep: impl Fn(&DeviceRecord) -> bool) -> Vec<DeviceRecord> {
        let mut records: Vec<DeviceRecord> =
            self.records.values().filter(|&r| keep(r)).cloned().collect();
        sort_by_display_name(&mut records);
        records
    }

    fn insert_if_absent(&mut self, address: &str) -> bool {
        if self.contains(address) {
            return false;
        }
        self.records
            .insert(address.to_string(), DeviceRecord::new(address));
        true
    }

    fn update_state(&mut self, address: &str, state: &ReportedState) -> Result<DeviceRecord> {
        let record = self
            .records
            .get_mut(address)
            .ok_or_else(|| Error::UnknownAddress(address.to_string()))?;
        record.apply(state);
        Ok(record.clone())
    }

    fn mark_offline(&mut self, address: &str) -> Result<DeviceRecord> {
        let record = self
            .records
            .get_mut(address)
            .ok_or_else(|| Error::UnknownAddress(address.to_string()))?;
        record.mark_offline();
        Ok(record.clone())
    }

    fn rename(&mut self, address: &str, name: &str) -> Result<DeviceRecord> {
        let record = self
            .records
            .get_mut(address)
            .ok_or_else(|| Error::DeviceNotFound(address.to_string()))?;
        record.rename(name);
        Ok(record.clone())
    }

    fn delete(&mut self, address: &str) -> Result<DeviceRecord> {
        self.records
            .remove(address)
            .ok_or_else(|| Error::DeviceNotFound(address.to_string()))
    }
}

/// In-process registry. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    table: RwLock<RegistryTable>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry with existing records.
    pub fn with_records(records: impl IntoIterator<Item = DeviceRecord>) -> Self {
        MemoryRegistry {
            table: RwLock::new(RegistryTable::from(records.into_iter().collect::<Vec<_>>())),
        }
    }
}

impl Registry for MemoryRegistry {
    async fn get(&self, address: &str) -> Result<Option<DeviceRecord>> {
        Ok(self.table.read().await.get(address))
    }

    async fn all(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.read().await.sorted(|_| true))
    }

    async fn online(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.read().await.sorted(DeviceRecord::is_online))
    }

    async fn by_address_or_name(&self, key: &str) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.read().await.sorted(|r| r.matches(key)))
    }

    async fn insert_if_absent(&self, address: &str) -> Result<bool> {
        Ok(self.table.write().await.insert_if_absent(address))
    }

    async fn update_state(&self, address: &str, state: &ReportedState) -> Result<DeviceRecord> {
        self.table.write().await.update_state(address, state)
    }

    async fn mark_offline(&self, address: &str) -> Result<DeviceRecord> {
        self.table.write().await.mark_offline(address)
    }

    async fn rename(&self, address: &str, name: &str) -> Result<DeviceRecord> {
        self.table.write().await.rename(address, name)
    }

    async fn delete(&self, address: &str) -> Result<DeviceRecord> {
        self.table.write().await.delete(address)
    }
}

/// Registry persisted as a JSON array of records.
///
/// The file is rewritten after every mutation (temporary file, then rename).
/// When the write fails the in-memory table is left as it was and the call
/// fails with [`Error::RegistryUnavailable`].
#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    table: Mutex<RegistryTable>,
}

impl JsonFileRegistry {
    /// Open the registry at `path`. A missing file is an empty registry.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| Error::registry("loading", e))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RegistryTable::default(),
            Err(e) => return Err(Error::registry("opening", e)),
        };
        debug!(
            "opened registry {} with {} records",
            path.display(),
            table.records.len()
        );
        Ok(JsonFileRegistry {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &RegistryTable) -> Result<()> {
        let contents = serde_json::to_vec_pretty(table).map_err(Error::JsonDump)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| Error::registry("writing", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::registry("replacing", e))
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut RegistryTable) -> Result<T> + Send,
        T: Send,
    {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *table = next;
        Ok(out)
    }
}

impl Registry for JsonFileRegistry {
    async fn get(&self, address: &str) -> Result<Option<DeviceRecord>> {
        Ok(self.table.lock().await.get(address))
    }

    async fn all(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.lock().await.sorted(|_| true))
    }

    async fn online(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.lock().await.sorted(DeviceRecord::is_online))
    }

    async fn by_address_or_name(&self, key: &str) -> Result<Vec<DeviceRecord>> {
        Ok(self.table.lock().await.sorted(|r| r.matches(key)))
    }

    async fn insert_if_absent(&self, address: &str) -> Result<bool> {
        if self.table.lock().await.contains(address) {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.insert_if_absent(address)))
            .await
    }

    async fn update_state(&self, address: &str, state: &ReportedState) -> Result<DeviceRecord> {
        self.mutate(|table| table.update_state(address, state))
            .await
    }

    async fn mark_offline(&self, address: &str) -> Result<DeviceRecord> {
        self.mutate(|table| table.mark_offline(address)).await
    }

    async fn rename(&self, address: &str, name: &str) -> Result<DeviceRecord> {
        self.mutate(|table| table.rename(address, name)).await
    }

    async fn delete(&self, address: &str) -> Result<DeviceRecord> {
        self.mutate(|table| table.delete(address)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    fn online(address: &str, name: &str) -> DeviceRecord {
        let mut record = DeviceRecord::new(address);
        record.rename(name);
        record.apply(&ReportedState::new(PowerState::Off, 0));
        record
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_existing_name() {
        let registry = MemoryRegistry::with_records([online("10.0.0.5", "porch")]);

        assert!(!registry.insert_if_absent("10.0.0.5").await.unwrap());
        assert!(registry.insert_if_absent("10.0.0.6").await.unwrap());

        let porch = registry.get("10.0.0.5").await.unwrap().unwrap();
        assert_eq!(porch.display_name(), "porch");
        let new = registry.get("10.0.0.6").await.unwrap().unwrap();
        assert_eq!(new.display_name(), "10.0.0.6");
        assert_eq!(new.power_state(), PowerState::Offline);
    }

    #[tokio::test]
    async fn test_online_filter_and_order() {
        let registry = MemoryRegistry::with_records([
            online("10.0.0.1", "kitchen"),
            online("10.0.0.2", "bedroom"),
            DeviceRecord::new("10.0.0.3"),
        ]);

        let names: Vec<String> = registry
            .online()
            .await
            .unwrap()
            .iter()
            .map(|r| r.display_name().to_string())
            .collect();
        assert_eq!(names, ["bedroom", "kitchen"]);
        assert_eq!(registry.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_by_address_or_name() {
        let registry = MemoryRegistry::with_records([
            online("10.0.0.1", "lamp"),
            online("10.0.0.2", "lamp"),
            online("10.0.0.3", "desk"),
        ]);

        assert_eq!(registry.by_address_or_name("lamp").await.unwrap().len(), 2);
        assert_eq!(
            registry.by_address_or_name("10.0.0.3").await.unwrap()[0].display_name(),
            "desk"
        );
        assert!(registry.by_address_or_name("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_address_errors() {
        let registry = MemoryRegistry::new();
        let state = ReportedState::new(PowerState::On, 1);

        assert_eq!(
            registry.update_state("10.0.0.9", &state).await.unwrap_err(),
            Error::UnknownAddress("10.0.0.9".into())
        );
        assert_eq!(
            registry.mark_offline("10.0.0.9").await.unwrap_err(),
            Error::UnknownAddress("10.0.0.9".into())
        );
        assert_eq!(
            registry.rename("10.0.0.9", "x").await.unwrap_err(),
            Error::DeviceNotFound("10.0.0.9".into())
        );
        assert_eq!(
            registry.delete("10.0.0.9").await.unwrap_err(),
            Error::DeviceNotFound("10.0.0.9".into())
        );
    }

    #[tokio::test]
    async fn test_file_registry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulbs.json");

        {
            let registry = JsonFileRegistry::open(&path).await.unwrap();
            registry.insert_if_absent("10.0.0.7").await.unwrap();
            registry.insert_if_absent("10.0.0.8").await.unwrap();
            registry
                .update_state("10.0.0.7", &ReportedState::new(PowerState::On, 12))
                .await
                .unwrap();
            registry.rename("10.0.0.7", "hall").await.unwrap();
            registry.delete("10.0.0.8").await.unwrap();
        }

        let registry = JsonFileRegistry::open(&path).await.unwrap();
        let all = registry.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name(), "hall");
        assert_eq!(all[0].power_state(), PowerState::On);
        assert_eq!(all[0].active_scene_name(), "Daylight");
    }

    #[tokio::test]
    async fn test_file_registry_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulbs.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileRegistry::open(&path).await.unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::RegistryUnavailable);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("bulbs.json");
        let registry = JsonFileRegistry::open(&path).await.unwrap();

        let err = registry.insert_if_absent("10.0.0.1").await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RegistryUnavailable);
        assert!(registry.all().await.unwrap().is_empty());
    }
}
