use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::entities::Entity;

type Tables = BTreeMap<String, BTreeMap<String, String>>;

/// Writes staged for a single `commit`.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<(String, String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, kind: &str, id: &str, value: String) {
        self.writes
            .push((kind.to_string(), id.to_string(), value));
    }

    pub fn save<T: Entity + Serialize>(&mut self, entity: &T) -> Result<()> {
        let raw = serde_json::to_string(entity)?;
        self.put(T::KIND, entity.id(), raw);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    fn apply_to(self, tables: &mut Tables) {
        for (kind, id, value) in self.writes {
            tables.entry(kind).or_default().insert(id, value);
        }
    }
}

/// Key-value store of serialized entities, grouped by kind.
pub trait EntityStore {
    fn get(&self, kind: &str, id: &str) -> Result<Option<String>>;

    /// Applies every write in `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<()>;

    fn set(&mut self, kind: &str, id: &str, value: String) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(kind, id, value);
        self.commit(batch)
    }

    fn load<T: Entity + DeserializeOwned>(&self, id: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(T::KIND, id)? {
            Some(raw) => {
                let entity = serde_json::from_str(&raw)
                    .with_context(|| format!("corrupt {} entity {}", T::KIND, id))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    fn save<T: Entity + Serialize>(&mut self, entity: &T) -> Result<()>
    where
        Self: Sized,
    {
        let mut batch = WriteBatch::new();
        batch.save(entity)?;
        self.commit(batch)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities stored under `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.tables.get(kind).map_or(0, BTreeMap::len)
    }
}

impl EntityStore for MemoryStore {
    fn get(&self, kind: &str, id: &str) -> Result<Option<String>> {
        Ok(self
            .tables
            .get(kind)
            .and_then(|table| table.get(id))
            .cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        batch.apply_to(&mut self.tables);
        Ok(())
    }
}

/// Store persisted as one JSON document, rewritten on every commit.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: Tables,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Tables::new()
        };
        Ok(JsonFileStore { path, tables })
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(tables)?)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl EntityStore for JsonFileStore {
    fn get(&self, kind: &str, id: &str) -> Result<Option<String>> {
        Ok(self
            .tables
            .get(kind)
            .and_then(|table| table.get(id))
            .cloned())
    }

    // In-memory tables only change once the new document is on disk.
    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        let mut staged = self.tables.clone();
        batch.apply_to(&mut staged);
        self.persist(&staged)?;
        self.tables = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::entities::{PoolEntity, StakerEntity};
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn memory_store_round_trips_entities() {
        let mut store = MemoryStore::new();
        let staker = StakerEntity {
            staked_amount: 42,
            user_reward_per_token_paid: u128::MAX,
            ..StakerEntity::new(&Pubkey::new_unique(), &Pubkey::new_unique())
        };
        store.save(&staker).unwrap();

        let loaded: StakerEntity = store.load(&staker.id).unwrap().unwrap();
        assert_eq!(loaded, staker);
        assert!(store.load::<StakerEntity>("missing").unwrap().is_none());
        assert_eq!(store.count(StakerEntity::KIND), 1);
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "token-farm-store-{}.json",
            Pubkey::new_unique()
        ));
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set("Processed", "sig:0", "1".to_string()).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            store.get("Processed", "sig:0").unwrap().as_deref(),
            Some("1")
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn batch_commits_every_write_in_one_document() {
        let path = std::env::temp_dir().join(format!(
            "token-farm-batch-{}.json",
            Pubkey::new_unique()
        ));
        let pool = Pubkey::new_unique();
        let pool_entity = PoolEntity {
            total_staked: 5,
            ..PoolEntity::new(&pool, &pool, &pool, &pool, 60, 1)
        };
        let staker = StakerEntity::new(&pool, &Pubkey::new_unique());
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            let mut batch = WriteBatch::new();
            batch.save(&pool_entity).unwrap();
            batch.save(&staker).unwrap();
            batch.put("Processed", "sig:0", "1".to_string());
            assert_eq!(batch.len(), 3);
            store.commit(batch).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            store.load::<PoolEntity>(&pool_entity.id).unwrap(),
            Some(pool_entity)
        );
        assert_eq!(store.load::<StakerEntity>(&staker.id).unwrap(), Some(staker));
        assert!(store.get("Processed", "sig:0").unwrap().is_some());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_persist_leaves_the_store_unchanged() {
        let path = std::env::temp_dir()
            .join(format!("token-farm-absent-{}", Pubkey::new_unique()))
            .join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        assert!(store.set("Processed", "sig:0", "1".to_string()).is_err());
        assert!(store.get("Processed", "sig:0").unwrap().is_none());

        let mut batch = WriteBatch::new();
        batch.put("Pool", "a", "{}".to_string());
        batch.put("Processed", "sig:1", "1".to_string());
        assert!(store.commit(batch).is_err());
        assert!(store.get("Pool", "a").unwrap().is_none());
        assert!(store.get("Processed", "sig:1").unwrap().is_none());
    }
}
