use crate::domain::ports::SnapshotStore;
use crate::domain::snapshot::Snapshot;
use crate::error::{AssetError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one serialized entry per engine.
pub const CF_ENGINES: &str = "engines";

const KEY_LEDGER: &[u8] = b"ledger";
const KEY_REGISTRY: &[u8] = b"registry";
const KEY_BALLOT: &[u8] = b"ballot";

/// A persistent snapshot store using RocksDB.
///
/// Each engine is stored as JSON under its own key. A save writes all three
/// keys in one batch, so a reader never sees engines from different saves.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_engines = ColumnFamilyDescriptor::new(CF_ENGINES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_engines])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn engines_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ENGINES)
            .ok_or_else(|| AssetError::InternalError("Engines column family not found".to_string()))
    }
}

#[async_trait]
impl SnapshotStore for RocksDBStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        let cf = self.engines_cf()?;
        let ledger = self.db.get_cf(cf, KEY_LEDGER)?;
        let registry = self.db.get_cf(cf, KEY_REGISTRY)?;
        let ballot = self.db.get_cf(cf, KEY_BALLOT)?;

        match (ledger, registry, ballot) {
            (Some(ledger), Some(registry), Some(ballot)) => Ok(Some(Snapshot::new(
                serde_json::from_slice(&ledger)?,
                serde_json::from_slice(&registry)?,
                serde_json::from_slice(&ballot)?,
            ))),
            (None, None, None) => Ok(None),
            _ => Err(AssetError::InternalError(
                "Stored snapshot is incomplete".to_string(),
            )),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let cf = self.engines_cf()?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, KEY_LEDGER, serde_json::to_vec(&snapshot.ledger)?);
        batch.put_cf(cf, KEY_REGISTRY, serde_json::to_vec(&snapshot.registry)?);
        batch.put_cf(cf, KEY_BALLOT, serde_json::to_vec(&snapshot.ballot)?);
        self.db.write(batch)?;
        Ok(())
    }
}
