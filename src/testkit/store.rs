//! Test helpers for status store setup and inspection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use diesel::prelude::*;
use uuid::Uuid;

use crate::adapter::outbound::sqlite::database::connection::PoolManager;
use crate::adapter::outbound::sqlite::database::schema::stage_status;
use crate::adapter::outbound::sqlite::recorder::{load_with_conn, SqliteStatusRecorder};
use crate::config::DatabaseConfig;
use crate::domain::{JobId, Stage, StageRecord};

/// Temporary SQLite database file, removed on drop.
pub struct TempStore {
    path: PathBuf,
    manager: Arc<PoolManager>,
}

impl TempStore {
    /// Create and migrate a fresh database with default pool settings.
    pub fn create(name: &str) -> Self {
        Self::create_with(name, |_| {})
    }

    /// Create a fresh database, adjusting the config before the pool opens.
    pub fn create_with(name: &str, adjust: impl FnOnce(&mut DatabaseConfig)) -> Self {
        let path = unique_path(name);
        let mut config = DatabaseConfig::with_path(path.display().to_string());
        adjust(&mut config);

        let manager = Arc::new(PoolManager::new(config));
        manager.init().expect("temp status store should initialize");

        Self { path, manager }
    }

    pub fn manager(&self) -> &Arc<PoolManager> {
        &self.manager
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorder sharing this store's pool.
    pub fn recorder(&self) -> SqliteStatusRecorder {
        SqliteStatusRecorder::new(Arc::clone(&self.manager))
    }

    /// Read the stored record for a key.
    pub fn fetch(&self, job_id: &str, stage: Stage) -> Option<StageRecord> {
        fetch_stage(&self.manager, job_id, stage)
    }

    /// Number of stored rows.
    pub fn count(&self) -> i64 {
        let mut conn = self.manager.acquire().expect("acquire connection");
        stage_status::table
            .count()
            .get_result(&mut conn)
            .expect("count stage rows")
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        self.manager.shutdown();
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Read the stored record for a key through any pool manager.
pub fn fetch_stage(manager: &PoolManager, job_id: &str, stage: Stage) -> Option<StageRecord> {
    let mut conn = manager.acquire().expect("acquire connection");
    load_with_conn(&mut conn, &JobId::new(job_id), stage).expect("decode stage row")
}

fn unique_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stagetrack-{name}-{}.db", Uuid::new_v4().simple()))
}
