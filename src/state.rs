use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::{Mutex, MutexGuard};

use crate::services::random::{RandomSource, ThreadRandom};
use crate::store::snapshot::{SnapshotError, SnapshotFiles};
use crate::store::WordStore;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    store: Arc<WordStore>,
    snapshot: Option<Arc<SnapshotFiles>>,
    random: Arc<Mutex<Box<dyn RandomSource>>>,
    environment: Arc<str>,
}

impl AppState {
    pub fn new(store: WordStore, snapshot: Option<SnapshotFiles>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            store: Arc::new(store),
            snapshot: snapshot.map(Arc::new),
            random: Arc::new(Mutex::new(Box::new(ThreadRandom))),
            environment: Arc::from("development"),
        }
    }

    /// In-memory state with no snapshot files.
    pub fn in_memory() -> Self {
        Self::new(WordStore::new(), None)
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(Mutex::new(Box::new(random)));
        self
    }

    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = Arc::from(environment);
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn store(&self) -> &WordStore {
        &self.store
    }

    /// Exclusive access to the random source. Do not hold across an await.
    pub fn random(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.random.lock()
    }

    pub fn persistence_enabled(&self) -> bool {
        self.snapshot.is_some()
    }

    pub async fn persist(&self) -> Result<(), SnapshotError> {
        match &self.snapshot {
            Some(files) => files.save(&self.store).await,
            None => Ok(()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
