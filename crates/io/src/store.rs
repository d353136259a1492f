//! Keyed storage for generated annex workbooks.
//!
//! Each build gets its own [`ArtifactId`]; concurrent requests never see
//! each other's output. Capacity is bounded and the oldest entry is evicted
//! first.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use laborgrid_recon::{AnnexResult, Layout};
use tracing::debug;
use uuid::Uuid;

use crate::export::{write_annex, ExportError};

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug)]
pub struct Artifact {
    pub id: ArtifactId,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub layout: Layout,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<ArtifactId, Arc<Artifact>>,
    order: VecDeque<ArtifactId>,
}

#[derive(Debug)]
pub struct ArtifactStore {
    capacity: usize,
    slots: RwLock<Slots>,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ArtifactStore {
    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            slots: RwLock::new(Slots::default()),
        }
    }

    /// Render the annex for `result` and keep it under a fresh id.
    pub fn store_annex(&self, file_name: &str, result: &AnnexResult) -> Result<ArtifactId, ExportError> {
        let bytes = write_annex(result)?;
        Ok(self.insert(file_name, result.layout(), bytes))
    }

    pub fn insert(&self, file_name: &str, layout: Layout, bytes: Vec<u8>) -> ArtifactId {
        let id = ArtifactId::new();
        let artifact = Arc::new(Artifact {
            id,
            file_name: file_name.to_string(),
            created_at: Utc::now(),
            layout,
            bytes,
        });

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        while slots.order.len() >= self.capacity {
            let Some(oldest) = slots.order.pop_front() else {
                break;
            };
            slots.entries.remove(&oldest);
            debug!(%oldest, "artifact evicted");
        }
        slots.entries.insert(id, artifact);
        slots.order.push_back(id);
        id
    }

    pub fn get(&self, id: &ArtifactId) -> Option<Arc<Artifact>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.entries.get(id).cloned()
    }

    /// Remove and return an artifact.
    pub fn take(&self, id: &ArtifactId) -> Option<Arc<Artifact>> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let artifact = slots.entries.remove(id)?;
        slots.order.retain(|other| other != id);
        Some(artifact)
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use laborgrid_recon::{run, GridConfig, SourceReading};

    #[test]
    fn insert_get_take() {
        let store = ArtifactStore::default();
        let id = store.insert("anexo.xlsx", Layout::Long, vec![1, 2, 3]);

        let artifact = store.get(&id).unwrap();
        assert_eq!(artifact.bytes, vec![1, 2, 3]);
        assert_eq!(artifact.file_name, "anexo.xlsx");
        assert_eq!(store.len(), 1);

        assert!(store.take(&id).is_some());
        assert!(store.get(&id).is_none());
        assert!(store.take(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn oldest_is_evicted_first() {
        let store = ArtifactStore::with_capacity(2);
        let a = store.insert("a.xlsx", Layout::Long, vec![]);
        let b = store.insert("b.xlsx", Layout::Matrix, vec![]);
        let c = store.insert("c.xlsx", Layout::Skeleton, vec![]);

        assert_eq!(store.len(), 2);
        assert!(store.get(&a).is_none());
        assert!(store.get(&b).is_some());
        assert!(store.get(&c).is_some());
    }

    #[test]
    fn ids_round_trip_through_text() {
        let id = ArtifactId::new();
        let parsed: ArtifactId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ArtifactId>().is_err());
    }

    #[test]
    fn concurrent_requests_keep_their_own_output() {
        let store = Arc::new(ArtifactStore::default());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || (i, store.insert("anexo.xlsx", Layout::Long, vec![i])))
            })
            .collect();

        for handle in handles {
            let (i, id) = handle.join().unwrap();
            assert_eq!(store.get(&id).unwrap().bytes, vec![i]);
        }
    }

    #[test]
    fn stores_rendered_annex() {
        let store = ArtifactStore::default();
        let result = run(&GridConfig::default(), &SourceReading::default());
        let id = store.store_annex("anexo.xlsx", &result).unwrap();
        let artifact = store.get(&id).unwrap();
        assert_eq!(artifact.layout, Layout::Skeleton);
        // xlsx is a zip archive
        assert_eq!(&artifact.bytes[..2], b"PK");
    }
}
