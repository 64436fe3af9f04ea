//! In-memory storage backed by `Arc<Mutex<HashMap>>` stores.
//!
//! Writes land in the shared stores immediately: `commit` and `rollback`
//! are both no-ops. Callers that need a batch to land atomically must
//! stage their effects and write only once the batch has succeeded, the
//! way the village tick does.

use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

use oppidum_game::models::queue::QueueEntry;
use oppidum_game::models::village::Village;
use oppidum_types::errors::{ApplicationError, StorageError};
use oppidum_types::queue::{QueueKind, QueueStatus};

use crate::{
    events::WorldEvent,
    reports::BattleReport,
    repository::{
        BattleReportRepository, QueueRepository, VillageRepository, WorldEventRepository,
    },
    uow::{UnitOfWork, UnitOfWorkProvider},
};

#[derive(Default, Clone)]
pub struct InMemoryVillageRepository {
    villages: Arc<Mutex<HashMap<u32, Village>>>,
}

#[async_trait::async_trait]
impl VillageRepository for InMemoryVillageRepository {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        self.villages
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .get(&village_id)
            .cloned()
            .ok_or_else(|| StorageError::VillageNotFound(village_id).into())
    }

    async fn list_ids(&self) -> Result<Vec<u32>, ApplicationError> {
        let mut ids: Vec<u32> = self
            .villages
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        self.villages
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .insert(village.id, village.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryQueueRepository {
    entries: Arc<Mutex<HashMap<Uuid, QueueEntry>>>,
}

#[async_trait::async_trait]
impl QueueRepository for InMemoryQueueRepository {
    async fn add(&self, entry: &QueueEntry) -> Result<(), ApplicationError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_by_id(&self, entry_id: Uuid) -> Result<QueueEntry, ApplicationError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| StorageError::QueueEntryNotFound(entry_id).into())
    }

    async fn list_active_by_village(
        &self,
        village_id: u32,
        kind: QueueKind,
    ) -> Result<Vec<QueueEntry>, ApplicationError> {
        let mut entries: Vec<QueueEntry> = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .values()
            .filter(|e| {
                e.village_id == village_id
                    && e.status == QueueStatus::InProgress
                    && e.target.kind() == kind
            })
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.started_at);
        Ok(entries)
    }

    async fn list_due_by_village(
        &self,
        village_id: u32,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QueueEntry>, ApplicationError> {
        let mut entries: Vec<QueueEntry> = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .values()
            .filter(|e| e.village_id == village_id && e.is_due(now))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.started_at);
        entries.truncate(limit);
        Ok(entries)
    }

    async fn save(&self, entry: &QueueEntry) -> Result<(), ApplicationError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        if !entries.contains_key(&entry.id) {
            return Err(StorageError::QueueEntryNotFound(entry.id).into());
        }
        entries.insert(entry.id, entry.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryWorldEventRepository {
    events: Arc<Mutex<HashMap<Uuid, WorldEvent>>>,
}

#[async_trait::async_trait]
impl WorldEventRepository for InMemoryWorldEventRepository {
    async fn add(&self, event: &WorldEvent) -> Result<(), ApplicationError> {
        self.events
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .insert(event.id, event.clone());
        Ok(())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<WorldEvent>, ApplicationError> {
        let mut due: Vec<WorldEvent> = self
            .events
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .values()
            .filter(|e| e.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.due_at);
        Ok(due)
    }

    async fn mark_processed(&self, event_id: Uuid) -> Result<(), ApplicationError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let event = events
            .get_mut(&event_id)
            .ok_or(StorageError::EventNotFound(event_id))?;
        event.processed = true;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBattleReportRepository {
    reports: Arc<Mutex<Vec<BattleReport>>>,
}

#[async_trait::async_trait]
impl BattleReportRepository for InMemoryBattleReportRepository {
    async fn add(&self, report: &BattleReport) -> Result<(), ApplicationError> {
        self.reports
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .push(report.clone());
        Ok(())
    }

    async fn list_by_village(
        &self,
        village_id: u32,
    ) -> Result<Vec<BattleReport>, ApplicationError> {
        Ok(self
            .reports
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .iter()
            .filter(|r| r.village_id == village_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryUnitOfWork {
    villages: Arc<InMemoryVillageRepository>,
    queues: Arc<InMemoryQueueRepository>,
    world_events: Arc<InMemoryWorldEventRepository>,
    reports: Arc<InMemoryBattleReportRepository>,
}

impl InMemoryUnitOfWork {
    /// Standalone unit over fresh stores, not shared with any provider.
    /// Handler tests use this directly.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for InMemoryUnitOfWork {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        self.villages.clone()
    }

    fn queues(&self) -> Arc<dyn QueueRepository + 'a> {
        self.queues.clone()
    }

    fn world_events(&self) -> Arc<dyn WorldEventRepository + 'a> {
        self.world_events.clone()
    }

    fn reports(&self) -> Arc<dyn BattleReportRepository + 'a> {
        self.reports.clone()
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        Ok(())
    }
}

/// Shared stores handed to every Unit of Work this provider creates.
#[derive(Default, Clone)]
pub struct InMemoryUnitOfWorkProvider {
    villages: Arc<InMemoryVillageRepository>,
    queues: Arc<InMemoryQueueRepository>,
    world_events: Arc<InMemoryWorldEventRepository>,
    reports: Arc<InMemoryBattleReportRepository>,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        Ok(Box::new(InMemoryUnitOfWork {
            villages: self.villages.clone(),
            queues: self.queues.clone(),
            world_events: self.world_events.clone(),
            reports: self.reports.clone(),
        }))
    }
}
