use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{info, warn};

use oppidum_game::battle::BattleSimulator;
use oppidum_game::defense::defensive_bonus;
use oppidum_game::models::buildings::Building;
use oppidum_game::models::queue::QueueEntry;
use oppidum_game::models::village::Village;
use oppidum_types::errors::{AppError, ApplicationError, Result};
use oppidum_types::queue::QueueTarget;

use crate::{
    config::Config,
    events::{WorldEvent, WorldEventKind},
    notifier::{GameNotification, Notifier},
    reports::BattleReport,
    uow::{UnitOfWork, UnitOfWorkProvider},
};

/// Counters for one world tick, for logs and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub villages_processed: u32,
    pub villages_failed: u32,
    pub entries_completed: u32,
    pub events_processed: u32,
    pub events_failed: u32,
}

/// Drives the world forward: settles every village, applies due queue
/// entries, then resolves due world events.
///
/// Each village runs in its own Unit of Work, so one failing village is
/// skipped and retried next interval while the rest of the world moves on.
pub struct TickOrchestrator {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    notifier: Arc<dyn Notifier>,
    config: Arc<Config>,
}

impl TickOrchestrator {
    pub fn new(
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        notifier: Arc<dyn Notifier>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            uow_provider,
            notifier,
            config,
        }
    }

    pub async fn run_tick(&self) -> Result<TickSummary, ApplicationError> {
        self.run_tick_at(Utc::now()).await
    }

    /// Runs a full tick against an explicit timestamp. Settlement and
    /// due-entry checks all use this single `now`, so a tick is
    /// reproducible regardless of how long it takes to execute.
    pub async fn run_tick_at(&self, now: DateTime<Utc>) -> Result<TickSummary, ApplicationError> {
        let village_ids = {
            let uow = self.uow_provider.tx().await?;
            let ids = uow.villages().list_ids().await?;
            uow.rollback().await?;
            ids
        };

        let mut summary = TickSummary::default();
        let semaphore = Arc::new(Semaphore::new(self.config.tick_workers));
        let mut tasks: JoinSet<(u32, Result<u32, ApplicationError>)> = JoinSet::new();

        for village_id in village_ids {
            let semaphore = semaphore.clone();
            let provider = self.uow_provider.clone();
            let notifier = self.notifier.clone();
            let config = self.config.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (village_id, Err(ApplicationError::Unknown(e.to_string()))),
                };
                let result = process_village(provider, notifier, config, village_id, now).await;
                (village_id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(completed))) => {
                    summary.villages_processed += 1;
                    summary.entries_completed += completed;
                }
                Ok((village_id, Err(e))) => {
                    summary.villages_failed += 1;
                    warn!(village_id, error = %e, "Village tick failed, retrying next interval");
                }
                Err(e) => {
                    summary.villages_failed += 1;
                    warn!(error = %e, "Village tick task aborted");
                }
            }
        }

        self.process_world_events(now, &mut summary).await?;

        info!(
            villages = summary.villages_processed,
            failed = summary.villages_failed,
            entries = summary.entries_completed,
            events = summary.events_processed,
            "World tick complete"
        );
        Ok(summary)
    }

    /// World events run after the village pass so battles see settled
    /// stocks and freshly trained garrisons. One Unit of Work per event.
    async fn process_world_events(
        &self,
        now: DateTime<Utc>,
        summary: &mut TickSummary,
    ) -> Result<(), ApplicationError> {
        let due = {
            let uow = self.uow_provider.tx().await?;
            let events = uow.world_events().find_due(now).await?;
            uow.rollback().await?;
            events
        };

        for event in due {
            let uow = self.uow_provider.tx().await?;
            match self.process_world_event(&uow, &event, now).await {
                Ok(()) => {
                    uow.world_events().mark_processed(event.id).await?;
                    uow.commit().await?;
                    summary.events_processed += 1;
                }
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        kind = event.kind_name(),
                        error = %e,
                        "World event failed, retrying next interval"
                    );
                    uow.rollback().await?;
                    summary.events_failed += 1;
                }
            }
        }

        Ok(())
    }

    async fn process_world_event(
        &self,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        event: &WorldEvent,
        now: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        match &event.kind {
            WorldEventKind::WonderStage { village_id, stage } => {
                deliver(
                    &self.notifier,
                    GameNotification::WonderStageReached {
                        village_id: *village_id,
                        stage: *stage,
                    },
                )
                .await;
                Ok(())
            }
            WorldEventKind::Incursion {
                target_village_id,
                attacker,
            } => {
                let village_repo = uow.villages();
                let mut village = village_repo.get_by_id(*target_village_id).await?;
                if village.world_id != event.world_id {
                    return Err(AppError::WrongWorld {
                        village_id: village.id,
                        world_id: event.world_id,
                    }
                    .into());
                }
                village.settle(now);

                let mut simulator = BattleSimulator::from_entropy();
                let outcome = simulator.resolve_once(
                    attacker,
                    village.garrison(),
                    defensive_bonus(&village),
                    &village.stored_resources(),
                )?;

                village.apply_troop_losses(&outcome.defender_losses);
                village.deduct_resources(&outcome.loot)?;
                village_repo.save(&village).await?;

                let report = BattleReport::new(*target_village_id, outcome, now);
                uow.reports().add(&report).await?;

                deliver(
                    &self.notifier,
                    GameNotification::BattleResolved {
                        village_id: *target_village_id,
                        report_id: report.id,
                        verdict: report.outcome.verdict,
                    },
                )
                .await;
                Ok(())
            }
        }
    }
}

/// Notification delivery is fire and forget: a failing channel must not
/// fail the village or event that produced the notification.
async fn deliver(notifier: &Arc<dyn Notifier>, notification: GameNotification) {
    if let Err(e) = notifier.notify(notification).await {
        warn!(error = %e, "Notification delivery failed");
    }
}

async fn process_village(
    provider: Arc<dyn UnitOfWorkProvider>,
    notifier: Arc<dyn Notifier>,
    config: Arc<Config>,
    village_id: u32,
    now: DateTime<Utc>,
) -> Result<u32, ApplicationError> {
    let uow = provider.tx().await?;

    match process_village_tx(&uow, &notifier, &config, village_id, now).await {
        Ok(completed) => {
            uow.commit().await?;
            Ok(completed)
        }
        Err(e) => {
            uow.rollback().await?;
            Err(e)
        }
    }
}

async fn process_village_tx(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    notifier: &Arc<dyn Notifier>,
    config: &Config,
    village_id: u32,
    now: DateTime<Utc>,
) -> Result<u32, ApplicationError> {
    let village_repo = uow.villages();
    let queue_repo = uow.queues();
    let mut village = village_repo.get_by_id(village_id).await?;

    let mut notifications = Vec::new();

    let settlement = village.settle(now);
    for (resource, discarded) in &settlement.overflows {
        notifications.push(GameNotification::StorageOverflow {
            village_id,
            resource: *resource,
            discarded: *discarded,
        });
    }

    let due = queue_repo
        .list_due_by_village(village_id, now, config.tick_batch_size)
        .await?;

    // Effects accumulate on the in-memory village first; the store is
    // written only once the whole batch has succeeded. A failing entry
    // leaves every entry InProgress and the village unsaved, so its
    // status flip and its effect land together or not at all.
    let mut completed_entries = Vec::with_capacity(due.len());
    let mut successors = Vec::new();
    for mut entry in due {
        entry.complete()?;
        apply_entry(&mut village, &entry, &mut successors, &mut notifications)?;
        completed_entries.push(entry);
    }

    village_repo.save(&village).await?;
    for entry in &completed_entries {
        queue_repo.save(entry).await?;
    }
    for next in &successors {
        queue_repo.add(next).await?;
    }

    for notification in notifications {
        deliver(notifier, notification).await;
    }
    Ok(completed_entries.len() as u32)
}

/// Applies the effect of a completed queue entry to the village and, for
/// training chains, stages the next unit. Repository writes are the
/// caller's job, after the whole batch has gone through.
fn apply_entry(
    village: &mut Village,
    entry: &QueueEntry,
    successors: &mut Vec<QueueEntry>,
    notifications: &mut Vec<GameNotification>,
) -> Result<(), ApplicationError> {
    match entry.target {
        QueueTarget::Construction {
            slot_id,
            building,
            target_level,
        } => {
            if village.building_at_slot(slot_id).is_some() {
                village.set_building_level_at_slot(slot_id, target_level)?;
            } else {
                let built = Building::new(building).at_level(target_level)?;
                village.add_building_at_slot(built, slot_id)?;
            }
            notifications.push(GameNotification::ConstructionCompleted {
                village_id: village.id,
                building,
                level: target_level,
            });
        }
        QueueTarget::Training { unit, quantity, .. } => {
            village.add_troops(unit, 1);
            if let Some(next) = entry.successor() {
                successors.push(next);
            }
            notifications.push(GameNotification::TrainingCompleted {
                village_id: village.id,
                unit,
                remaining: quantity - 1,
            });
        }
    }
    Ok(())
}
