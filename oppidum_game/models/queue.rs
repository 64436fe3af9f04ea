use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oppidum_types::army::{UnitName, get_unit_data};
use oppidum_types::buildings::BuildingName;
use oppidum_types::common::ResourceGroup;
use oppidum_types::errors::GameError;
use oppidum_types::queue::{QueueStatus, QueueTarget};

use super::buildings::Building;
use super::village::Village;

/// A time-boxed pending change to a village. `completed_at` is frozen at
/// creation; upgrades landing after enqueue never shorten entries already
/// in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub village_id: u32,
    pub target: QueueTarget,
    /// What was (or remains) paid for this entry, the base for refunds.
    pub cost: ResourceGroup,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status: QueueStatus,
}

impl QueueEntry {
    /// Builds a construction entry for upgrading the building on
    /// `slot_id`, or placing `building` at level 1 on an empty slot.
    /// Pure: cost deduction is the caller's job, atomically with
    /// persisting the entry.
    pub fn construction(
        village: &Village,
        slot_id: u8,
        building: BuildingName,
        now: DateTime<Utc>,
        server_speed: i8,
    ) -> Result<Self, GameError> {
        let target_level = match village.building_at_slot(slot_id) {
            Some(vb) => {
                let data = vb.building.data();
                if vb.building.level >= data.max_level {
                    return Err(GameError::BuildingMaxLevelReached);
                }
                vb.building.level + 1
            }
            None => 1,
        };

        let cost = Building::cost_at(&building, target_level);
        let duration = Building::build_time_secs(&building, target_level, server_speed);

        Ok(Self {
            id: Uuid::new_v4(),
            village_id: village.id,
            target: QueueTarget::Construction {
                slot_id,
                building,
                target_level,
            },
            cost,
            started_at: now,
            completed_at: now + Duration::seconds(duration as i64),
            status: QueueStatus::InProgress,
        })
    }

    /// Builds a training entry. Units complete one at a time:
    /// `completed_at` marks the next unit, and `successor` chains the rest
    /// with the same frozen per-unit time. The full batch cost is carried
    /// here for the caller to deduct upfront.
    pub fn training(
        village: &Village,
        unit: UnitName,
        quantity: u32,
        now: DateTime<Utc>,
        server_speed: i8,
    ) -> Result<Self, GameError> {
        if quantity == 0 {
            return Err(GameError::InvalidQuantity);
        }

        let unit_data = get_unit_data(&unit);
        let trainer = village
            .building_by_name(&unit_data.trained_at)
            .ok_or(GameError::TrainingBuildingMissing {
                building: unit_data.trained_at,
                level: 1,
                unit,
            })?;

        let factor = trainer.building.training_time_factor();
        let time_per_unit_secs = ((unit_data.training_time_secs as f64 * factor
            / server_speed as f64)
            .floor() as u32)
            .max(1);

        Ok(Self {
            id: Uuid::new_v4(),
            village_id: village.id,
            target: QueueTarget::Training {
                unit,
                quantity,
                time_per_unit_secs,
            },
            cost: unit_data.cost * quantity as f64,
            started_at: now,
            completed_at: now + Duration::seconds(time_per_unit_secs as i64),
            status: QueueStatus::InProgress,
        })
    }

    /// For a completed training entry with units remaining, the entry for
    /// the next unit. The carried cost shrinks with the remaining
    /// quantity so cancellation refunds only what was not trained.
    pub fn successor(&self) -> Option<Self> {
        let QueueTarget::Training {
            unit,
            quantity,
            time_per_unit_secs,
        } = self.target
        else {
            return None;
        };
        if quantity <= 1 {
            return None;
        }

        let remaining = quantity - 1;
        Some(Self {
            id: Uuid::new_v4(),
            village_id: self.village_id,
            target: QueueTarget::Training {
                unit,
                quantity: remaining,
                time_per_unit_secs,
            },
            cost: get_unit_data(&unit).cost * remaining as f64,
            started_at: self.completed_at,
            completed_at: self.completed_at + Duration::seconds(time_per_unit_secs as i64),
            status: QueueStatus::InProgress,
        })
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueStatus::InProgress && self.completed_at <= now
    }

    /// Flips the entry to completed. Only legal while in progress; the
    /// tick engine is the sole caller.
    pub fn complete(&mut self) -> Result<(), GameError> {
        if self.status != QueueStatus::InProgress {
            return Err(GameError::InvalidStateTransition { from: self.status });
        }
        self.status = QueueStatus::Completed;
        Ok(())
    }

    /// Flips the entry to cancelled and returns the refund, floored per
    /// resource. Refund and status flip are one operation; the caller
    /// commits both together.
    pub fn cancel(&mut self, refund_fraction: f64) -> Result<ResourceGroup, GameError> {
        if self.status != QueueStatus::InProgress {
            return Err(GameError::InvalidStateTransition { from: self.status });
        }
        self.status = QueueStatus::Cancelled;
        Ok(self.cost * refund_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{VillageFactoryOptions, village_factory};
    use oppidum_types::common::Resource;

    fn village_with_barracks(level: u8) -> Village {
        let mut v = village_factory(VillageFactoryOptions {
            stocks: Some(ResourceGroup::new(800, 800, 800, 800)),
            ..Default::default()
        });
        let barracks = Building::new(BuildingName::Barracks).at_level(level).unwrap();
        v.add_building_at_slot(barracks, 10).unwrap();
        v
    }

    #[test]
    fn test_construction_entry_freezes_duration() {
        let v = village_factory(Default::default());
        let now = Utc::now();

        let entry = QueueEntry::construction(&v, 1, BuildingName::Woodcutter, now, 1).unwrap();

        let expected = Building::build_time_secs(&BuildingName::Woodcutter, 2, 1);
        assert_eq!(entry.started_at, now);
        assert_eq!(
            (entry.completed_at - entry.started_at).num_seconds(),
            expected as i64
        );
        assert_eq!(entry.status, QueueStatus::InProgress);
        assert_eq!(entry.cost, Building::cost_at(&BuildingName::Woodcutter, 2));
    }

    #[test]
    fn test_construction_rejects_max_level() {
        let mut v = village_factory(Default::default());
        let maxed = Building::new(BuildingName::Woodcutter).at_level(20).unwrap();
        v.remove_building_at_slot(1).unwrap();
        v.add_building_at_slot(maxed, 1).unwrap();

        let result = QueueEntry::construction(&v, 1, BuildingName::Woodcutter, Utc::now(), 1);
        assert!(matches!(result, Err(GameError::BuildingMaxLevelReached)));
    }

    #[test]
    fn test_training_time_reduced_by_trainer_level() {
        // Level 5 barracks: 25% off the nominal per-unit time.
        let v = village_with_barracks(5);
        let now = Utc::now();

        let entry = QueueEntry::training(&v, UnitName::Spearman, 10, now, 1).unwrap();

        let nominal = get_unit_data(&UnitName::Spearman).training_time_secs;
        let expected = (nominal as f64 * 0.75).floor() as i64;
        assert_eq!(
            (entry.completed_at - entry.started_at).num_seconds(),
            expected
        );
    }

    #[test]
    fn test_training_chain_covers_whole_batch() {
        let v = village_with_barracks(5);
        let now = Utc::now();

        let mut entry = QueueEntry::training(&v, UnitName::Spearman, 3, now, 1).unwrap();
        let per_unit = (entry.completed_at - entry.started_at).num_seconds();

        let mut total = per_unit;
        while let Some(next) = entry.successor() {
            assert_eq!(next.started_at, entry.completed_at);
            total += (next.completed_at - next.started_at).num_seconds();
            entry = next;
        }

        assert_eq!(total, per_unit * 3);
        assert!(entry.successor().is_none());
    }

    #[test]
    fn test_training_requires_trainer_building() {
        let v = village_factory(Default::default());
        let result = QueueEntry::training(&v, UnitName::Spearman, 1, Utc::now(), 1);
        assert!(matches!(
            result,
            Err(GameError::TrainingBuildingMissing { .. })
        ));
    }

    #[test]
    fn test_training_rejects_zero_quantity() {
        let v = village_with_barracks(1);
        let result = QueueEntry::training(&v, UnitName::Spearman, 0, Utc::now(), 1);
        assert!(matches!(result, Err(GameError::InvalidQuantity)));
    }

    #[test]
    fn test_cancel_refunds_fraction_and_is_final() {
        let v = village_factory(Default::default());
        let mut entry =
            QueueEntry::construction(&v, 1, BuildingName::Woodcutter, Utc::now(), 1).unwrap();

        let refund = entry.cancel(0.5).unwrap();

        assert_eq!(entry.status, QueueStatus::Cancelled);
        assert_eq!(refund, entry.cost * 0.5);
        for resource in Resource::ALL {
            assert!(refund.get(resource) <= entry.cost.get(resource));
        }

        // No transition out of cancelled.
        assert!(matches!(
            entry.complete(),
            Err(GameError::InvalidStateTransition {
                from: QueueStatus::Cancelled
            })
        ));
        assert!(entry.cancel(0.5).is_err());
    }

    #[test]
    fn test_complete_is_final() {
        let v = village_factory(Default::default());
        let mut entry =
            QueueEntry::construction(&v, 1, BuildingName::Woodcutter, Utc::now(), 1).unwrap();

        entry.complete().unwrap();

        assert_eq!(entry.status, QueueStatus::Completed);
        assert!(entry.complete().is_err());
        assert!(entry.cancel(0.5).is_err());
    }
}
