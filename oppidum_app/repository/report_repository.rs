use oppidum_types::errors::ApplicationError;

use crate::reports::BattleReport;

#[async_trait::async_trait]
pub trait BattleReportRepository: Send + Sync {
    async fn add(&self, report: &BattleReport) -> Result<(), ApplicationError>;

    async fn list_by_village(&self, village_id: u32)
    -> Result<Vec<BattleReport>, ApplicationError>;
}
