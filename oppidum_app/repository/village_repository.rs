use oppidum_game::models::village::Village;
use oppidum_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait VillageRepository: Send + Sync {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError>;

    /// All village ids, the working set of a world tick.
    async fn list_ids(&self) -> Result<Vec<u32>, ApplicationError>;

    async fn save(&self, village: &Village) -> Result<(), ApplicationError>;
}
