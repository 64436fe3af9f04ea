mod queue_repository;
mod report_repository;
mod village_repository;
mod world_event_repository;

pub use queue_repository::QueueRepository;
pub use report_repository::BattleReportRepository;
pub use village_repository::VillageRepository;
pub use world_event_repository::WorldEventRepository;
