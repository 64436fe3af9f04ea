pub mod bus;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod events;
pub mod memory;
pub mod notifier;
pub mod queries_handlers;
pub mod reports;
pub mod repository;
pub mod tick;
pub mod uow;
pub mod worker;
