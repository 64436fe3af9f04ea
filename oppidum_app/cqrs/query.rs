use async_trait::async_trait;
use oppidum_types::errors::ApplicationError;
use std::sync::Arc;

use crate::{config::Config, uow::UnitOfWork};

/// A marker trait for Query structs.
/// Queries read system state and return data without modifying it.
pub trait Query: Send + Sync {
    type Output;
}

/// A trait for handlers that execute Queries. The AppBus always rolls the
/// Unit of Work back afterwards.
#[async_trait]
pub trait QueryHandler<Q: Query> {
    async fn handle(
        &self,
        query: Q,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<Q::Output, ApplicationError>;
}
