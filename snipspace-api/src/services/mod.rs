//! Service Layer
//!
//! Business rules sit here, between the route handlers and the store:
//! ownership checks, the space delete guard, default-space creation, orphan
//! migration and facet extraction. Every function takes the caller's
//! `OwnerId` and reports records owned by someone else as not found.

mod content_service;
mod space_service;

pub use content_service::*;
pub use space_service::*;

use snipspace_core::{EntityIdType, EntityType, OwnerId, SnipspaceError, SnipspaceResult, Space, SpaceId};
use snipspace_storage::ContentStore;
use std::future::Future;
use std::time::Instant;

use crate::telemetry::record_store_operation;

/// Await a store call and record its outcome in the store metrics.
pub(crate) async fn tracked<T, F>(operation: &str, entity: EntityType, call: F) -> SnipspaceResult<T>
where
    F: Future<Output = SnipspaceResult<T>>,
{
    let start = Instant::now();
    let result = call.await;
    record_store_operation(
        operation,
        entity.as_str(),
        result.is_ok(),
        start.elapsed().as_secs_f64(),
    );
    result
}

/// Load a space and require that `owner` owns it.
pub(crate) async fn owned_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<Space> {
    match tracked("get", EntityType::Space, store.space_get(space_id)).await? {
        Some(space) if &space.owner_id == owner => Ok(space),
        Some(_) => {
            tracing::debug!(owner = %owner, space_id = %space_id, "Space owned by another user");
            Err(SnipspaceError::not_found(EntityType::Space, space_id.as_uuid()))
        }
        None => Err(SnipspaceError::not_found(EntityType::Space, space_id.as_uuid())),
    }
}
