use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::CmsError;

/// Abstraction for applying a patch payload/envelope to the database.
///
/// Kept separate from the patch types so the actor and any higher-level
/// orchestration share the same contract.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), CmsError>;
}
