pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    GamePlan, NewGamePlan, NewStudyPlan, NewUser, StudyPlan, TrendingGame, User,
};

/// Errors surfaced by a store backend. Handlers convert these at the API
/// boundary; internal detail is logged, never returned to clients.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

/// Persistence for registered identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Persistence for game plans. Every owner-scoped method filters by
/// (id, user_id) so a foreign plan is indistinguishable from a missing one.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GamePlan>, StoreError>;
    async fn insert(&self, new: NewGamePlan) -> Result<GamePlan, StoreError>;
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<GamePlan>, StoreError>;
    /// Lookup by id alone; used only by the ungated status-patch route.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<GamePlan>, StoreError>;
    /// Persist the given state of a plan, stamping `updated_at`.
    /// Last-writer-wins; there is no version check.
    async fn update(&self, plan: &GamePlan) -> Result<GamePlan, StoreError>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
    /// Caller's plans by rating descending, unrated last.
    async fn top_rated_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<GamePlan>, StoreError>;
    /// Global aggregation: group by title, count occurrences, average the
    /// present ratings, order by count then average rating descending.
    async fn trending(&self, limit: i64) -> Result<Vec<TrendingGame>, StoreError>;
}

/// Persistence for study plans.
#[async_trait]
pub trait StudyStore: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<StudyPlan>, StoreError>;
    async fn insert(&self, new: NewStudyPlan) -> Result<StudyPlan, StoreError>;
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<StudyPlan>, StoreError>;
    async fn update(&self, plan: &StudyPlan) -> Result<StudyPlan, StoreError>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}
