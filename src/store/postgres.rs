use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use super::{GameStore, IdentityStore, StoreError, StudyStore};
use crate::config::DatabaseConfig;
use crate::models::{
    GamePlan, NewGamePlan, NewStudyPlan, NewUser, StudyPlan, TrendingGame, User,
};

/// PostgreSQL-backed store. Row-level atomicity of single-statement updates
/// is the only concurrency control; see the store trait contracts.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect with a bounded acquire timeout and run embedded migrations.
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(database_url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::info!("connected to database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("username or email")
            } else {
                e.into()
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GamePlan>, StoreError> {
        let plans = sqlx::query_as::<_, GamePlan>(
            "SELECT * FROM game_plans WHERE user_id = $1 ORDER BY planned_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    async fn insert(&self, new: NewGamePlan) -> Result<GamePlan, StoreError> {
        let plan = sqlx::query_as::<_, GamePlan>(
            r#"
            INSERT INTO game_plans
                (id, user_id, title, genre, description, planned_date, duration, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.genre)
        .bind(&new.description)
        .bind(new.planned_date)
        .bind(&new.duration)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<GamePlan>, StoreError> {
        let plan = sqlx::query_as::<_, GamePlan>(
            "SELECT * FROM game_plans WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GamePlan>, StoreError> {
        let plan = sqlx::query_as::<_, GamePlan>("SELECT * FROM game_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plan)
    }

    async fn update(&self, plan: &GamePlan) -> Result<GamePlan, StoreError> {
        let updated = sqlx::query_as::<_, GamePlan>(
            r#"
            UPDATE game_plans SET
                title = $2, genre = $3, description = $4, planned_date = $5,
                duration = $6, status = $7, rating = $8, notes = $9,
                last_played = $10, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(plan.id)
        .bind(&plan.title)
        .bind(&plan.genre)
        .bind(&plan.description)
        .bind(plan.planned_date)
        .bind(&plan.duration)
        .bind(plan.status)
        .bind(plan.rating)
        .bind(&plan.notes)
        .bind(plan.last_played)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM game_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn top_rated_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<GamePlan>, StoreError> {
        let plans = sqlx::query_as::<_, GamePlan>(
            "SELECT * FROM game_plans WHERE user_id = $1
             ORDER BY rating DESC NULLS LAST LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    async fn trending(&self, limit: i64) -> Result<Vec<TrendingGame>, StoreError> {
        let rows = sqlx::query_as::<_, TrendingGame>(
            r#"
            SELECT title,
                   COUNT(*) AS count,
                   AVG(rating)::double precision AS avg_rating
            FROM game_plans
            GROUP BY title
            ORDER BY count DESC, avg_rating DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl StudyStore for PgStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<StudyPlan>, StoreError> {
        let plans = sqlx::query_as::<_, StudyPlan>(
            "SELECT * FROM study_plans WHERE user_id = $1 ORDER BY planned_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    async fn insert(&self, new: NewStudyPlan) -> Result<StudyPlan, StoreError> {
        let plan = sqlx::query_as::<_, StudyPlan>(
            r#"
            INSERT INTO study_plans
                (id, user_id, title, subject, description, planned_date, duration, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.subject)
        .bind(&new.description)
        .bind(new.planned_date)
        .bind(&new.duration)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
        let plan = sqlx::query_as::<_, StudyPlan>(
            "SELECT * FROM study_plans WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn update(&self, plan: &StudyPlan) -> Result<StudyPlan, StoreError> {
        let updated = sqlx::query_as::<_, StudyPlan>(
            r#"
            UPDATE study_plans SET
                title = $2, subject = $3, description = $4, planned_date = $5,
                duration = $6, status = $7, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(plan.id)
        .bind(&plan.title)
        .bind(&plan.subject)
        .bind(&plan.description)
        .bind(plan.planned_date)
        .bind(&plan.duration)
        .bind(plan.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM study_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
