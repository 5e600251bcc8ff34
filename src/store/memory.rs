use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GameStore, IdentityStore, StoreError, StudyStore};
use crate::models::{
    GamePlan, NewGamePlan, NewStudyPlan, NewUser, StudyPlan, TrendingGame, User,
};

/// In-memory store backing the integration test suite. Semantics match the
/// PostgreSQL implementation, including unique username/email enforcement,
/// nulls-last rating ordering, and averages that ignore unrated plans.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    games: RwLock<HashMap<Uuid, GamePlan>>,
    studies: RwLock<HashMap<Uuid, StudyPlan>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(StoreError::Duplicate("username or email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GamePlan>, StoreError> {
        let games = self.games.read().await;
        let mut plans: Vec<GamePlan> = games
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.planned_date);
        Ok(plans)
    }

    async fn insert(&self, new: NewGamePlan) -> Result<GamePlan, StoreError> {
        let now = Utc::now();
        let plan = GamePlan {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            genre: new.genre,
            description: new.description,
            planned_date: new.planned_date,
            duration: new.duration,
            status: new.status,
            rating: None,
            notes: None,
            last_played: None,
            created_at: now,
            updated_at: now,
        };
        self.games.write().await.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<GamePlan>, StoreError> {
        let games = self.games.read().await;
        Ok(games.get(&id).filter(|p| p.user_id == user_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GamePlan>, StoreError> {
        let games = self.games.read().await;
        Ok(games.get(&id).cloned())
    }

    async fn update(&self, plan: &GamePlan) -> Result<GamePlan, StoreError> {
        let mut games = self.games.write().await;
        if !games.contains_key(&plan.id) {
            return Err(StoreError::Sqlx(sqlx::Error::RowNotFound));
        }
        let mut updated = plan.clone();
        updated.updated_at = Utc::now();
        games.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut games = self.games.write().await;
        match games.get(&id) {
            Some(p) if p.user_id == user_id => {
                games.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn top_rated_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<GamePlan>, StoreError> {
        let games = self.games.read().await;
        let mut plans: Vec<GamePlan> = games
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        // Option ordering puts None below Some, so descending sorts unrated last
        plans.sort_by(|a, b| b.rating.cmp(&a.rating));
        plans.truncate(limit as usize);
        Ok(plans)
    }

    async fn trending(&self, limit: i64) -> Result<Vec<TrendingGame>, StoreError> {
        let games = self.games.read().await;

        let mut buckets: HashMap<String, (i64, i64, i64)> = HashMap::new();
        for plan in games.values() {
            let entry = buckets.entry(plan.title.clone()).or_insert((0, 0, 0));
            entry.0 += 1;
            if let Some(rating) = plan.rating {
                entry.1 += rating as i64;
                entry.2 += 1;
            }
        }

        let mut rows: Vec<TrendingGame> = buckets
            .into_iter()
            .map(|(title, (count, sum, rated))| TrendingGame {
                title,
                count,
                avg_rating: (rated > 0).then(|| sum as f64 / rated as f64),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| {
                b.avg_rating
                    .partial_cmp(&a.avg_rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<StudyPlan>, StoreError> {
        let studies = self.studies.read().await;
        let mut plans: Vec<StudyPlan> = studies
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.planned_date);
        Ok(plans)
    }

    async fn insert(&self, new: NewStudyPlan) -> Result<StudyPlan, StoreError> {
        let now = Utc::now();
        let plan = StudyPlan {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            subject: new.subject,
            description: new.description,
            planned_date: new.planned_date,
            duration: new.duration,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.studies.write().await.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
        let studies = self.studies.read().await;
        Ok(studies.get(&id).filter(|p| p.user_id == user_id).cloned())
    }

    async fn update(&self, plan: &StudyPlan) -> Result<StudyPlan, StoreError> {
        let mut studies = self.studies.write().await;
        if !studies.contains_key(&plan.id) {
            return Err(StoreError::Sqlx(sqlx::Error::RowNotFound));
        }
        let mut updated = plan.clone();
        updated.updated_at = Utc::now();
        studies.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut studies = self.studies.write().await;
        match studies.get(&id) {
            Some(p) if p.user_id == user_id => {
                studies.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
