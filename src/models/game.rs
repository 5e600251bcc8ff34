use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::{deserialize_opt_date, parse_date, PlanStatus};
use crate::error::ApiError;

/// A scheduled gaming session owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GamePlan {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub genre: String,
    pub description: Option<String>,
    pub planned_date: DateTime<Utc>,
    /// Free-form text ("2 hours", "40", ...), deliberately not a duration type.
    pub duration: String,
    pub status: PlanStatus,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub last_played: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create payload with the owner forced to the caller.
#[derive(Debug, Clone)]
pub struct NewGamePlan {
    pub user_id: Uuid,
    pub title: String,
    pub genre: String,
    pub description: Option<String>,
    pub planned_date: DateTime<Utc>,
    pub duration: String,
    pub status: PlanStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGameRequest {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub planned_date: Option<String>,
    pub duration: Option<String>,
    pub status: Option<PlanStatus>,
}

impl CreateGameRequest {
    /// Collects every missing or malformed required field into one
    /// validation error before any store round-trip.
    pub fn into_new(self, user_id: Uuid) -> Result<NewGamePlan, ApiError> {
        let mut field_errors = HashMap::new();

        let title = required(self.title, "title", &mut field_errors);
        let genre = required(self.genre, "genre", &mut field_errors);
        let duration = required(self.duration, "duration", &mut field_errors);

        let planned_date = match self.planned_date.as_deref().map(str::trim) {
            None | Some("") => {
                field_errors.insert(
                    "plannedDate".to_string(),
                    "This field is required".to_string(),
                );
                None
            }
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    field_errors.insert(
                        "plannedDate".to_string(),
                        format!("Invalid date: {}", raw),
                    );
                }
                parsed
            }
        };

        if !field_errors.is_empty() {
            return Err(ApiError::validation(
                "Missing required fields",
                Some(field_errors),
            ));
        }

        Ok(NewGamePlan {
            user_id,
            title,
            genre,
            description: self.description,
            planned_date: planned_date.unwrap(),
            duration,
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Keys accepted by a full update. Anything else is rejected, including
/// attempts to rewrite the owner or server timestamps.
pub const GAME_UPDATE_FIELDS: &[&str] = &[
    "title",
    "genre",
    "description",
    "plannedDate",
    "duration",
    "status",
    "rating",
    "notes",
    "lastPlayed",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameUpdate {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub planned_date: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub status: Option<PlanStatus>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub last_played: Option<DateTime<Utc>>,
}

impl GameUpdate {
    /// Overwrites every field present in the request; absent fields keep
    /// their stored values.
    pub fn apply(self, plan: &mut GamePlan) {
        if let Some(title) = self.title {
            plan.title = title;
        }
        if let Some(genre) = self.genre {
            plan.genre = genre;
        }
        if let Some(description) = self.description {
            plan.description = Some(description);
        }
        if let Some(planned_date) = self.planned_date {
            plan.planned_date = planned_date;
        }
        if let Some(duration) = self.duration {
            plan.duration = duration;
        }
        if let Some(status) = self.status {
            plan.status = status;
        }
        if let Some(rating) = self.rating {
            plan.rating = Some(rating);
        }
        if let Some(notes) = self.notes {
            plan.notes = Some(notes);
        }
        if let Some(last_played) = self.last_played {
            plan.last_played = Some(last_played);
        }
    }
}

/// The only keys a partial (status) update may touch.
pub const GAME_PATCH_FIELDS: &[&str] = &["status", "rating", "notes", "lastPlayed"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamePatch {
    pub status: Option<PlanStatus>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub last_played: Option<DateTime<Utc>>,
}

impl GamePatch {
    pub fn apply(self, plan: &mut GamePlan) {
        if let Some(status) = self.status {
            plan.status = status;
        }
        if let Some(rating) = self.rating {
            plan.rating = Some(rating);
        }
        if let Some(notes) = self.notes {
            plan.notes = Some(notes);
        }
        if let Some(last_played) = self.last_played {
            plan.last_played = Some(last_played);
        }
    }
}

pub fn validate_rating(rating: i32) -> Result<(), ApiError> {
    if (1..=5).contains(&rating) {
        return Ok(());
    }
    let mut field_errors = HashMap::new();
    field_errors.insert(
        "rating".to_string(),
        "Rating must be between 1 and 5".to_string(),
    );
    Err(ApiError::validation("Invalid field value", Some(field_errors)))
}

/// One row of the global trending aggregation: game plans grouped by title.
/// `_id` carries the grouped title on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrendingGame {
    #[serde(rename = "_id")]
    pub title: String,
    pub count: i64,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
}

pub(crate) fn required(
    value: Option<String>,
    name: &str,
    field_errors: &mut HashMap<String, String>,
) -> String {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            field_errors.insert(name.to_string(), "This field is required".to_string());
            String::new()
        }
    }
}
