use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::game::required;
use super::{deserialize_opt_date, parse_date, PlanStatus};
use crate::error::ApiError;

/// A scheduled study session. Same shape as a game plan minus the
/// rating/notes/last-played extras, with `subject` in place of `genre`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub planned_date: DateTime<Utc>,
    pub duration: String,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudyPlan {
    pub user_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub planned_date: DateTime<Utc>,
    pub duration: String,
    pub status: PlanStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStudyRequest {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub planned_date: Option<String>,
    pub duration: Option<String>,
    pub status: Option<PlanStatus>,
}

impl CreateStudyRequest {
    pub fn into_new(self, user_id: Uuid) -> Result<NewStudyPlan, ApiError> {
        let mut field_errors = HashMap::new();

        let title = required(self.title, "title", &mut field_errors);
        let subject = required(self.subject, "subject", &mut field_errors);
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

        Ok(NewStudyPlan {
            user_id,
            title,
            subject,
            description: self.description,
            planned_date: planned_date.unwrap(),
            duration,
            status: self.status.unwrap_or_default(),
        })
    }
}

pub const STUDY_UPDATE_FIELDS: &[&str] = &[
    "title",
    "subject",
    "description",
    "plannedDate",
    "duration",
    "status",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub planned_date: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub status: Option<PlanStatus>,
}

impl StudyUpdate {
    pub fn apply(self, plan: &mut StudyPlan) {
        if let Some(title) = self.title {
            plan.title = title;
        }
        if let Some(subject) = self.subject {
            plan.subject = subject;
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
    }
}
