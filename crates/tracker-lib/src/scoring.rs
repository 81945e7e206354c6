//! Migration readiness scoring
//!
//! Scores start at 100 and move by fixed, independent adjustments evaluated
//! against a finalized application. The result is clamped once at the end.

use crate::models::{ApplicationRecord, DataQuality};
use serde::{Deserialize, Serialize};

const BASE_SCORE: i32 = 100;

/// Scores at or above this are counted as ready for migration
pub const READY_THRESHOLD: u8 = 70;

const ACTIVE_PENALTY: i32 = 30;
const LARGE_SCALE_PENALTY: i32 = 20;
const MEDIUM_SCALE_PENALTY: i32 = 10;
const PRODUCTION_PENALTY: i32 = 20;
const NETWORKING_PENALTY: i32 = 10;
const INCOMPLETE_DATA_PENALTY: i32 = 15;
const ABANDONED_BONUS: i32 = 20;
const IDLE_BONUS: i32 = 10;

const LARGE_SCALE_RUNNING_PODS: u64 = 10;
const MEDIUM_SCALE_RUNNING_PODS: u64 = 5;
const MANY_SERVICES: u64 = 5;
const ABANDONED_AFTER_DAYS: i64 = 60;
const IDLE_AFTER_DAYS: i64 = 30;

/// Compute the readiness score (0-100, higher is easier to migrate)
pub fn score(app: &ApplicationRecord) -> u8 {
    clamp_score(raw_score(app))
}

/// Unclamped sum of the base score and every adjustment
pub fn raw_score(app: &ApplicationRecord) -> i32 {
    let mut score = BASE_SCORE;

    // Active apps need coordinated migration windows
    if app.is_active {
        score -= ACTIVE_PENALTY;
    }

    if app.running_pods > LARGE_SCALE_RUNNING_PODS {
        score -= LARGE_SCALE_PENALTY;
    } else if app.running_pods > MEDIUM_SCALE_RUNNING_PODS {
        score -= MEDIUM_SCALE_PENALTY;
    }

    if app.has_environment("production") {
        score -= PRODUCTION_PENALTY;
    }

    if app.total_services > MANY_SERVICES {
        score -= NETWORKING_PENALTY;
    }

    if app.data_quality == DataQuality::Incomplete {
        score -= INCOMPLETE_DATA_PENALTY;
    }

    match app.days_since_activity {
        Some(days) if days > ABANDONED_AFTER_DAYS => score += ABANDONED_BONUS,
        Some(days) if days > IDLE_AFTER_DAYS => score += IDLE_BONUS,
        _ => {}
    }

    score
}

fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

pub fn is_ready(app: &ApplicationRecord) -> bool {
    app.migration_readiness >= READY_THRESHOLD
}

/// Follow-up action implied by a readiness score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationAction {
    Ready,
    Review,
    Analyze,
    Complex,
}

impl MigrationAction {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => Self::Ready,
            60..=79 => Self::Review,
            40..=59 => Self::Analyze,
            _ => Self::Complex,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Ready - Schedule Migration",
            Self::Review => "Review - Minor Planning Needed",
            Self::Analyze => "Analyze - Significant Planning Required",
            Self::Complex => "Complex - Detailed Analysis Required",
        }
    }
}

/// Rough size of the migration effort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn of(app: &ApplicationRecord) -> Self {
        if app.total_pods > 10 || app.total_services > 5 {
            Self::High
        } else if app.total_pods > 5 || app.total_services > 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}
