use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default timestamp for snapshots submitted without one
fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A point-in-time inventory of asset instances belonging to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Id,
    #[serde(rename = "project")]
    pub project_id: Id,
    pub name: String,
    #[serde(default = "default_timestamp")]
    pub taken_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
