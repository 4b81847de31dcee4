// src/domain/site.rs

use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle position of a record. A record is in exactly one stage at a
/// time; moving it between stages is a move, never a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Ongoing,
    Soak,
    Cancelled,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ongoing => "ongoing",
            Stage::Soak => "soak",
            Stage::Cancelled => "cancelled",
        }
    }

    /// Parses a stage name as it appears in request paths.
    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "ongoing" => Some(Stage::Ongoing),
            "soak" => Some(Stage::Soak),
            "cancelled" => Some(Stage::Cancelled),
            _ => None,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Ongoing
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tracked site, as entered on the whiteboard.
///
/// All user-supplied fields are free text with no validation. `market`,
/// `rsm` and `rsm_email` are derived from `site_id` by the market resolver
/// and are read-only from the user's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub date: String,
    pub project: String,
    pub sa: String,
    pub market: String,
    pub site_id: String,
    pub signum: String,
    pub asp_name_number: String,
    pub asp_email_id: String,
    pub comments: String,
    pub rsm: String,
    pub rsm_email: String,
    #[serde(default)]
    pub stage: Stage,
    /// Stamped when the record enters Soak or Cancelled; absent while Ongoing.
    #[serde(default)]
    pub stage_entered_at: Option<DateTime<Utc>>,
}

/// Column headers in the canonical display/export order.
pub const COLUMN_HEADERS: [&str; 12] = [
    "Date",
    "Project",
    "SA",
    "Market",
    "Site ID",
    "Signum",
    "ASP Name & Number",
    "ASP Email ID",
    "Comments",
    "RSM",
    "RSM Email",
    "Stage Entered",
];

impl SiteRecord {
    /// An empty record dated today, in the Ongoing stage.
    pub fn new() -> Self {
        SiteRecord {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            project: String::new(),
            sa: String::new(),
            market: String::new(),
            site_id: String::new(),
            signum: String::new(),
            asp_name_number: String::new(),
            asp_email_id: String::new(),
            comments: String::new(),
            rsm: String::new(),
            rsm_email: String::new(),
            stage: Stage::Ongoing,
            stage_entered_at: None,
        }
    }

    /// Sets a user-editable field by name.
    ///
    /// The derived fields (`market`, `rsm`, `rsm_email`) are rejected here:
    /// only the resolver writes them.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ServerError> {
        let slot = match field {
            "date" => &mut self.date,
            "project" => &mut self.project,
            "sa" => &mut self.sa,
            "site_id" => &mut self.site_id,
            "signum" => &mut self.signum,
            "asp_name_number" => &mut self.asp_name_number,
            "asp_email_id" => &mut self.asp_email_id,
            "comments" => &mut self.comments,
            other => return Err(ServerError::UnknownField(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }

    /// String form of every column in the canonical order, matching
    /// `COLUMN_HEADERS`. Used by both the search filter and the export.
    pub fn column_values(&self) -> [String; 12] {
        [
            self.date.clone(),
            self.project.clone(),
            self.sa.clone(),
            self.market.clone(),
            self.site_id.clone(),
            self.signum.clone(),
            self.asp_name_number.clone(),
            self.asp_email_id.clone(),
            self.comments.clone(),
            self.rsm.clone(),
            self.rsm_email.clone(),
            self.stage_entered_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        ]
    }
}

impl Default for SiteRecord {
    fn default() -> Self {
        SiteRecord::new()
    }
}
