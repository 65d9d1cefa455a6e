use crate::model::{Id, CATEGORY_DELIMITER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the bucket collecting every category past the top-N cutoff
pub const OTHER_MERCHANDISING: &str = "Other Merchandising";

/// How many categories to show before folding the rest into "Other"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopN(usize);

impl TopN {
    pub fn new(value: usize) -> Option<Self> {
        (value > 0).then_some(TopN(value))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for TopN {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        TopN::new(value).ok_or_else(|| "top-N cutoff must be positive".to_string())
    }
}

impl From<TopN> for usize {
    fn from(top_n: TopN) -> Self {
        top_n.0
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linear footage attributed to one merchandising category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    /// Presentation label, `//` rendered as `, `
    pub label: String,
    /// Grouping key: the trimmed category token
    pub key: String,
    /// Linear feet, two decimals
    pub value: f64,
    /// Share of the grand total, one decimal
    pub percentage: f64,
}

impl CategoryAllocation {
    pub fn is_other(&self) -> bool {
        self.key == OTHER_MERCHANDISING
    }
}

/// Format a category key for display
pub fn display_label(key: &str) -> String {
    key.replace(CATEGORY_DELIMITER, ", ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchandisingSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<Id>,
    pub top_n: TopN,
    pub rows: Vec<CategoryAllocation>,
    /// Grand total in linear feet, two decimals
    pub total_linear_feet: f64,
    /// Grand total formatted with one decimal, "0.0" when nothing is categorized
    pub total_display: String,
}

impl MerchandisingSummary {
    pub fn for_snapshot(mut self, snapshot_id: Id) -> Self {
        self.snapshot_id = Some(snapshot_id);
        self
    }
}
