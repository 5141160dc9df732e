//! Records produced by the extractor and persisted for the display layer
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scheduled class occurrence.
/// Optional fields are empty strings when the source has no matching block.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct Lesson {
    pub date: String,
    pub time: String,
    pub subject: String,
    pub category: String,
    pub teacher: String,
    pub building: String,
    pub address: String,
    pub auditorium: String,
}

/// ISO date -> lessons of that day.
/// ISO dates sort chronologically, so iteration goes Monday to Sunday.
pub type WeeklySchedule = BTreeMap<String, Vec<Lesson>>;

/// ISO date -> reason the day could not be fetched.
pub type FailureReport = BTreeMap<String, String>;

/// Result of one aggregation cycle: the full week plus the days that failed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeekReport {
    pub schedule: WeeklySchedule,
    pub failures: FailureReport,
}

impl WeekReport {
    pub fn failed_dates(&self) -> Vec<String> {
        self.failures.keys().cloned().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn lessons_count(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }
}
