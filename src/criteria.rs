//! Search criteria and the fixed label-to-code tables used by the hh.ru API.
//!
//! Experience and schedule are offered to users as four fixed Russian labels.
//! [`Experience`] and [`Schedule`] map those labels to the API's enumerated
//! codes. Unknown labels fall back to a default code instead of failing.

use std::fmt;

/// Work experience bracket accepted by the `experience` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Experience {
    #[default]
    NoExperience,
    Between1And3,
    Between3And6,
    MoreThan6,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::NoExperience,
        Experience::Between1And3,
        Experience::Between3And6,
        Experience::MoreThan6,
    ];

    /// Exact match against the human-readable labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Experience::NoExperience => "Нет опыта",
            Experience::Between1And3 => "От 1 года до 3 лет",
            Experience::Between3And6 => "От 3 до 5 лет",
            Experience::MoreThan6 => "Более 5 лет",
        }
    }

    pub fn api_code(self) -> &'static str {
        match self {
            Experience::NoExperience => "noExperience",
            Experience::Between1And3 => "between1And3",
            Experience::Between3And6 => "between3And6",
            Experience::MoreThan6 => "moreThan6",
        }
    }

    /// Quick-choice layout: two rows of two labels.
    pub fn keyboard() -> Vec<Vec<String>> {
        Self::ALL
            .chunks(2)
            .map(|row| row.iter().map(|e| e.label().to_string()).collect())
            .collect()
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Work schedule accepted by the `schedule` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Schedule {
    #[default]
    FullDay,
    Shift,
    Flexible,
    Remote,
}

impl Schedule {
    pub const ALL: [Schedule; 4] = [
        Schedule::FullDay,
        Schedule::Shift,
        Schedule::Flexible,
        Schedule::Remote,
    ];

    /// Exact match against the human-readable labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Schedule::FullDay => "Полный рабочий день",
            Schedule::Shift => "Сменный график",
            Schedule::Flexible => "Гибкий график",
            Schedule::Remote => "Удаленная работа",
        }
    }

    pub fn api_code(self) -> &'static str {
        match self {
            Schedule::FullDay => "fullDay",
            Schedule::Shift => "shift",
            Schedule::Flexible => "flexible",
            Schedule::Remote => "remote",
        }
    }

    /// Quick-choice layout: two rows of two labels.
    pub fn keyboard() -> Vec<Vec<String>> {
        Self::ALL
            .chunks(2)
            .map(|row| row.iter().map(|s| s.label().to_string()).collect())
            .collect()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps an experience label to its API code, defaulting to `noExperience`.
pub fn map_experience(label: &str) -> &'static str {
    Experience::from_label(label).unwrap_or_default().api_code()
}

/// Maps a schedule label to its API code, defaulting to `fullDay`.
pub fn map_schedule(label: &str) -> &'static str {
    Schedule::from_label(label).unwrap_or_default().api_code()
}

/// The five-field filter collected from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub title: String,
    pub salary: u64,
    pub experience: Experience,
    pub city: String,
    pub schedule: Schedule,
}

/// Normalized parameters for one `/vacancies` request, minus paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub salary: u64,
    pub experience: &'static str,
    pub area: String,
    pub schedule: &'static str,
}

impl SearchQuery {
    /// Builds the query for criteria whose city was resolved to `area`.
    pub fn from_criteria(criteria: &Criteria, area: String) -> Self {
        Self {
            text: criteria.title.clone(),
            salary: criteria.salary,
            experience: criteria.experience.api_code(),
            area,
            schedule: criteria.schedule.api_code(),
        }
    }
}
