//! Wire types for the hh.ru `/vacancies` and `/suggests/areas` endpoints.
//!
//! Only the fields the bot and the batch fetcher read are modelled. Every
//! nested object is optional because the API omits or nulls them freely.

use serde::{Deserialize, Serialize};

/// One page of `GET /vacancies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VacanciesPage {
    #[serde(default)]
    pub items: Vec<VacancyItem>,
    /// Total number of matches across all pages.
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub page: u32,
}

/// A single vacancy as returned by the search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VacancyItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub employer: Option<Named>,
    pub experience: Option<Named>,
    pub salary: Option<Salary>,
    pub area: Option<Named>,
    pub schedule: Option<Named>,
    pub alternate_url: Option<String>,
    pub published_at: Option<String>,
}

/// Any dictionary object (area, schedule, employer); only its display name is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

/// Response of `GET /suggests/areas`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaSuggestions {
    #[serde(default)]
    pub items: Vec<AreaSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaSuggestion {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl VacancyItem {
    pub fn employer_name(&self) -> Option<&str> {
        self.employer.as_ref().and_then(|e| e.name.as_deref())
    }

    pub fn city_name(&self) -> Option<&str> {
        self.area.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn schedule_name(&self) -> Option<&str> {
        self.schedule.as_ref().and_then(|s| s.name.as_deref())
    }

    pub fn experience_name(&self) -> Option<&str> {
        self.experience.as_ref().and_then(|e| e.name.as_deref())
    }
}
