//! Location resolution, paged vacancy search and result shaping.
//!
//! [`VacancyFetcher`] wraps any [`VacancySource`] and produces either rendered
//! lines for the chat ([`VacancyFetcher::fetch_page`]) or structured
//! [`VacancyRecord`]s for the database ([`VacancyFetcher::fetch_records`]).
//! Errors are returned as [`FetchError`]; presenting them as "no results" is
//! the caller's decision.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::criteria::{Criteria, SearchQuery};
use crate::hh::types::Salary;
use crate::hh::{HhError, VacancyItem, VacancySource};

/// Results per page requested from the API.
pub const PAGE_SIZE: u32 = 5;

/// Rendered instead of a salary range when the vacancy has none.
pub const SALARY_UNSPECIFIED: &str = "Не указана";

const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City '{0}' not found")]
    LocationNotFound(String),

    #[error(transparent)]
    Api(#[from] HhError),
}

/// A vacancy flattened to the columns of the `vacancies` table.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyRecord {
    pub vacancy_id: String,
    pub name: String,
    pub employer_name: Option<String>,
    pub experience: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub city: Option<String>,
    pub schedule: Option<String>,
    pub published_at: Option<NaiveDateTime>,
}

impl From<VacancyItem> for VacancyRecord {
    fn from(item: VacancyItem) -> Self {
        let salary = item.salary.clone().unwrap_or_default();
        let published_at = item.published_at.as_deref().and_then(parse_published_at);
        Self {
            employer_name: item.employer_name().map(str::to_string),
            experience: item.experience_name().map(str::to_string),
            city: item.city_name().map(str::to_string),
            schedule: item.schedule_name().map(str::to_string),
            salary_from: salary.from.and_then(|v| i32::try_from(v).ok()),
            salary_to: salary.to.and_then(|v| i32::try_from(v).ok()),
            currency: salary.currency,
            vacancy_id: item.id,
            name: item.name,
            published_at,
        }
    }
}

/// Salary bounds typed by a user as free text, e.g. "от 50000 до 100000".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub from: u64,
    pub to: u64,
}

impl SalaryRange {
    /// Takes the first two integers found in `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut numbers = NUMBER_RE.find_iter(text).map(|m| m.as_str().parse::<u64>());
        let from = numbers.next()?.ok()?;
        let to = numbers.next()?.ok()?;
        Some(Self { from, to })
    }

    /// Integer midpoint, used as the single `salary` filter.
    pub fn midpoint(self) -> u64 {
        self.from / 2 + self.to / 2 + (self.from % 2 + self.to % 2) / 2
    }
}

fn parse_published_at(raw: &str) -> Option<NaiveDateTime> {
    match DateTime::parse_from_str(raw, PUBLISHED_AT_FORMAT) {
        Ok(dt) => Some(dt.naive_local()),
        Err(e) => {
            warn!(raw, error = %e, "unparseable published_at");
            None
        }
    }
}

fn format_salary(salary: Option<&Salary>) -> String {
    let Some(salary) = salary else {
        return SALARY_UNSPECIFIED.to_string();
    };
    let currency = salary.currency.as_deref().unwrap_or("");
    let text = match (salary.from, salary.to) {
        (Some(from), Some(to)) => format!("{from} - {to} {currency}"),
        (Some(from), None) => format!("от {from} {currency}"),
        (None, Some(to)) => format!("до {to} {currency}"),
        (None, None) => return SALARY_UNSPECIFIED.to_string(),
    };
    text.trim_end().to_string()
}

/// Renders one numbered chat line for a vacancy.
pub fn render_vacancy(number: usize, item: &VacancyItem) -> String {
    let body = format!(
        "{} в {} с зарплатой {} в {} ({})",
        item.name,
        item.employer_name().unwrap_or("—"),
        format_salary(item.salary.as_ref()),
        item.city_name().unwrap_or("—"),
        item.schedule_name().unwrap_or("—"),
    );
    match item.alternate_url.as_deref() {
        Some(url) => format!("{number}. [{body}]({url})"),
        None => format!("{number}. {body}"),
    }
}

/// Issues paged searches against a [`VacancySource`].
pub struct VacancyFetcher<S> {
    source: S,
    page_size: u32,
}

impl<S: VacancySource> VacancyFetcher<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self { source, page_size }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Resolves a free-text city to the first suggested area id.
    ///
    /// Zero suggestions, a non-success status and transport errors all
    /// yield `None`.
    pub async fn resolve_location(&self, city: &str) -> Option<String> {
        match self.source.suggest_areas(city).await {
            Ok(suggestions) => {
                let first = suggestions.items.into_iter().next();
                if let Some(area) = &first {
                    debug!(city, area_id = %area.id, area = %area.text, "city resolved");
                }
                first.map(|area| area.id)
            }
            Err(e) => {
                warn!(city, error = %e, "area suggestion failed");
                None
            }
        }
    }

    /// Resolves the city, runs one search and renders each hit as a chat line.
    pub async fn fetch_page(
        &self,
        criteria: &Criteria,
        page: u32,
    ) -> Result<Vec<String>, FetchError> {
        let area = self
            .resolve_location(&criteria.city)
            .await
            .ok_or_else(|| FetchError::LocationNotFound(criteria.city.clone()))?;
        let query = SearchQuery::from_criteria(criteria, area);

        info!(?query, page, "fetching vacancies");
        let body = self.source.search(&query, page, self.page_size).await?;

        Ok(body
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| render_vacancy(i + 1, item))
            .collect())
    }

    /// Runs one search for an already-normalized query and returns raw records
    /// in API order.
    pub async fn fetch_records(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<VacancyRecord>, FetchError> {
        info!(?query, page, "fetching vacancy records");
        let body = self.source.search(query, page, self.page_size).await?;
        Ok(body.items.into_iter().map(VacancyRecord::from).collect())
    }
}
