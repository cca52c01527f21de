//! One-shot fetch of a single result page into PostgreSQL.
//!
//! The run creates the database and the `vacancies` table when missing,
//! performs exactly one search and inserts one row per result in API order.
//! Rows are inserted without a transaction; a failed insert aborts the run
//! and leaves earlier rows in place.

use anyhow::{Context, Result, bail};
use sqlx::{Connection, Executor, PgConnection};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::criteria::{SearchQuery, map_experience, map_schedule};
use crate::fetcher::{SalaryRange, VacancyFetcher, VacancyRecord};
use crate::hh::VacancySource;

pub const USAGE: &str =
    "Usage: vacancy-bot fetch <title> <salary> <experience> <city> <schedule>";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vacancies (
    id SERIAL PRIMARY KEY,
    vacancy_id TEXT,
    name TEXT,
    employer_name TEXT,
    experience TEXT,
    salary_from INTEGER,
    salary_to INTEGER,
    currency TEXT,
    city TEXT,
    schedule TEXT,
    published_at TIMESTAMP
)
"#;

const INSERT_VACANCY: &str = r#"
INSERT INTO vacancies (vacancy_id, name, employer_name, experience, salary_from, salary_to, currency, city, schedule, published_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchArgsError {
    #[error("expected 5 arguments, got {0}")]
    MissingArguments(usize),

    #[error("salary must contain two numbers, got {0:?}")]
    InvalidSalary(String),
}

/// Positional arguments of the `fetch` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchArgs {
    pub title: String,
    pub salary: SalaryRange,
    pub experience: String,
    pub city: String,
    pub schedule: String,
}

impl BatchArgs {
    /// Needs at least five values; anything after the fifth is ignored.
    pub fn parse(args: &[String]) -> Result<Self, BatchArgsError> {
        let [title, salary, experience, city, schedule, ..] = args else {
            return Err(BatchArgsError::MissingArguments(args.len()));
        };
        let salary = SalaryRange::parse(salary)
            .ok_or_else(|| BatchArgsError::InvalidSalary(salary.clone()))?;

        Ok(Self {
            title: title.clone(),
            salary,
            experience: experience.clone(),
            city: city.clone(),
            schedule: schedule.clone(),
        })
    }

    /// Unknown experience and schedule labels fall back to the default codes.
    pub fn query(&self, area: String) -> SearchQuery {
        SearchQuery {
            text: self.title.clone(),
            salary: self.salary.midpoint(),
            experience: map_experience(&self.experience),
            area,
            schedule: map_schedule(&self.schedule),
        }
    }
}

/// Destination for fetched records.
pub trait VacancySink {
    async fn insert(&mut self, record: &VacancyRecord) -> Result<()>;
}

/// A single PostgreSQL connection to the vacancies database.
pub struct PgVacancyStore {
    conn: PgConnection,
}

impl PgVacancyStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = PgConnection::connect(database_url)
            .await
            .context("failed to connect to the vacancies database")?;
        Ok(Self { conn })
    }

    pub async fn ensure_table(&mut self) -> Result<()> {
        self.conn
            .execute(CREATE_TABLE)
            .await
            .context("failed to create table vacancies")?;
        Ok(())
    }

    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "failed to close database connection");
        }
    }
}

impl VacancySink for PgVacancyStore {
    async fn insert(&mut self, record: &VacancyRecord) -> Result<()> {
        sqlx::query(INSERT_VACANCY)
            .bind(&record.vacancy_id)
            .bind(&record.name)
            .bind(&record.employer_name)
            .bind(&record.experience)
            .bind(record.salary_from)
            .bind(record.salary_to)
            .bind(&record.currency)
            .bind(&record.city)
            .bind(&record.schedule)
            .bind(record.published_at)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Creates database `name` through the maintenance connection unless it exists.
pub async fn ensure_database(admin_url: &str, name: &str) -> Result<()> {
    if !is_plain_identifier(name) {
        bail!("invalid database name {name:?}");
    }

    let mut conn = PgConnection::connect(admin_url)
        .await
        .context("failed to connect to the maintenance database")?;

    let result = async {
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1")
                .bind(name)
                .fetch_optional(&mut conn)
                .await?;
        if exists.is_none() {
            info!(database = name, "creating database");
            conn.execute(format!("CREATE DATABASE \"{name}\"").as_str())
                .await?;
        }
        Ok::<_, sqlx::Error>(())
    }
    .await;

    if let Err(e) = conn.close().await {
        warn!(error = %e, "failed to close maintenance connection");
    }
    result.with_context(|| format!("failed to create database {name}"))
}

/// Numeric city arguments are used as area ids as-is; anything else goes
/// through the area suggestions.
async fn area_for_city<S: VacancySource>(
    fetcher: &VacancyFetcher<S>,
    city: &str,
) -> Option<String> {
    if !city.is_empty() && city.chars().all(|c| c.is_ascii_digit()) {
        return Some(city.to_string());
    }
    fetcher.resolve_location(city).await
}

/// Fetches page 0 and hands every record to `sink`, returning the row count.
///
/// An unresolved city or a failed search inserts nothing and is not an error.
pub async fn persist<S: VacancySource, K: VacancySink>(
    fetcher: &VacancyFetcher<S>,
    sink: &mut K,
    args: &BatchArgs,
) -> Result<usize> {
    let Some(area) = area_for_city(fetcher, &args.city).await else {
        error!(city = %args.city, "City '{}' not found", args.city);
        return Ok(0);
    };

    let query = args.query(area);
    let records = match fetcher.fetch_records(&query, 0).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "failed to fetch data from API");
            return Ok(0);
        }
    };

    for record in &records {
        sink.insert(record)
            .await
            .with_context(|| format!("failed to insert vacancy {}", record.vacancy_id))?;
    }
    Ok(records.len())
}

/// Database URLs and name used by a batch run.
pub struct BatchTarget<'a> {
    pub admin_url: &'a str,
    pub database_url: &'a str,
    pub database_name: &'a str,
}

/// Full batch run: database, table, fetch, insert.
pub async fn run<S: VacancySource>(
    fetcher: &VacancyFetcher<S>,
    target: &BatchTarget<'_>,
    args: &BatchArgs,
) -> Result<usize> {
    ensure_database(target.admin_url, target.database_name).await?;

    let mut store = PgVacancyStore::connect(target.database_url).await?;
    let result = async {
        store.ensure_table().await?;
        persist(fetcher, &mut store, args).await
    }
    .await;
    store.close().await;

    let inserted = result?;
    info!(inserted, "data successfully inserted into PostgreSQL");
    Ok(inserted)
}
