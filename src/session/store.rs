use std::collections::HashMap;

use super::state::State;
use crate::criteria::{Criteria, Experience, Schedule};

/// Criteria collected so far; every field is filled by one dialogue step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaDraft {
    pub title: Option<String>,
    pub salary: Option<u64>,
    pub experience: Option<Experience>,
    pub city: Option<String>,
    pub schedule: Option<Schedule>,
}

impl CriteriaDraft {
    /// Returns the full criteria once all five fields are set.
    pub fn complete(&self) -> Option<Criteria> {
        Some(Criteria {
            title: self.title.clone()?,
            salary: self.salary?,
            experience: self.experience?,
            city: self.city.clone()?,
            schedule: self.schedule?,
        })
    }
}

/// Per-chat dialogue state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: State,
    pub draft: CriteriaDraft,
    /// Set when the dialogue completes; reused for every further page.
    pub criteria: Option<Criteria>,
    /// Every rendered result line fetched so far, across pages.
    pub vacancies: Vec<String>,
    /// Zero-based index of the last page fetched.
    pub page: u32,
}

/// Sessions keyed by Telegram chat id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<i64, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: i64) -> Option<&Session> {
        self.sessions.get(&chat_id)
    }

    pub fn get_mut(&mut self, chat_id: i64) -> Option<&mut Session> {
        self.sessions.get_mut(&chat_id)
    }

    /// Returns the chat's session, creating an idle one if it has none.
    pub fn get_or_create(&mut self, chat_id: i64) -> &mut Session {
        self.sessions.entry(chat_id).or_default()
    }

    /// Drops the chat's session entirely.
    pub fn reset(&mut self, chat_id: i64) {
        self.sessions.remove(&chat_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
