use std::fmt;

use super::store::Session;
use crate::criteria::{Criteria, Experience, Schedule};

/// States of the search dialogue.
///
/// Each session flows through:
/// IDLE → AWAITING_TITLE → AWAITING_SALARY → AWAITING_EXPERIENCE →
/// AWAITING_CITY → AWAITING_SCHEDULE → COMPLETED
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Idle,
    AwaitingTitle,
    AwaitingSalary,
    AwaitingExperience,
    AwaitingCity,
    AwaitingSchedule,
    Completed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => write!(f, "IDLE"),
            State::AwaitingTitle => write!(f, "AWAITING_TITLE"),
            State::AwaitingSalary => write!(f, "AWAITING_SALARY"),
            State::AwaitingExperience => write!(f, "AWAITING_EXPERIENCE"),
            State::AwaitingCity => write!(f, "AWAITING_CITY"),
            State::AwaitingSchedule => write!(f, "AWAITING_SCHEDULE"),
            State::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// The result of feeding one text reply into a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Input accepted, moved to the given state.
    Next(State),
    /// Input rejected, the session stays where it is.
    Retry(State),
    /// The last field was accepted; the criteria are ready for a search.
    Complete(Criteria),
    /// The session is not collecting input (idle or already completed).
    Ignored,
}

/// Drives a [`Session`] through the dialogue.
pub struct StateMachine;

impl StateMachine {
    /// Enters the dialogue from any state, discarding previous criteria
    /// and results.
    pub fn begin(session: &mut Session) -> Transition {
        *session = Session::default();
        session.state = State::AwaitingTitle;
        Transition::Next(State::AwaitingTitle)
    }

    /// Applies a text reply to the session's current state.
    ///
    /// Input is trimmed first. Invalid input never changes the state.
    pub fn next(session: &mut Session, input: &str) -> Transition {
        let input = input.trim();

        let transition = match session.state {
            State::Idle | State::Completed => return Transition::Ignored,
            State::AwaitingTitle => {
                if input.is_empty() {
                    Transition::Retry(State::AwaitingTitle)
                } else {
                    session.draft.title = Some(input.to_string());
                    Transition::Next(State::AwaitingSalary)
                }
            }
            State::AwaitingSalary => match parse_salary(input) {
                Some(salary) => {
                    session.draft.salary = Some(salary);
                    Transition::Next(State::AwaitingExperience)
                }
                None => Transition::Retry(State::AwaitingSalary),
            },
            State::AwaitingExperience => match Experience::from_label(input) {
                Some(experience) => {
                    session.draft.experience = Some(experience);
                    Transition::Next(State::AwaitingCity)
                }
                None => Transition::Retry(State::AwaitingExperience),
            },
            State::AwaitingCity => {
                if input.is_empty() {
                    Transition::Retry(State::AwaitingCity)
                } else {
                    session.draft.city = Some(input.to_string());
                    Transition::Next(State::AwaitingSchedule)
                }
            }
            State::AwaitingSchedule => match Schedule::from_label(input) {
                Some(schedule) => {
                    session.draft.schedule = Some(schedule);
                    match session.draft.complete() {
                        Some(criteria) => Transition::Complete(criteria),
                        // Unreachable through this machine; start over if it happens.
                        None => return Self::begin(session),
                    }
                }
                None => Transition::Retry(State::AwaitingSchedule),
            },
        };

        match &transition {
            Transition::Next(state) => session.state = *state,
            Transition::Complete(criteria) => {
                session.state = State::Completed;
                session.criteria = Some(criteria.clone());
                session.vacancies.clear();
                session.page = 0;
            }
            Transition::Retry(_) | Transition::Ignored => {}
        }

        transition
    }
}

/// Accepts only a non-empty run of ASCII digits with a value above zero.
fn parse_salary(input: &str) -> Option<u64> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse::<u64>().ok().filter(|&v| v > 0)
}
