//! Turns incoming chat messages into dialogue steps and reply texts.
//!
//! [`Conversation`] owns the [`SessionStore`] and the [`VacancyFetcher`].
//! Each message is routed to a handler that receives the sender's
//! [`Session`] by `&mut`; handlers never touch another chat's state.

use tracing::{error, info};

use super::state::{State, StateMachine, Transition};
use super::store::{Session, SessionStore};
use crate::criteria::{Criteria, Experience, Schedule};
use crate::fetcher::VacancyFetcher;
use crate::hh::VacancySource;

pub const GREETING: &str = "Привет! Я бот по подбору вакансий на hh.ru.\n\
    Я могу помочь вам найти работу по заданным критериям.\n\
    Используйте команду /job_selection, чтобы начать подбор вакансий.\n\
    Используйте команду /more_jobs для продолжения поисков";
pub const ASK_TITLE: &str = "Пожалуйста, отправь мне название вакансии, которую ты ищешь.";
pub const ASK_SALARY: &str = "Теперь укажи желаемую заработную плату (например, 50000).";
pub const BAD_SALARY: &str = "Пожалуйста, введи положительное число для заработной платы.";
pub const ASK_EXPERIENCE: &str = "Выбери диапазон опыта работы:";
pub const BAD_EXPERIENCE: &str =
    "Пожалуйста, выбери один из предложенных вариантов для опыта работы.";
pub const ASK_CITY: &str = "Укажи город, в котором ты ищешь работу.";
pub const ASK_SCHEDULE: &str = "Выбери график работы:";
pub const BAD_SCHEDULE: &str =
    "Пожалуйста, выбери один из предложенных вариантов для графика работы.";
pub const FOUND_HEADER: &str = "Вот несколько найденных вакансий:";
pub const MORE_HINT: &str = "Используйте команду /more_jobs, чтобы увидеть больше вакансий.";
pub const NONE_FOUND: &str = "К сожалению, вакансий по заданным критериям не найдено.";
pub const NO_MORE: &str = "Больше вакансий не найдено.";
pub const SEARCH_FIRST: &str =
    "Сначала выполните поиск с помощью команды /job_selection.";

/// Bot commands understood by the dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    JobSelection,
    MoreJobs,
    Unknown(String),
}

/// One incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
}

impl Input {
    /// Classifies a message text. `/cmd@botname` is treated as `/cmd`.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Input::Text(text.to_string());
        };
        let word = rest.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or("");
        let command = match name {
            "start" => Command::Start,
            "job_selection" => Command::JobSelection,
            "more_jobs" => Command::MoreJobs,
            other => Command::Unknown(other.to_string()),
        };
        Input::Command(command)
    }
}

/// Reply keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// One-time quick-choice buttons, row by row.
    Choices(Vec<Vec<String>>),
    /// Hide any keyboard left from a previous question.
    Remove,
}

/// An outgoing message for the chat that sent the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Question asked on entering `state`, or repeated after a rejected answer.
fn prompt(state: State, retry: bool) -> Reply {
    match (state, retry) {
        (State::AwaitingTitle, _) => Reply::text(ASK_TITLE),
        (State::AwaitingSalary, false) => Reply::text(ASK_SALARY),
        (State::AwaitingSalary, true) => Reply::text(BAD_SALARY),
        (State::AwaitingExperience, retry) => {
            Reply::text(if retry { BAD_EXPERIENCE } else { ASK_EXPERIENCE })
                .with_keyboard(Keyboard::Choices(Experience::keyboard()))
        }
        (State::AwaitingCity, _) => Reply::text(ASK_CITY),
        (State::AwaitingSchedule, retry) => {
            Reply::text(if retry { BAD_SCHEDULE } else { ASK_SCHEDULE })
                .with_keyboard(Keyboard::Choices(Schedule::keyboard()))
        }
        (State::Idle | State::Completed, _) => Reply::text(GREETING),
    }
}

/// Fetches one page, degrading every failure to an empty page.
async fn fetch_or_empty<S: VacancySource>(
    fetcher: &VacancyFetcher<S>,
    criteria: &Criteria,
    page: u32,
) -> Vec<String> {
    match fetcher.fetch_page(criteria, page).await {
        Ok(lines) => lines,
        Err(e) => {
            error!(page, error = %e, "vacancy fetch failed");
            Vec::new()
        }
    }
}

fn page_text(lines: &[String]) -> String {
    format!("{}\n\n{MORE_HINT}", lines.join("\n\n"))
}

async fn complete_search<S: VacancySource>(
    fetcher: &VacancyFetcher<S>,
    session: &mut Session,
    criteria: &Criteria,
) -> Reply {
    let lines = fetch_or_empty(fetcher, criteria, 0).await;
    session.page = 0;
    session.vacancies = lines;

    let text = if session.vacancies.is_empty() {
        NONE_FOUND.to_string()
    } else {
        let shown = session.vacancies.len().min(fetcher.page_size() as usize);
        let first = &session.vacancies[..shown];
        format!("{FOUND_HEADER}\n\n{}", page_text(first))
    };
    Reply::text(text).with_keyboard(Keyboard::Remove)
}

async fn more_jobs<S: VacancySource>(
    fetcher: &VacancyFetcher<S>,
    session: &mut Session,
) -> Reply {
    let Some(criteria) = session.criteria.clone().filter(|_| session.state == State::Completed)
    else {
        return Reply::text(SEARCH_FIRST);
    };

    session.page += 1;
    let lines = fetch_or_empty(fetcher, &criteria, session.page).await;
    if lines.is_empty() {
        return Reply::text(NO_MORE);
    }

    let text = page_text(&lines);
    session.vacancies.extend(lines);
    Reply::text(text)
}

/// The interactive search dialogue for every chat the bot talks to.
pub struct Conversation<S> {
    fetcher: VacancyFetcher<S>,
    sessions: SessionStore,
}

impl<S: VacancySource> Conversation<S> {
    pub fn new(fetcher: VacancyFetcher<S>) -> Self {
        Self {
            fetcher,
            sessions: SessionStore::new(),
        }
    }

    /// Current dialogue state of a chat; chats never seen are idle.
    pub fn state(&self, chat_id: i64) -> State {
        self.sessions
            .get(chat_id)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Handles one message from `chat_id` and returns the reply to send.
    pub async fn handle(&mut self, chat_id: i64, text: &str) -> Reply {
        match Input::parse(text) {
            Input::Command(Command::Start) => {
                self.sessions.reset(chat_id);
                Reply::text(GREETING)
            }
            Input::Command(Command::JobSelection) => {
                let session = self.sessions.get_or_create(chat_id);
                StateMachine::begin(session);
                info!(chat_id, "search dialogue started");
                prompt(State::AwaitingTitle, false)
            }
            Input::Command(Command::MoreJobs) => match self.sessions.get_mut(chat_id) {
                Some(session) => more_jobs(&self.fetcher, session).await,
                None => Reply::text(SEARCH_FIRST),
            },
            Input::Command(Command::Unknown(name)) => {
                info!(chat_id, command = %name, "unknown command");
                Reply::text(GREETING)
            }
            Input::Text(text) => {
                // Only /job_selection opens a session.
                let Some(session) = self.sessions.get_mut(chat_id) else {
                    return Reply::text(GREETING);
                };
                match StateMachine::next(session, &text) {
                    Transition::Next(state) => prompt(state, false),
                    Transition::Retry(state) => prompt(state, true),
                    Transition::Complete(criteria) => {
                        info!(
                            chat_id,
                            title = %criteria.title,
                            salary = criteria.salary,
                            experience = %criteria.experience,
                            city = %criteria.city,
                            schedule = %criteria.schedule,
                            "criteria collected"
                        );
                        complete_search(&self.fetcher, session, &criteria).await
                    }
                    Transition::Ignored => Reply::text(GREETING),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::PAGE_SIZE;
    use crate::fetcher::tests::{MockSource, item};

    const CHAT: i64 = 42;

    fn conversation(source: MockSource) -> Conversation<MockSource> {
        Conversation::new(VacancyFetcher::new(source, PAGE_SIZE))
    }

    async fn run_dialogue(conv: &mut Conversation<MockSource>) -> Reply {
        conv.handle(CHAT, "/job_selection").await;
        conv.handle(CHAT, "Python developer").await;
        conv.handle(CHAT, "50000").await;
        conv.handle(CHAT, "Нет опыта").await;
        conv.handle(CHAT, "Москва").await;
        conv.handle(CHAT, "Удаленная работа").await
    }

    fn five_items(prefix: &str) -> Vec<crate::hh::VacancyItem> {
        (1..=5)
            .map(|i| item(&format!("{prefix}{i}"), &format!("{prefix} vacancy {i}")))
            .collect()
    }

    #[test]
    fn parse_commands_and_text() {
        assert_eq!(Input::parse("/start"), Input::Command(Command::Start));
        assert_eq!(
            Input::parse("/job_selection@hh_vacancy_bot"),
            Input::Command(Command::JobSelection)
        );
        assert_eq!(Input::parse(" /more_jobs "), Input::Command(Command::MoreJobs));
        assert_eq!(
            Input::parse("/help"),
            Input::Command(Command::Unknown("help".into()))
        );
        assert_eq!(Input::parse("Москва"), Input::Text("Москва".into()));
    }

    #[tokio::test]
    async fn prompts_follow_the_dialogue() {
        let mut conv = conversation(MockSource::new(Some("1")));

        let r = conv.handle(CHAT, "/job_selection").await;
        assert_eq!(r, Reply::text(ASK_TITLE));

        let r = conv.handle(CHAT, "Python developer").await;
        assert_eq!(r.text, ASK_SALARY);

        let r = conv.handle(CHAT, "abc").await;
        assert_eq!(r.text, BAD_SALARY);
        assert_eq!(conv.state(CHAT), State::AwaitingSalary);

        let r = conv.handle(CHAT, "50000").await;
        assert_eq!(r.text, ASK_EXPERIENCE);
        assert_eq!(r.keyboard, Some(Keyboard::Choices(Experience::keyboard())));

        let r = conv.handle(CHAT, "Нет опыта").await;
        assert_eq!(r.text, ASK_CITY);

        let r = conv.handle(CHAT, "Москва").await;
        assert_eq!(r.text, ASK_SCHEDULE);
        assert_eq!(r.keyboard, Some(Keyboard::Choices(Schedule::keyboard())));

        let r = conv.handle(CHAT, "По ночам").await;
        assert_eq!(r.text, BAD_SCHEDULE);
        assert_eq!(conv.state(CHAT), State::AwaitingSchedule);
    }

    #[tokio::test]
    async fn zero_results_end_with_none_found() {
        let mut conv = conversation(MockSource::new(Some("1")).with_page(vec![]));
        let reply = run_dialogue(&mut conv).await;

        assert_eq!(reply.text, NONE_FOUND);
        assert_eq!(reply.keyboard, Some(Keyboard::Remove));
        assert_eq!(conv.state(CHAT), State::Completed);
    }

    #[tokio::test]
    async fn unresolved_city_reads_as_none_found() {
        let mut conv = conversation(MockSource::new(None));
        let reply = run_dialogue(&mut conv).await;
        assert_eq!(reply.text, NONE_FOUND);
        assert_eq!(conv.state(CHAT), State::Completed);
    }

    #[tokio::test]
    async fn upstream_error_reads_as_none_found() {
        let mut conv = conversation(MockSource::new(Some("1")).with_error(500));
        let reply = run_dialogue(&mut conv).await;
        assert_eq!(reply.text, NONE_FOUND);
    }

    #[tokio::test]
    async fn first_page_is_listed_with_more_hint() {
        let mut conv = conversation(MockSource::new(Some("1")).with_page(five_items("a")));
        let reply = run_dialogue(&mut conv).await;

        assert!(reply.text.starts_with(&format!("{FOUND_HEADER}\n\n1. [a vacancy 1 в")));
        assert!(reply.text.ends_with(&format!("\n\n{MORE_HINT}")));
        assert!(reply.text.contains("\n\n5. [a vacancy 5 в"));
        assert_eq!(conv.session(CHAT).unwrap().vacancies.len(), 5);
        assert_eq!(conv.session(CHAT).unwrap().page, 0);
    }

    #[tokio::test]
    async fn more_jobs_appends_next_page() {
        let source = MockSource::new(Some("1"))
            .with_page(five_items("a"))
            .with_page(vec![item("b1", "b vacancy 1")]);
        let mut conv = conversation(source);
        run_dialogue(&mut conv).await;

        let reply = conv.handle(CHAT, "/more_jobs").await;
        assert!(reply.text.starts_with("1. [b vacancy 1 в"));
        assert!(reply.text.ends_with(MORE_HINT));

        let session = conv.session(CHAT).unwrap();
        assert_eq!(session.vacancies.len(), 6);
        assert_eq!(session.page, 1);
        assert_eq!(session.state, State::Completed);
        assert_eq!(*conv.fetcher_source().requested_pages.borrow(), vec![0, 1]);
        assert_eq!(*conv.fetcher_source().requested_per_page.borrow(), vec![5, 5]);
    }

    #[tokio::test]
    async fn first_reply_lists_at_most_five() {
        let items = (1..=7).map(|i| item(&i.to_string(), "X")).collect();
        let mut conv = conversation(MockSource::new(Some("1")).with_page(items));
        let reply = run_dialogue(&mut conv).await;

        assert!(reply.text.contains("\n\n5. [X в"));
        assert!(!reply.text.contains("6. [X в"));
        assert_eq!(*conv.fetcher_source().requested_per_page.borrow(), vec![5]);
    }

    #[tokio::test]
    async fn more_jobs_on_empty_page_keeps_list() {
        let source = MockSource::new(Some("1")).with_page(five_items("a"));
        let mut conv = conversation(source);
        run_dialogue(&mut conv).await;
        let before = conv.session(CHAT).unwrap().vacancies.clone();

        let reply = conv.handle(CHAT, "/more_jobs").await;
        assert_eq!(reply, Reply::text(NO_MORE));

        let session = conv.session(CHAT).unwrap();
        assert_eq!(session.vacancies, before);
        assert_eq!(session.state, State::Completed);

        // Still available afterwards.
        let reply = conv.handle(CHAT, "/more_jobs").await;
        assert_eq!(reply.text, NO_MORE);
        assert_eq!(conv.session(CHAT).unwrap().page, 2);
    }

    #[tokio::test]
    async fn more_jobs_before_search_asks_to_search_first() {
        let mut conv = conversation(MockSource::new(Some("1")));
        assert_eq!(conv.handle(CHAT, "/more_jobs").await.text, SEARCH_FIRST);

        conv.handle(CHAT, "/job_selection").await;
        conv.handle(CHAT, "Python developer").await;
        assert_eq!(conv.handle(CHAT, "/more_jobs").await.text, SEARCH_FIRST);
        assert_eq!(conv.state(CHAT), State::AwaitingSalary);
        assert!(conv.fetcher_source().requested_pages.borrow().is_empty());
    }

    #[tokio::test]
    async fn start_resets_from_any_state() {
        let mut conv = conversation(MockSource::new(Some("1")));
        conv.handle(CHAT, "/job_selection").await;
        conv.handle(CHAT, "Python developer").await;
        conv.handle(CHAT, "50000").await;
        assert_eq!(conv.state(CHAT), State::AwaitingExperience);

        let reply = conv.handle(CHAT, "/start").await;
        assert_eq!(reply.text, GREETING);
        assert_eq!(conv.state(CHAT), State::Idle);
        assert!(conv.session(CHAT).is_none());

        // Free text while idle only repeats the greeting.
        assert_eq!(conv.handle(CHAT, "Нет опыта").await.text, GREETING);
        assert_eq!(conv.state(CHAT), State::Idle);
        assert!(conv.session(CHAT).is_none());
    }

    #[tokio::test]
    async fn messages_without_search_open_no_session() {
        let mut conv = conversation(MockSource::new(Some("1")));
        for chat in 0..100 {
            assert_eq!(conv.handle(chat, "hello").await.text, GREETING);
            assert_eq!(conv.handle(1000 + chat, "/more_jobs").await.text, SEARCH_FIRST);
            assert_eq!(conv.handle(2000 + chat, "/help").await.text, GREETING);
        }
        assert_eq!(conv.active_sessions(), 0);
        assert!(conv.fetcher_source().requested_pages.borrow().is_empty());

        conv.handle(CHAT, "/job_selection").await;
        assert_eq!(conv.active_sessions(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let mut conv = conversation(MockSource::new(Some("1")));
        conv.handle(1, "/job_selection").await;
        conv.handle(2, "/job_selection").await;
        conv.handle(1, "Rust").await;

        assert_eq!(conv.state(1), State::AwaitingSalary);
        assert_eq!(conv.state(2), State::AwaitingTitle);
        assert_eq!(conv.active_sessions(), 2);
    }

    impl<S> Conversation<S> {
        fn fetcher_source(&self) -> &S {
            self.fetcher.source()
        }

        fn session(&self, chat_id: i64) -> Option<&Session> {
            self.sessions.get(chat_id)
        }
    }
}
