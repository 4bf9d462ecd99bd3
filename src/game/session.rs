//! Session state machine
//!
//! A [`Session`] owns one [`SessionState`] and is the only thing allowed to
//! change it. Every transition either applies completely or returns an
//! [`AdventureError`] with the state untouched.

use super::catalog::{Catalog, MISSION_POINTS};
use super::report::{Report, ReportSink};
use super::{Action, AnswerOutcome, Outcome, Screen};
use crate::data::{AnswerRecord, Id, MissionDefinition, Rank, Summary, User};
use crate::AdventureError;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

type Transition<T> = std::result::Result<T, AdventureError>;

/// Everything that changes while a player works through the adventure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    screen: Screen,
    user: Option<User>,
    completed: HashSet<String>,
    score: u32,
    current_mission: Option<String>,
    answers: Vec<AnswerRecord>,
}

impl SessionState {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_mission(&self) -> Option<&str> {
        self.current_mission.as_deref()
    }

    /// Answers in the order they were given
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn is_completed(&self, key: &str) -> bool {
        self.completed.contains(key)
    }
}

/// One player's playthrough
pub struct Session {
    id: Id,
    catalog: Arc<Catalog>,
    sink: Option<Arc<dyn ReportSink>>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            id: Id::new(),
            catalog,
            sink: None,
            state: SessionState::default(),
        }
    }

    /// Notify `sink` whenever this session reaches the ending
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn completed(&self) -> &HashSet<String> {
        self.state.completed()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn current_mission(&self) -> Option<&str> {
        self.state.current_mission()
    }

    /// The mission being answered, if any
    pub fn active_mission(&self) -> Option<&MissionDefinition> {
        self.state
            .current_mission
            .as_deref()
            .and_then(|key| self.catalog.get(key).ok())
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        self.state.answers()
    }

    /// Forward an action to the matching transition
    pub fn apply(&mut self, action: Action) -> Transition<Outcome> {
        match action {
            Action::Register { name, department } => {
                self.register(&name, &department)?;
                Ok(Outcome::Registered)
            }
            Action::EnterMission(key) => {
                self.enter_mission(&key)?;
                Ok(Outcome::MissionEntered(key))
            }
            Action::Answer(index) => self.answer(index).map(Outcome::Answered),
            Action::Finish => self.finish().map(Outcome::Finished),
            Action::Reset => {
                self.reset()?;
                Ok(Outcome::Reset)
            }
        }
    }

    /// Intro → Map
    pub fn register(&mut self, name: &str, department: &str) -> Transition<()> {
        self.require_screen(Screen::Intro, "register")?;

        if name.trim().is_empty() {
            return Err(self.reject(AdventureError::Validation(
                "name must not be empty".to_string(),
            )));
        }
        if !self.catalog.contains_department(department) {
            return Err(self.reject(AdventureError::Validation(format!(
                "unknown department: {department}"
            ))));
        }

        self.state.user = Some(User::new(name, department));
        self.state.screen = Screen::Map;
        tracing::info!(session = %self.id, department, "player registered");
        Ok(())
    }

    /// Map → Mission
    pub fn enter_mission(&mut self, key: &str) -> Transition<()> {
        self.require_screen(Screen::Map, "enter a mission")?;

        if let Err(err) = self.catalog.get(key) {
            return Err(self.reject(err));
        }
        if self.state.is_completed(key) {
            return Err(self.reject(AdventureError::InvalidTransition(format!(
                "mission {key} is already completed"
            ))));
        }

        self.state.current_mission = Some(key.to_string());
        self.state.screen = Screen::Mission;
        tracing::info!(session = %self.id, mission = key, "mission entered");
        Ok(())
    }

    /// Mission → Map; a single attempt that completes the mission either way
    pub fn answer(&mut self, index: usize) -> Transition<AnswerOutcome> {
        self.require_screen(Screen::Mission, "answer")?;

        let Some(key) = self.state.current_mission.clone() else {
            return Err(self.reject(AdventureError::InvalidTransition(
                "no mission in progress".to_string(),
            )));
        };
        let catalog = Arc::clone(&self.catalog);
        let mission = match catalog.get(&key) {
            Ok(mission) => mission,
            Err(err) => return Err(self.reject(err)),
        };
        let Some(chosen_option) = mission.option(index) else {
            return Err(self.reject(AdventureError::OutOfRangeAnswer {
                index,
                options: mission.options.len(),
            }));
        };

        let correct = mission.is_correct(index);
        let points = if correct { MISSION_POINTS } else { 0 };

        self.state.score = self.state.score.saturating_add(points);
        self.state.completed.insert(key.clone());
        self.state.answers.push(AnswerRecord {
            mission: key.clone(),
            chosen: index,
            correct,
        });
        self.state.current_mission = None;
        self.state.screen = Screen::Map;

        tracing::info!(
            session = %self.id,
            mission = %key,
            correct,
            score = self.state.score,
            "mission answered"
        );

        Ok(AnswerOutcome {
            mission: key,
            title: mission.title.clone(),
            correct,
            points,
            chosen_option: chosen_option.to_string(),
            correct_option: mission.correct_option().to_string(),
            feedback: mission.feedback.clone(),
        })
    }

    /// Map → Ending once every mission is completed
    pub fn finish(&mut self) -> Transition<Summary> {
        self.require_screen(Screen::Map, "finish")?;

        if !self.catalog.is_complete(&self.state.completed) {
            let remaining = self.remaining_missions();
            return Err(self.reject(AdventureError::InvalidTransition(format!(
                "{remaining} mission(s) still open"
            ))));
        }

        self.state.screen = Screen::Ending;
        tracing::info!(session = %self.id, score = self.state.score, "adventure finished");
        self.notify_sink();
        Ok(self.summary())
    }

    /// Ending → Intro with a fresh state
    pub fn reset(&mut self) -> Transition<()> {
        self.require_screen(Screen::Ending, "reset")?;
        self.state = SessionState::default();
        tracing::info!(session = %self.id, "session reset");
        Ok(())
    }

    pub fn remaining_missions(&self) -> usize {
        self.catalog
            .all()
            .iter()
            .filter(|m| !self.state.is_completed(&m.key))
            .count()
    }

    pub fn summary(&self) -> Summary {
        let correct = self.state.answers.iter().filter(|a| a.correct).count();
        let total = self.catalog.len();
        Summary {
            user: self.state.user.clone(),
            score: self.state.score,
            max_score: self.catalog.max_score(),
            correct,
            total,
            rank: Rank::from_answers(correct, total),
        }
    }

    fn notify_sink(&self) {
        let (Some(sink), Some(user)) = (&self.sink, &self.state.user) else {
            return;
        };
        let report = Report {
            session: self.id,
            user: user.clone(),
            score: self.state.score,
            max_score: self.catalog.max_score(),
            finished_at: Utc::now(),
        };
        if let Err(err) = sink.notify(&report) {
            tracing::warn!(session = %self.id, error = %err, "report sink failed");
        }
    }

    fn require_screen(&self, expected: Screen, action: &str) -> Transition<()> {
        if self.state.screen == expected {
            return Ok(());
        }
        Err(self.reject(AdventureError::InvalidTransition(format!(
            "cannot {action} on the {} screen",
            self.state.screen
        ))))
    }

    fn reject(&self, err: AdventureError) -> AdventureError {
        tracing::debug!(
            session = %self.id,
            screen = %self.state.screen,
            error = %err,
            "action rejected"
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn session() -> Session {
        Session::new(Arc::new(Catalog::builtin().unwrap()))
    }

    fn registered() -> Session {
        let mut session = session();
        session.register("Alex", "Purchasing").unwrap();
        session
    }

    fn complete_all(session: &mut Session, answers: &[usize]) {
        let keys: Vec<String> =
            session.catalog().all().iter().map(|m| m.key.clone()).collect();
        for (key, answer) in keys.iter().zip(answers) {
            session.enter_mission(key).unwrap();
            session.answer(*answer).unwrap();
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<Report>>,
    }

    impl ReportSink for RecordingSink {
        fn notify(&self, report: &Report) -> crate::Result<()> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn notify(&self, _report: &Report) -> crate::Result<()> {
            anyhow::bail!("reporting endpoint unreachable")
        }
    }

    #[test]
    fn new_session_starts_on_intro() {
        let session = session();
        assert_eq!(session.screen(), Screen::Intro);
        assert!(session.user().is_none());
        assert!(session.completed().is_empty());
        assert_eq!(session.score(), 0);
        assert!(session.current_mission().is_none());
    }

    #[test]
    fn register_sets_user_and_moves_to_map() {
        let mut session = session();
        session.register("Alex Doe", "Finance").unwrap();
        assert_eq!(session.screen(), Screen::Map);
        assert_eq!(session.user(), Some(&User::new("Alex Doe", "Finance")));
    }

    #[test]
    fn register_rejects_blank_name() {
        let mut session = session();
        let err = session.register("   ", "Finance").unwrap_err();
        assert!(matches!(err, AdventureError::Validation(_)));
        assert_eq!(session.state(), &SessionState::default());
    }

    #[test]
    fn register_rejects_unknown_department() {
        let mut session = session();
        let err = session.register("Alex", "Marketing Wizardry").unwrap_err();
        assert!(matches!(err, AdventureError::Validation(_)));
        assert_eq!(session.screen(), Screen::Intro);
    }

    #[test]
    fn register_twice_is_invalid() {
        let mut session = registered();
        let err = session.register("Sam", "IT").unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
        assert_eq!(session.user().unwrap().name, "Alex");
    }

    #[test]
    fn enter_unknown_mission_fails() {
        let mut session = registered();
        let before = session.state().clone();
        let err = session.enter_mission("bribery").unwrap_err();
        assert_eq!(err, AdventureError::UnknownMission("bribery".to_string()));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn enter_completed_mission_fails() {
        let mut session = registered();
        session.enter_mission("security").unwrap();
        session.answer(0).unwrap();

        let before = session.state().clone();
        let err = session.enter_mission("security").unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn enter_mission_before_registering_fails() {
        let mut session = session();
        let err = session.enter_mission("security").unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
    }

    #[test]
    fn correct_answer_scores_one_hundred() {
        let mut session = registered();
        session.enter_mission("subcontracting").unwrap();
        assert_eq!(session.current_mission(), Some("subcontracting"));

        let outcome = session.answer(1).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.points, 100);
        assert_eq!(session.score(), 100);
        assert!(session.completed().contains("subcontracting"));
        assert_eq!(session.screen(), Screen::Map);
        assert!(session.current_mission().is_none());
    }

    #[test]
    fn wrong_answer_still_completes_mission() {
        let mut session = registered();
        session.enter_mission("fairtrade").unwrap();

        let outcome = session.answer(2).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.points, 0);
        assert!(!outcome.feedback.is_empty());
        assert_eq!(session.score(), 0);
        assert!(session.completed().contains("fairtrade"));
        assert_eq!(session.screen(), Screen::Map);
    }

    #[test]
    fn out_of_range_answer_leaves_state_untouched() {
        let mut session = registered();
        session.enter_mission("security").unwrap();
        let before = session.state().clone();

        let err = session.answer(3).unwrap_err();
        assert_eq!(err, AdventureError::OutOfRangeAnswer { index: 3, options: 3 });
        assert_eq!(session.state(), &before);
        assert_eq!(session.screen(), Screen::Mission);
    }

    #[test]
    fn answer_on_map_is_invalid() {
        let mut session = registered();
        let err = session.answer(0).unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
    }

    #[test]
    fn finish_requires_every_mission() {
        let mut session = registered();
        session.enter_mission("subcontracting").unwrap();
        session.answer(1).unwrap();

        let err = session.finish().unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
        assert_eq!(session.screen(), Screen::Map);
        assert_eq!(session.remaining_missions(), 2);
    }

    #[test]
    fn finish_after_all_missions_reaches_ending() {
        let mut session = registered();
        complete_all(&mut session, &[1, 0, 1]);

        let summary = session.finish().unwrap();
        assert_eq!(session.screen(), Screen::Ending);
        assert_eq!(summary.score, 200);
        assert_eq!(summary.max_score, 300);
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.rank, Rank::Practitioner);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut session = registered();
        complete_all(&mut session, &[1, 1, 1]);
        session.finish().unwrap();
        let id = session.id();

        session.reset().unwrap();
        assert_eq!(session.state(), &SessionState::default());
        assert_eq!(session.id(), id);
    }

    #[test]
    fn reset_outside_ending_is_invalid() {
        let mut session = registered();
        let err = session.reset().unwrap_err();
        assert!(matches!(err, AdventureError::InvalidTransition(_)));
        assert_eq!(session.screen(), Screen::Map);
    }

    #[test]
    fn sink_receives_final_report() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = session().with_sink(sink.clone());
        session.register("Alex", "Sales").unwrap();
        complete_all(&mut session, &[1, 1, 1]);
        session.finish().unwrap();

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].score, 300);
        assert_eq!(reports[0].user, User::new("Alex", "Sales"));
        assert_eq!(reports[0].session, session.id());
    }

    #[test]
    fn failing_sink_does_not_block_ending() {
        let mut session = session().with_sink(Arc::new(FailingSink));
        session.register("Alex", "Sales").unwrap();
        complete_all(&mut session, &[0, 0, 0]);

        let summary = session.finish().unwrap();
        assert_eq!(session.screen(), Screen::Ending);
        assert_eq!(summary.rank, Rank::Apprentice);
    }

    #[test]
    fn apply_dispatches_actions() {
        let mut session = session();
        let outcome = session
            .apply(Action::Register {
                name: "Alex".to_string(),
                department: "IT".to_string(),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Registered);

        let outcome = session.apply(Action::EnterMission("security".to_string())).unwrap();
        assert_eq!(outcome, Outcome::MissionEntered("security".to_string()));

        match session.apply(Action::Answer(1)).unwrap() {
            Outcome::Answered(answer) => assert!(answer.correct),
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert!(session.apply(Action::Finish).is_err());
    }
}
