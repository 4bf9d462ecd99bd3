//! End-to-end playthroughs of the session state machine.

use compliance_adventure::game::{Action, Catalog, Outcome, Screen, Session, SessionState};
use compliance_adventure::{AdventureError, MissionDefinition, Rank, User};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn builtin() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().expect("built-in catalog is valid"))
}

fn registered_session() -> Session {
    let mut session = Session::new(builtin());
    session.register("Robin", "Logistics").unwrap();
    session
}

#[test]
fn mixed_answers_end_with_two_hundred_points() {
    let mut session = registered_session();

    session.enter_mission("subcontracting").unwrap();
    assert!(session.answer(1).unwrap().correct);
    assert_eq!(session.score(), 100);

    session.enter_mission("security").unwrap();
    assert!(!session.answer(0).unwrap().correct);
    assert_eq!(session.score(), 100);

    session.enter_mission("fairtrade").unwrap();
    assert!(session.answer(1).unwrap().correct);
    assert_eq!(session.score(), 200);

    let expected: HashSet<String> = ["subcontracting", "security", "fairtrade"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(session.completed(), &expected);

    let summary = session.finish().unwrap();
    assert_eq!(session.screen(), Screen::Ending);
    assert_eq!(summary.score, 200);
    assert_eq!(summary.user, Some(User::new("Robin", "Logistics")));
}

#[test]
fn all_correct_in_catalog_order_scores_three_hundred() {
    let mut session = registered_session();
    let keys: Vec<String> = session.catalog().all().iter().map(|m| m.key.clone()).collect();
    for key in &keys {
        session.enter_mission(key).unwrap();
        let correct = session.catalog().get(key).unwrap().correct_index;
        session.answer(correct).unwrap();
    }

    let summary = session.finish().unwrap();
    assert_eq!(summary.score, 300);
    assert_eq!(summary.rank, Rank::Champion);
    assert_eq!(session.completed().len(), 3);
    assert!(keys.iter().all(|k| session.completed().contains(k)));
}

#[test]
fn missions_can_be_played_in_any_order() {
    let mut session = registered_session();
    for key in ["fairtrade", "subcontracting", "security"] {
        session.enter_mission(key).unwrap();
        session.answer(1).unwrap();
    }
    assert!(session.finish().is_ok());
    let order: Vec<&str> = session.answers().iter().map(|a| a.mission.as_str()).collect();
    assert_eq!(order, ["fairtrade", "subcontracting", "security"]);
}

#[test]
fn every_action_is_rejected_outside_its_screen() {
    let catalog = builtin();
    let actions = [
        Action::Register {
            name: "Robin".to_string(),
            department: "IT".to_string(),
        },
        Action::EnterMission("security".to_string()),
        Action::Answer(0),
        Action::Finish,
        Action::Reset,
    ];

    // A fresh session only accepts registration
    for action in &actions {
        let mut session = Session::new(Arc::clone(&catalog));
        let result = session.apply(action.clone());
        if action.screen() == Screen::Intro {
            assert_eq!(result, Ok(Outcome::Registered));
        } else {
            assert!(matches!(result, Err(AdventureError::InvalidTransition(_))));
            assert_eq!(session.state(), &SessionState::default());
        }
    }
}

#[test]
fn replay_after_reset_starts_from_scratch() {
    let mut session = registered_session();
    for key in ["subcontracting", "security", "fairtrade"] {
        session.enter_mission(key).unwrap();
        session.answer(0).unwrap();
    }
    session.finish().unwrap();
    session.reset().unwrap();

    assert_eq!(session.screen(), Screen::Intro);
    assert_eq!(session.state(), &SessionState::default());

    session.register("Kim", "Sales").unwrap();
    session.enter_mission("security").unwrap();
    session.answer(1).unwrap();
    assert_eq!(session.score(), 100);
}

#[test]
fn sessions_sharing_a_catalog_are_isolated() {
    let catalog = builtin();
    let mut first = Session::new(Arc::clone(&catalog));
    let second = Session::new(Arc::clone(&catalog));

    first.register("Robin", "IT").unwrap();
    first.enter_mission("security").unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(second.screen(), Screen::Intro);
    assert!(second.user().is_none());
}

fn two_mission_catalog() -> Arc<Catalog> {
    let mission = |key: &str, correct_index: usize| MissionDefinition {
        key: key.to_string(),
        title: key.to_uppercase(),
        prompt: "Choose".to_string(),
        options: vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
        correct_index,
        feedback: "Advice".to_string(),
    };
    Arc::new(
        Catalog::new(
            vec!["Ops".to_string()],
            vec![mission("alpha", 2), mission("beta", 3)],
        )
        .unwrap(),
    )
}

proptest! {
    #[test]
    fn score_counts_exactly_the_correct_answers(
        answers in proptest::collection::vec(0usize..4, 2)
    ) {
        let catalog = two_mission_catalog();
        let mut session = Session::new(Arc::clone(&catalog));
        session.register("Robin", "Ops").unwrap();

        let mut expected = 0;
        let mut previous = 0;
        for (mission, answer) in catalog.all().iter().zip(&answers) {
            session.enter_mission(&mission.key).unwrap();
            session.answer(*answer).unwrap();
            if *answer == mission.correct_index {
                expected += 100;
            }
            prop_assert!(session.score() >= previous);
            previous = session.score();
        }

        prop_assert_eq!(session.score(), expected);
        prop_assert_eq!(session.finish().unwrap().score, expected);
    }

    #[test]
    fn out_of_range_answers_never_change_state(index in 4usize..1000) {
        let mut session = Session::new(two_mission_catalog());
        session.register("Robin", "Ops").unwrap();
        session.enter_mission("alpha").unwrap();
        let before = session.state().clone();

        let err = session.answer(index).unwrap_err();
        prop_assert_eq!(err, AdventureError::OutOfRangeAnswer { index, options: 4 });
        prop_assert_eq!(session.state(), &before);
    }
}
