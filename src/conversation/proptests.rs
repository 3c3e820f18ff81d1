//! Property-based tests for the conversation engine
//!
//! These tests drive whole conversations with generated input.

use std::future::Future;
use std::sync::Arc;

use proptest::prelude::*;
use regex::Regex;

use super::table;
use super::*;
use crate::config::{BotConfig, TimeWindow};
use crate::repo::InMemoryUserRepository;
use crate::store::GroupStore;

// ============================================================================
// Test Helpers
// ============================================================================

const USER: UserId = UserId(424_242_424);

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn conversation() -> Conversation {
    let config = BotConfig::default();
    Conversation::new(
        GroupStore::new(config.groups),
        config.time_window,
        Arc::new(InMemoryUserRepository::new()),
    )
}

fn press(token: &str) -> Event {
    Event::Select(Action::parse(token).unwrap())
}

async fn drive(conv: &Conversation, tokens: &[&str]) {
    conv.handle(USER, Event::Command(BotCommand::Start))
        .await
        .unwrap();
    for token in tokens {
        conv.handle(USER, press(token)).await.unwrap();
    }
}

const LIMIT_PATH: [&str; 4] = ["configure_groups", "group:Group1", "set_limits", "set_eth_limit"];
const TIME_PATH: [&str; 2] = ["configure_timings", "set_time_slot"];

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_valid_limit() -> impl Strategy<Value = String> {
    "[0-9]{1,7}(\\.[0-9]{1,6})?"
}

fn arb_invalid_limit() -> impl Strategy<Value = String> {
    let well_formed = Regex::new(r"^\s*[0-9]+(\.[0-9]+)?\s*$").unwrap();
    prop_oneof![
        "-[0-9]{1,5}(\\.[0-9]{1,3})?",
        "[0-9]{1,3}[eE][0-9]{1,2}",
        "\\PC{0,12}",
    ]
    .prop_filter("must not be a plain decimal", move |s| !well_formed.is_match(s))
}

fn arb_time_slot() -> impl Strategy<Value = String> {
    "[0-9]{2}:[0-9]{2} - [0-9]{2}:[0-9]{2}"
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::ConfigureGroups),
        Just(Action::ConfigureTimings),
        Just(Action::ShowStatus),
        Just(Action::Exit),
        Just(Action::BackToMain),
        prop_oneof![Just("Group1"), Just("Group2"), Just("Ghost")]
            .prop_map(|id| Action::PickGroup(GroupId::new(id))),
        Just(Action::ShowLimits),
        Just(Action::ShowBlacklist),
        Just(Action::BackToGroups),
        Just(Action::SetTimeSlot),
        Just(Action::SetLimit(LimitKind::Eth)),
        Just(Action::SetLimit(LimitKind::Sol)),
        Just(Action::BackToGroupOptions),
        Just(Action::EditBlacklist(BlacklistOp::Add)),
        Just(Action::EditBlacklist(BlacklistOp::Remove)),
        Just(Action::BackToBlacklist),
        Just(Action::CancelLimit),
        Just(Action::CancelBlacklist),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_valid_limit(),
        arb_time_slot(),
        "@?[a-z]{1,10}",
        "\\PC{0,16}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => prop_oneof![Just(BotCommand::Start), Just(BotCommand::Configure)]
            .prop_map(Event::Command),
        6 => arb_action().prop_map(Event::Select),
        3 => arb_text().prop_map(Event::Text),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_valid_limit_round_trips(input in arb_valid_limit()) {
        let expected: f64 = input.parse().unwrap();

        let (stored, outcome, listing) = block_on(async {
            let conv = conversation();
            drive(&conv, &LIMIT_PATH).await;
            let outcome = conv.handle(USER, Event::Text(input.clone())).await.unwrap();
            let listing = conv.handle(USER, press("set_limits")).await.unwrap();
            let stored = conv.groups().snapshot(&GroupId::new("Group1")).await.unwrap();
            (stored, outcome, listing)
        });

        prop_assert_eq!(outcome.state, State::LimitsMenu);
        prop_assert!((stored.eth_limit - expected).abs() <= f64::EPSILON * expected.max(1.0));
        let shown = format!("ETH Limit (for base chain): {}", stored.eth_limit);
        prop_assert!(listing.render.text.contains(&shown), "missing {:?}", shown);
    }

    #[test]
    fn prop_invalid_limit_changes_nothing(input in arb_invalid_limit()) {
        let (stored, outcome, state) = block_on(async {
            let conv = conversation();
            drive(&conv, &LIMIT_PATH).await;
            let outcome = conv.handle(USER, Event::Text(input.clone())).await.unwrap();
            let stored = conv.groups().snapshot(&GroupId::new("Group1")).await.unwrap();
            let state = conv.sessions().state_of(USER).await;
            (stored, outcome, state)
        });

        prop_assert_eq!(outcome.state, State::AwaitingLimitInput);
        prop_assert_eq!(outcome.render.mode, RenderMode::New);
        prop_assert_eq!(state, Some(State::AwaitingLimitInput));
        prop_assert!((stored.eth_limit - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn prop_time_slot_stored_verbatim(slot in arb_time_slot()) {
        let (window, outcome) = block_on(async {
            let conv = conversation();
            drive(&conv, &TIME_PATH).await;
            let outcome = conv.handle(USER, Event::Text(slot.clone())).await.unwrap();
            (conv.time_window().await, outcome)
        });

        prop_assert_eq!(outcome.state, State::MainMenu);
        prop_assert_eq!(window.as_str(), slot.as_str());
        prop_assert_eq!(window, TimeWindow::parse(&slot).unwrap());
    }

    #[test]
    fn prop_event_sequences_stay_consistent(
        events in proptest::collection::vec(arb_event(), 0..40)
    ) {
        block_on(async {
            let conv = conversation();

            for event in events {
                let before = conv.sessions().state_of(USER).await.unwrap_or(State::Terminated);
                let is_command = matches!(event, Event::Command(_));
                let outcome = conv.handle(USER, event).await;
                let after = conv.sessions().state_of(USER).await.unwrap_or(State::Terminated);

                let Some(outcome) = outcome else {
                    prop_assert_eq!(before, after, "unmatched event moved the session");
                    continue;
                };

                prop_assert_eq!(outcome.state, after);

                if before == State::Terminated && !is_command {
                    prop_assert_eq!(outcome.state, State::Terminated);
                    prop_assert!(outcome.render.text.starts_with("You said: "));
                    prop_assert_eq!(outcome.render.buttons().count(), 0);
                }

                for button in outcome.render.buttons() {
                    let action = Action::parse(&button.token);
                    prop_assert!(action.is_some(), "unparsable token {:?}", button.token);
                    let event = Event::Select(action.unwrap());
                    prop_assert!(
                        table::find(outcome.state, &event).is_some(),
                        "button {:?} has no row in {:?}",
                        button.token,
                        outcome.state
                    );
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
