//! End-to-end conversations driven through the engine without a transport.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use group_config_bot::config::{BotConfig, GroupConfig, TimeWindow};
use group_config_bot::conversation::{
    Action, BotCommand, Conversation, Event, GroupId, Outcome, RenderMode, State, UserId, table,
};
use group_config_bot::repo::{InMemoryUserRepository, JsonFileUserRepository, UserRepository};
use group_config_bot::store::GroupStore;

fn conversation() -> Conversation {
    let config = BotConfig::default();
    Conversation::new(
        GroupStore::new(config.groups),
        config.time_window,
        Arc::new(InMemoryUserRepository::new()),
    )
}

fn start() -> Event {
    Event::Command(BotCommand::Start)
}

fn press(token: &str) -> Event {
    Event::Select(Action::parse(token).unwrap())
}

fn text(input: &str) -> Event {
    Event::Text(input.to_owned())
}

async fn drive(conv: &Conversation, user: UserId, events: Vec<Event>) -> Vec<Option<Outcome>> {
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        outcomes.push(conv.handle(user, event).await);
    }
    outcomes
}

async fn group(conv: &Conversation, id: &str) -> GroupConfig {
    conv.groups().snapshot(&GroupId::new(id)).await.unwrap()
}

#[tokio::test]
async fn limit_values_round_trip() {
    let conv = conversation();
    let user = UserId(1_000_001);

    for (input, expected) in [("0", 0.0), ("3", 3.0), ("0.05", 0.05), ("1500.75", 1500.75)] {
        let outcomes = drive(
            &conv,
            user,
            vec![
                start(),
                press("configure_groups"),
                press("group:Group1"),
                press("set_limits"),
                press("set_eth_limit"),
                text(input),
            ],
        )
        .await;

        let last = outcomes.last().unwrap().as_ref().unwrap();
        assert_eq!(last.state, State::LimitsMenu);
        assert!((group(&conv, "Group1").await.eth_limit - expected).abs() < f64::EPSILON);
    }
}

#[tokio::test]
async fn rejected_limits_leave_state_and_value() {
    let conv = conversation();
    let user = UserId(1_000_002);

    drive(
        &conv,
        user,
        vec![
            start(),
            press("configure_groups"),
            press("group:Group2"),
            press("set_limits"),
            press("set_sol_limit"),
        ],
    )
    .await;

    for input in ["-1", "abc", "1,5", ".5", "5.", "NaN", "inf"] {
        let outcome = conv.handle(user, text(input)).await.unwrap();
        assert_eq!(outcome.state, State::AwaitingLimitInput, "input {input:?}");
        assert_eq!(outcome.render.mode, RenderMode::New);
    }

    assert!((group(&conv, "Group2").await.sol_limit - 0.8).abs() < f64::EPSILON);
}

#[tokio::test]
async fn time_slots_are_stored_verbatim() {
    let conv = conversation();
    let user = UserId(1_000_003);

    for slot in ["09:00 - 18:00", "22:00 - 06:00", "25:61 - 00:00"] {
        let outcomes = drive(
            &conv,
            user,
            vec![
                start(),
                press("configure_timings"),
                press("set_time_slot"),
                text(slot),
            ],
        )
        .await;

        let last = outcomes.last().unwrap().as_ref().unwrap();
        assert_eq!(last.state, State::MainMenu);
        assert!(last.render.text.contains(slot));
        assert_eq!(conv.time_window().await.as_str(), slot);
    }
}

#[tokio::test]
async fn malformed_time_slot_is_rejected() {
    let conv = conversation();
    let user = UserId(1_000_004);

    let outcomes = drive(
        &conv,
        user,
        vec![
            start(),
            press("configure_timings"),
            press("set_time_slot"),
            text("9:00-18:00"),
        ],
    )
    .await;

    let last = outcomes.last().unwrap().as_ref().unwrap();
    assert_eq!(last.state, State::AwaitingTimeInput);
    assert_eq!(conv.time_window().await, TimeWindow::default());

    let back = conv.handle(user, press("back_to_main")).await.unwrap();
    assert_eq!(back.state, State::MainMenu);
}

#[tokio::test]
async fn blacklist_handles_are_normalized() {
    let conv = conversation();
    let user = UserId(1_000_005);

    let outcomes = drive(
        &conv,
        user,
        vec![
            start(),
            press("configure_groups"),
            press("group:Group1"),
            press("set_blacklist"),
            press("add_blacklist"),
            text("alice"),
            press("add_blacklist"),
            text("@alice"),
            press("remove_blacklist"),
            text("@bob"),
        ],
    )
    .await;

    assert!(outcomes.iter().all(Option::is_some));
    let last = outcomes.last().unwrap().as_ref().unwrap();
    assert!(last.render.text.contains("@bob was not in the blacklist"));

    let blacklist: Vec<String> = group(&conv, "Group1").await.blacklist.into_iter().collect();
    assert_eq!(blacklist, ["@alice"]);

    let listing = conv.handle(user, press("back_to_blacklist")).await.unwrap();
    assert_eq!(listing.state, State::BlacklistMenu);
    assert!(listing.render.text.contains("@alice"));
}

#[tokio::test]
async fn exit_ends_the_conversation() {
    let conv = conversation();
    let user = UserId(1_000_006);

    let outcomes = drive(&conv, user, vec![start(), press("exit")]).await;
    let goodbye = outcomes[1].as_ref().unwrap();
    assert_eq!(goodbye.state, State::Terminated);
    assert_eq!(goodbye.render.mode, RenderMode::Edit);
    assert_eq!(goodbye.render.buttons().count(), 0);

    for token in ["exit", "configure_groups", "configure_timings", "back_to_main"] {
        assert!(conv.handle(user, press(token)).await.is_none());
    }

    let echoed = conv.handle(user, text("still there?")).await.unwrap();
    assert_eq!(echoed.render.text, "You said: still there?");

    let menu = conv.handle(user, start()).await.unwrap();
    assert_eq!(menu.state, State::MainMenu);
}

#[tokio::test]
async fn groups_are_configured_independently() {
    let conv = conversation();
    let user = UserId(1_000_007);

    drive(
        &conv,
        user,
        vec![
            start(),
            press("configure_groups"),
            press("group:Group1"),
            press("set_limits"),
            press("set_eth_limit"),
            text("7"),
            press("back_to_group_options"),
            press("back_to_groups"),
            press("group:Group2"),
            press("set_blacklist"),
            press("add_blacklist"),
            text("carol"),
        ],
    )
    .await;

    let first = group(&conv, "Group1").await;
    let second = group(&conv, "Group2").await;
    assert!((first.eth_limit - 7.0).abs() < f64::EPSILON);
    assert!(first.blacklist.is_empty());
    assert!((second.eth_limit - 0.1).abs() < f64::EPSILON);
    assert!(second.blacklist.contains("@carol"));
}

#[tokio::test]
async fn configure_command_restarts_from_anywhere() {
    let conv = conversation();
    let user = UserId(1_000_008);

    drive(
        &conv,
        user,
        vec![
            start(),
            press("configure_groups"),
            press("group:Group1"),
            press("set_blacklist"),
            press("remove_blacklist"),
        ],
    )
    .await;

    let outcome = conv
        .handle(user, Event::Command(BotCommand::Configure))
        .await
        .unwrap();
    assert_eq!(outcome.state, State::MainMenu);
    assert_eq!(outcome.render.mode, RenderMode::New);
}

/// Every button rendered on the way through the menus leads somewhere.
#[tokio::test]
async fn rendered_buttons_have_matching_rows() {
    let conv = conversation();
    let mut next_user = 2_000_000_u64;
    let mut seen: HashSet<(State, Vec<String>)> = HashSet::new();
    let mut queue: VecDeque<Vec<String>> = VecDeque::from([Vec::new()]);

    while let Some(path) = queue.pop_front() {
        next_user += 1;
        let user = UserId(next_user);

        let mut outcome = conv.handle(user, start()).await.unwrap();
        for token in &path {
            outcome = conv.handle(user, press(token)).await.unwrap();
        }

        let tokens: Vec<String> = outcome.render.buttons().map(|b| b.token.clone()).collect();
        if !seen.insert((outcome.state, tokens.clone())) {
            continue;
        }

        for token in tokens {
            let action = Action::parse(&token)
                .unwrap_or_else(|| panic!("button token {token:?} does not parse"));
            assert!(
                table::find(outcome.state, &Event::Select(action)).is_some(),
                "button {token:?} has no row in {:?}",
                outcome.state
            );

            let mut longer = path.clone();
            longer.push(token);
            queue.push_back(longer);
        }
    }

    let states: HashSet<State> = seen.iter().map(|(state, _)| *state).collect();
    assert!(states.contains(&State::AwaitingLimitInput));
    assert!(states.contains(&State::AwaitingBlacklistRemove));
    assert!(states.contains(&State::AwaitingTimeInput));
    assert!(states.contains(&State::Terminated));
}

#[tokio::test]
async fn starts_are_recorded_in_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let user = UserId(1_000_009);

    {
        let users = Arc::new(JsonFileUserRepository::open(&path).await.unwrap());
        let config = BotConfig::default();
        let conv = Conversation::new(GroupStore::new(config.groups), config.time_window, users);

        conv.handle(user, start()).await.unwrap();
        conv.handle(user, Event::Command(BotCommand::Configure))
            .await
            .unwrap();
    }

    let reopened = JsonFileUserRepository::open(&path).await.unwrap();
    let record = reopened.find(user).await.unwrap().unwrap();
    assert_eq!(record.tg_id, user);
    assert!(reopened.find(UserId(42)).await.unwrap().is_none());
}
