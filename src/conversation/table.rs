//! The transition table driving the conversation.
//!
//! Each row names the state it applies in, the event that triggers it, the
//! step to run, the state reached when the step succeeds and whether the
//! reply is a new message or an edit of the menu message.

use super::render::RenderMode;
use super::types::{Action, BlacklistOp, Event, LimitKind, State};

use State::{
    AwaitingBlacklistAdd, AwaitingBlacklistRemove, AwaitingLimitInput, AwaitingTimeInput,
    BlacklistMenu, GroupOptions, GroupSelection, LimitsMenu, MainMenu, Terminated, TimeMenu,
};

/// States a row applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Any,
    In(State),
}

/// Event shape a row reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// `/start` or `/configure`.
    Command,
    /// Free-form text.
    Text,
    /// A specific menu selection.
    Select(Action),
    /// Selection of any group.
    AnyGroup,
}

impl Trigger {
    fn matches(&self, event: &Event) -> bool {
        match (self, event) {
            (Self::Command, Event::Command(_)) | (Self::Text, Event::Text(_)) => true,
            (Self::Select(expected), Event::Select(action)) => expected == action,
            (Self::AnyGroup, Event::Select(Action::PickGroup(_))) => true,
            _ => false,
        }
    }
}

/// Work performed by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Restart,
    ShowMainMenu,
    ShowStatus,
    Exit,
    ShowGroups,
    SelectGroup,
    ShowGroupOptions,
    ShowLimits,
    PromptLimit,
    ApplyLimit,
    ShowBlacklist,
    PromptHandle,
    ApplyHandle,
    ShowTimeMenu,
    PromptTimeSlot,
    ApplyTimeSlot,
    Echo,
}

/// One row of the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub origin: Origin,
    pub trigger: Trigger,
    pub step: Step,
    /// State reached when the step succeeds.
    pub next: State,
    pub render: RenderMode,
}

const fn row(
    origin: Origin,
    trigger: Trigger,
    step: Step,
    next: State,
    render: RenderMode,
) -> Transition {
    Transition {
        origin,
        trigger,
        step,
        next,
        render,
    }
}

const fn on(state: State, action: Action, step: Step, next: State) -> Transition {
    row(Origin::In(state), Trigger::Select(action), step, next, RenderMode::Edit)
}

const fn on_text(state: State, step: Step, next: State) -> Transition {
    row(Origin::In(state), Trigger::Text, step, next, RenderMode::New)
}

/// Every valid (state, event) pair. Rows are matched in order.
pub static TRANSITIONS: [Transition; 30] = [
    row(Origin::Any, Trigger::Command, Step::Restart, MainMenu, RenderMode::New),
    // Main menu
    on(MainMenu, Action::ConfigureGroups, Step::ShowGroups, GroupSelection),
    on(MainMenu, Action::ConfigureTimings, Step::ShowTimeMenu, TimeMenu),
    on(MainMenu, Action::ShowStatus, Step::ShowStatus, MainMenu),
    on(MainMenu, Action::Exit, Step::Exit, Terminated),
    on(MainMenu, Action::BackToMain, Step::ShowMainMenu, MainMenu),
    // Group selection
    row(
        Origin::In(GroupSelection),
        Trigger::AnyGroup,
        Step::SelectGroup,
        GroupOptions,
        RenderMode::Edit,
    ),
    on(GroupSelection, Action::BackToMain, Step::ShowMainMenu, MainMenu),
    // Group options
    on(GroupOptions, Action::ShowLimits, Step::ShowLimits, LimitsMenu),
    on(GroupOptions, Action::ShowBlacklist, Step::ShowBlacklist, BlacklistMenu),
    on(GroupOptions, Action::BackToGroups, Step::ShowGroups, GroupSelection),
    // Time window
    on(TimeMenu, Action::SetTimeSlot, Step::PromptTimeSlot, AwaitingTimeInput),
    on(TimeMenu, Action::BackToMain, Step::ShowMainMenu, MainMenu),
    on_text(AwaitingTimeInput, Step::ApplyTimeSlot, MainMenu),
    on(AwaitingTimeInput, Action::BackToMain, Step::ShowMainMenu, MainMenu),
    // Limits
    on(LimitsMenu, Action::SetLimit(LimitKind::Eth), Step::PromptLimit, AwaitingLimitInput),
    on(LimitsMenu, Action::SetLimit(LimitKind::Sol), Step::PromptLimit, AwaitingLimitInput),
    on(LimitsMenu, Action::ShowLimits, Step::ShowLimits, LimitsMenu),
    on(LimitsMenu, Action::BackToGroupOptions, Step::ShowGroupOptions, GroupOptions),
    on_text(AwaitingLimitInput, Step::ApplyLimit, LimitsMenu),
    on(AwaitingLimitInput, Action::CancelLimit, Step::ShowLimits, LimitsMenu),
    // Blacklist
    on(
        BlacklistMenu,
        Action::EditBlacklist(BlacklistOp::Add),
        Step::PromptHandle,
        AwaitingBlacklistAdd,
    ),
    on(
        BlacklistMenu,
        Action::EditBlacklist(BlacklistOp::Remove),
        Step::PromptHandle,
        AwaitingBlacklistRemove,
    ),
    on(BlacklistMenu, Action::BackToGroupOptions, Step::ShowGroupOptions, GroupOptions),
    on(BlacklistMenu, Action::BackToBlacklist, Step::ShowBlacklist, BlacklistMenu),
    on_text(AwaitingBlacklistAdd, Step::ApplyHandle, BlacklistMenu),
    on(AwaitingBlacklistAdd, Action::CancelBlacklist, Step::ShowBlacklist, BlacklistMenu),
    on_text(AwaitingBlacklistRemove, Step::ApplyHandle, BlacklistMenu),
    on(AwaitingBlacklistRemove, Action::CancelBlacklist, Step::ShowBlacklist, BlacklistMenu),
    // Outside a conversation
    on_text(Terminated, Step::Echo, Terminated),
];

/// Finds the row handling `event` in `state`.
#[must_use]
pub fn find(state: State, event: &Event) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| {
        let applies = match t.origin {
            Origin::Any => true,
            Origin::In(origin) => origin == state,
        };
        applies && t.trigger.matches(event)
    })
}

/// Rows that apply in `state`, including rows valid in any state.
pub fn rows_for(state: State) -> impl Iterator<Item = &'static Transition> {
    TRANSITIONS
        .iter()
        .filter(move |t| matches!(t.origin, Origin::Any) || t.origin == Origin::In(state))
}
