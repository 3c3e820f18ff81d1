//! Conversation vocabulary: identities, states, actions and events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of the chatting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Returns a shortened form of the id suitable for log lines.
    #[must_use]
    pub fn masked(self) -> String {
        let digits = self.0.to_string();
        if digits.len() > 4 {
            format!("{}...", &digits[..4])
        } else {
            digits
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a configurable group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a user within the menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    MainMenu,
    GroupSelection,
    GroupOptions,
    TimeMenu,
    AwaitingTimeInput,
    LimitsMenu,
    AwaitingLimitInput,
    BlacklistMenu,
    AwaitingBlacklistAdd,
    AwaitingBlacklistRemove,
    Terminated,
}

impl State {
    /// Every state, in menu order.
    pub const ALL: [Self; 11] = [
        Self::MainMenu,
        Self::GroupSelection,
        Self::GroupOptions,
        Self::TimeMenu,
        Self::AwaitingTimeInput,
        Self::LimitsMenu,
        Self::AwaitingLimitInput,
        Self::BlacklistMenu,
        Self::AwaitingBlacklistAdd,
        Self::AwaitingBlacklistRemove,
        Self::Terminated,
    ];

    /// Whether the state waits for free-form text from the user.
    #[must_use]
    pub const fn awaits_input(self) -> bool {
        matches!(
            self,
            Self::AwaitingTimeInput
                | Self::AwaitingLimitInput
                | Self::AwaitingBlacklistAdd
                | Self::AwaitingBlacklistRemove
        )
    }
}

/// Which of the two group limits an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitKind {
    /// Primary limit, denominated in ETH on the base chain.
    Eth,
    /// Secondary limit, denominated in SOL.
    Sol,
}

impl LimitKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Sol => "SOL",
        }
    }
}

/// Blacklist mutation awaiting a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlacklistOp {
    Add,
    Remove,
}

/// A menu selection carried by an inline button.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    ConfigureGroups,
    ConfigureTimings,
    ShowStatus,
    Exit,
    BackToMain,
    PickGroup(GroupId),
    ShowLimits,
    ShowBlacklist,
    BackToGroups,
    SetTimeSlot,
    SetLimit(LimitKind),
    BackToGroupOptions,
    EditBlacklist(BlacklistOp),
    BackToBlacklist,
    CancelLimit,
    CancelBlacklist,
}

const GROUP_TOKEN_PREFIX: &str = "group:";

impl Action {
    /// Parses an opaque selection token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(id) = token.strip_prefix(GROUP_TOKEN_PREFIX) {
            return (!id.is_empty()).then(|| Self::PickGroup(GroupId::new(id)));
        }

        let action = match token {
            "configure_groups" => Self::ConfigureGroups,
            "configure_timings" => Self::ConfigureTimings,
            "status" => Self::ShowStatus,
            "exit" => Self::Exit,
            "back_to_main" => Self::BackToMain,
            "set_limits" => Self::ShowLimits,
            "set_blacklist" => Self::ShowBlacklist,
            "back_to_groups" => Self::BackToGroups,
            "set_time_slot" => Self::SetTimeSlot,
            "set_eth_limit" => Self::SetLimit(LimitKind::Eth),
            "set_sol_limit" => Self::SetLimit(LimitKind::Sol),
            "back_to_group_options" => Self::BackToGroupOptions,
            "add_blacklist" => Self::EditBlacklist(BlacklistOp::Add),
            "remove_blacklist" => Self::EditBlacklist(BlacklistOp::Remove),
            "back_to_blacklist" => Self::BackToBlacklist,
            "cancel_limit_setting" => Self::CancelLimit,
            "cancel_blacklist" => Self::CancelBlacklist,
            _ => return None,
        };
        Some(action)
    }

    /// Returns the wire token for this action.
    #[must_use]
    pub fn token(&self) -> String {
        let token = match self {
            Self::PickGroup(id) => return format!("{GROUP_TOKEN_PREFIX}{id}"),
            Self::ConfigureGroups => "configure_groups",
            Self::ConfigureTimings => "configure_timings",
            Self::ShowStatus => "status",
            Self::Exit => "exit",
            Self::BackToMain => "back_to_main",
            Self::ShowLimits => "set_limits",
            Self::ShowBlacklist => "set_blacklist",
            Self::BackToGroups => "back_to_groups",
            Self::SetTimeSlot => "set_time_slot",
            Self::SetLimit(LimitKind::Eth) => "set_eth_limit",
            Self::SetLimit(LimitKind::Sol) => "set_sol_limit",
            Self::BackToGroupOptions => "back_to_group_options",
            Self::EditBlacklist(BlacklistOp::Add) => "add_blacklist",
            Self::EditBlacklist(BlacklistOp::Remove) => "remove_blacklist",
            Self::BackToBlacklist => "back_to_blacklist",
            Self::CancelLimit => "cancel_limit_setting",
            Self::CancelBlacklist => "cancel_blacklist",
        };
        token.to_owned()
    }

    /// Whether this action merely returns to a parent menu.
    #[must_use]
    pub const fn is_back(&self) -> bool {
        matches!(
            self,
            Self::BackToMain
                | Self::BackToGroups
                | Self::BackToGroupOptions
                | Self::BackToBlacklist
                | Self::CancelLimit
                | Self::CancelBlacklist
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Commands that (re)start the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCommand {
    Start,
    Configure,
}

impl BotCommand {
    /// Parses a slash command, accepting an optional `@botname` suffix.
    ///
    /// Returns `None` for text that is not one of the known commands.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _bot)| name);

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "configure" => Some(Self::Configure),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Configure => "configure",
        }
    }
}

/// An inbound conversation event, stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(BotCommand),
    Select(Action),
    Text(String),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(cmd) => write!(f, "/{}", cmd.name()),
            Self::Select(action) => write!(f, "select {action}"),
            Self::Text(_) => f.write_str("text"),
        }
    }
}
