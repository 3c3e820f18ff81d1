//! Outbound renders and the screens of the menu tree.

use std::fmt::Write as _;

use super::types::{Action, BlacklistOp, GroupId, LimitKind};
use crate::config::{BlacklistEdit, BlacklistOutcome, GroupConfig, TimeWindow, ValidationError};

/// How a render reaches the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Send a new message.
    New,
    /// Edit the message that carried the pressed button.
    Edit,
}

/// A labeled selectable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    #[must_use]
    pub fn new(label: impl Into<String>, action: &Action) -> Self {
        Self {
            label: label.into(),
            token: action.token(),
        }
    }
}

/// Rows of buttons attached to a message.
pub type Keyboard = Vec<Vec<Button>>;

/// Message text and keyboard, before a render mode is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Screen {
    fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    #[must_use]
    pub fn into_render(self, mode: RenderMode) -> Render {
        Render {
            mode,
            text: self.text,
            keyboard: self.keyboard,
        }
    }
}

/// A complete outbound message request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Render {
    pub mode: RenderMode,
    pub text: String,
    pub keyboard: Keyboard,
}

impl Render {
    /// Iterates over every button in the keyboard.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.keyboard.iter().flatten()
    }
}

fn row(label: &str, action: &Action) -> Vec<Button> {
    vec![Button::new(label, action)]
}

pub fn main_menu() -> Screen {
    Screen::new(
        "Welcome to AixTG Bot. You sleep, I ape!\n\nPlease choose an option below:",
        vec![
            row("🚀 Configure Groups", &Action::ConfigureGroups),
            row("⏰ Configure Activation Timings", &Action::ConfigureTimings),
            row("📊 Current Status", &Action::ShowStatus),
            row("🔚 Exit", &Action::Exit),
        ],
    )
}

pub fn goodbye() -> Screen {
    Screen::new(
        "👋👋👋 Goodbye! Use /start to restart the bot.👋👋👋",
        Vec::new(),
    )
}

pub fn group_list(groups: &[(GroupId, String)]) -> Screen {
    let mut keyboard: Keyboard = groups
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|(id, label)| Button::new(label.as_str(), &Action::PickGroup(id.clone())))
                .collect()
        })
        .collect();
    keyboard.push(row("🔄 Back to Main Menu", &Action::BackToMain));

    Screen::new(
        "Group Configuration\n\nSelect the group you want to configure:",
        keyboard,
    )
}

pub fn group_options(label: &str) -> Screen {
    Screen::new(
        format!("{label} Configuration\n\nChoose what you want to configure:"),
        vec![
            row("💰 Set Limits", &Action::ShowLimits),
            row("🚫 Set Blacklist", &Action::ShowBlacklist),
            row("🔄 Back", &Action::BackToGroups),
        ],
    )
}

pub fn limits(group: &GroupConfig) -> Screen {
    Screen::new(
        format!(
            "Current Limits for {}\n\n\
             ETH Limit (for base chain): {}\n\
             SOL Limit: {}\n\n\
             Select an option to modify:",
            group.display_name(),
            group.eth_limit,
            group.sol_limit,
        ),
        vec![
            row("Set ETH Limit (for base chain)", &Action::SetLimit(LimitKind::Eth)),
            row("Set SOL Limit", &Action::SetLimit(LimitKind::Sol)),
            row("🔄 Back", &Action::BackToGroupOptions),
        ],
    )
}

pub fn limit_prompt(kind: LimitKind) -> Screen {
    Screen::new(
        format!("Please enter the new {} limit as a number:", kind.label()),
        vec![row("🔄 Cancel", &Action::CancelLimit)],
    )
}

pub fn limit_rejected(error: &ValidationError) -> Screen {
    Screen::new(
        format!("❌ {error}\n\nPlease enter a valid positive number."),
        vec![row("🔄 Cancel", &Action::CancelLimit)],
    )
}

pub fn limit_updated(kind: LimitKind, value: f64) -> Screen {
    Screen::new(
        format!(
            "Limit Updated Successfully!\n\nNew {} limit: {value}",
            kind.label()
        ),
        vec![row("🔄 Back to Limits", &Action::ShowLimits)],
    )
}

pub fn blacklist(group: &GroupConfig) -> Screen {
    let entries = if group.blacklist.is_empty() {
        "No users in blacklist".to_owned()
    } else {
        group
            .blacklist
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    };

    Screen::new(
        format!(
            "Blacklist for {}\n\n{entries}\n\nChoose an action:",
            group.display_name()
        ),
        vec![
            row("➕ Add to Blacklist", &Action::EditBlacklist(BlacklistOp::Add)),
            row("➖ Remove from Blacklist", &Action::EditBlacklist(BlacklistOp::Remove)),
            row("🔄 Back", &Action::BackToGroupOptions),
        ],
    )
}

pub fn handle_prompt(op: BlacklistOp) -> Screen {
    let direction = match op {
        BlacklistOp::Add => "add to",
        BlacklistOp::Remove => "remove from",
    };
    Screen::new(
        format!("Please enter the Telegram handle to {direction} the blacklist:"),
        vec![row("🔄 Cancel", &Action::CancelBlacklist)],
    )
}

pub fn handle_rejected(error: &ValidationError) -> Screen {
    Screen::new(
        format!("❌ {error}\n\nPlease enter a handle such as @username."),
        vec![row("🔄 Cancel", &Action::CancelBlacklist)],
    )
}

pub fn blacklist_updated(edit: &BlacklistEdit) -> Screen {
    let handle = &edit.handle;
    let message = match edit.outcome {
        BlacklistOutcome::Added => format!("✅ Added {handle} to blacklist"),
        BlacklistOutcome::AlreadyPresent => format!("ℹ️ {handle} is already in the blacklist"),
        BlacklistOutcome::Removed => format!("✅ Removed {handle} from blacklist"),
        BlacklistOutcome::NotFound => format!("❌ {handle} was not in the blacklist"),
    };
    Screen::new(
        message,
        vec![row("🔄 Back to Blacklist", &Action::BackToBlacklist)],
    )
}

/// Time menu; `last_entry` is the slot this user last set, shown when
/// someone else has changed the window since.
pub fn time_menu(window: &TimeWindow, last_entry: Option<&str>) -> Screen {
    let mut text = format!(
        "⏰Time Configuration\n\n\
         Activate Time for the Bot (in UTC): {window}\n"
    );
    if let Some(entry) = last_entry.filter(|entry| *entry != window.as_str()) {
        let _ = writeln!(text, "Your last entry: {entry}");
    }
    text.push_str("\nChoose an action:");

    Screen::new(
        text,
        vec![
            row("⏰ Set Custom Time Slot", &Action::SetTimeSlot),
            row("🔄 Back to Main Menu", &Action::BackToMain),
        ],
    )
}

pub fn time_prompt() -> Screen {
    Screen::new(
        "Please enter a custom time slot in the format HH:MM - HH:MM (e.g., 09:00 - 18:00):",
        vec![row("🔙 Back to Main Menu", &Action::BackToMain)],
    )
}

pub fn time_rejected() -> Screen {
    Screen::new(
        "❌ Invalid format! Please enter a time slot in the format HH:MM - HH:MM (e.g., 09:00 - 18:00).",
        vec![row("🔄 Cancel", &Action::BackToMain)],
    )
}

pub fn time_updated(window: &TimeWindow) -> Screen {
    Screen::new(
        format!("✅ Custom time slot set to: {window}"),
        vec![row("🔙 Back to Main Menu", &Action::BackToMain)],
    )
}

/// Overview of the activation window and every group.
pub fn status(window: &TimeWindow, active_now: Option<bool>, groups: &[GroupConfig]) -> Screen {
    let mut text = String::from("📊 Current Status\n\n");

    let activity = match active_now {
        Some(true) => "active now",
        Some(false) => "inactive now",
        None => "window is not a valid clock range",
    };
    let _ = writeln!(text, "Activation window (UTC): {window} ({activity})");

    for group in groups {
        let _ = write!(
            text,
            "\n{}\n  ETH limit: {}\n  SOL limit: {}\n  Blacklisted: {}\n",
            group.display_name(),
            group.eth_limit,
            group.sol_limit,
            group.blacklist.len(),
        );
    }

    Screen::new(text, vec![row("🔄 Back to Main Menu", &Action::BackToMain)])
}

pub fn echo(text: &str) -> Screen {
    Screen::new(format!("You said: {text}"), Vec::new())
}
