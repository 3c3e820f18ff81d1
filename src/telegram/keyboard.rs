//! Conversion of conversation keyboards into inline markup.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::conversation::Keyboard;

/// Builds inline markup, or `None` for a keyboard without buttons.
pub fn inline_markup(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(button.label.clone(), button.token.clone())
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}
