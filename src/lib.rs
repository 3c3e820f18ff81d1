//! Group Config Bot Library
//!
//! A Telegram bot for configuring per-group trading limits, handle
//! blacklists and a daily activation window.
//!
//! This crate provides the core functionality for:
//! - Loading and validating group seed configurations
//! - Driving the menu conversation through an explicit transition table
//! - Recording users who start the bot
//! - Delivering menus via the Telegram Bot API

pub mod config;
pub mod conversation;
pub mod repo;
pub mod store;
pub mod telegram;
