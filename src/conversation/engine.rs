//! Conversation engine: runs transition table rows against the stores.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::render::{self, Render, RenderMode, Screen};
use super::table::{self, Step, Transition};
use super::types::{Action, BlacklistOp, Event, State, UserId};
use crate::config::{GroupConfig, TimeWindow, parse_limit};
use crate::repo::UserRepository;
use crate::store::{
    GroupStore, GroupStoreError, PendingInput, Session, SessionStore, TimeWindowStore,
};

/// Result of a handled event: one render and the state it left the user in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub render: Render,
    pub state: State,
}

/// What a step decided.
enum StepOutcome {
    /// Move to the row's next state.
    Advance(Screen),
    /// Input was rejected; stay and re-prompt.
    Stay(Screen),
    /// Session data was missing; go to another state instead.
    Redirect(Screen, State),
    /// Nothing to do for this event.
    Ignore(&'static str),
}

/// Drives conversations for all users.
pub struct Conversation {
    sessions: Arc<SessionStore>,
    groups: GroupStore,
    window: TimeWindowStore,
    users: Arc<dyn UserRepository>,
}

impl Conversation {
    /// Creates an engine over the given groups, window and user store.
    #[must_use]
    pub fn new(groups: GroupStore, window: TimeWindow, users: Arc<dyn UserRepository>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            groups,
            window: TimeWindowStore::new(window),
            users,
        }
    }

    /// Session store, shared with the idle-session janitor.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    #[must_use]
    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    /// Current activation window.
    pub async fn time_window(&self) -> TimeWindow {
        self.window.get().await
    }

    /// Handles one inbound event for a user.
    ///
    /// Returns `None` when the event has no meaning in the user's current
    /// state; nothing is rendered and the session is left untouched.
    pub async fn handle(&self, user: UserId, event: Event) -> Option<Outcome> {
        let handle = match &event {
            Event::Command(_) => Some(self.sessions.get_or_create(user).await),
            _ => self.sessions.get(user).await,
        };

        let Some(handle) = handle else {
            let mut detached = Session::terminated();
            return self.transition(user, &mut detached, &event).await;
        };

        let mut session = handle.lock().await;
        let outcome = self.transition(user, &mut session, &event).await;

        if session.state == State::Terminated {
            drop(session);
            self.sessions.remove(user).await;
            debug!("Session of user {} ended", user.masked());
        }

        outcome
    }

    async fn transition(
        &self,
        user: UserId,
        session: &mut Session,
        event: &Event,
    ) -> Option<Outcome> {
        let from = session.state;

        let Some(row) = table::find(from, event) else {
            warn!(
                "User {} sent unexpected event ({}) in state {:?}",
                user.masked(),
                event,
                from
            );
            return None;
        };

        session.touch();

        let (render, next) = match self.run_step(row, user, session, event).await {
            StepOutcome::Advance(screen) => (screen.into_render(row.render), row.next),
            StepOutcome::Stay(screen) => (screen.into_render(RenderMode::New), from),
            StepOutcome::Redirect(screen, state) => (screen.into_render(row.render), state),
            StepOutcome::Ignore(reason) => {
                warn!(
                    "Ignoring {} from user {} in state {:?}: {}",
                    event,
                    user.masked(),
                    from,
                    reason
                );
                return None;
            }
        };

        if matches!(event, Event::Select(action) if action.is_back()) {
            debug!("User {} navigated back to {:?}", user.masked(), next);
        }

        session.state = next;
        debug!("User {}: {:?} -> {:?} ({:?})", user.masked(), from, next, row.step);

        Some(Outcome {
            render,
            state: next,
        })
    }

    async fn run_step(
        &self,
        row: &Transition,
        user: UserId,
        session: &mut Session,
        event: &Event,
    ) -> StepOutcome {
        match row.step {
            Step::Restart => self.restart(user, session).await,
            Step::ShowMainMenu => StepOutcome::Advance(render::main_menu()),
            Step::ShowStatus => self.show_status().await,
            Step::Exit => {
                info!("User {} left the conversation", user.masked());
                StepOutcome::Advance(render::goodbye())
            }
            Step::ShowGroups => StepOutcome::Advance(self.group_list()),
            Step::SelectGroup => self.select_group(session, event),
            Step::ShowGroupOptions => self.show_group_options(session),
            Step::ShowLimits => self.show_limits(session).await,
            Step::PromptLimit => Self::prompt_limit(session, event),
            Step::ApplyLimit => self.apply_limit(user, session, event).await,
            Step::ShowBlacklist => self.show_blacklist(session).await,
            Step::PromptHandle => Self::prompt_handle(session, row.next),
            Step::ApplyHandle => self.apply_handle(user, session, event).await,
            Step::ShowTimeMenu => {
                let window = self.window.get().await;
                StepOutcome::Advance(render::time_menu(
                    &window,
                    session.custom_time_slot.as_deref(),
                ))
            }
            Step::PromptTimeSlot => StepOutcome::Advance(render::time_prompt()),
            Step::ApplyTimeSlot => self.apply_time_slot(user, session, event).await,
            Step::Echo => match event {
                Event::Text(text) => StepOutcome::Advance(render::echo(text)),
                _ => StepOutcome::Ignore("echo needs text"),
            },
        }
    }

    async fn restart(&self, user: UserId, session: &mut Session) -> StepOutcome {
        info!("User {} started the bot", user.masked());

        if let Err(e) = self.users.upsert_started(user).await {
            warn!("Failed to record start for user {}: {}", user.masked(), e);
        }

        session.reset();
        StepOutcome::Advance(render::main_menu())
    }

    async fn show_status(&self) -> StepOutcome {
        let window = self.window.get().await;
        let active_now = window.contains(Utc::now().time());
        let groups = self.groups.snapshot_all().await;
        StepOutcome::Advance(render::status(&window, active_now, &groups))
    }

    fn group_list(&self) -> Screen {
        render::group_list(self.groups.entries())
    }

    /// Falls back to the group list when the session lost its group.
    fn regroup(&self, session: &mut Session) -> StepOutcome {
        session.selected_group = None;
        session.pending = None;
        StepOutcome::Redirect(self.group_list(), State::GroupSelection)
    }

    fn select_group(&self, session: &mut Session, event: &Event) -> StepOutcome {
        let Event::Select(Action::PickGroup(id)) = event else {
            return StepOutcome::Ignore("not a group selection");
        };
        let Some(label) = self.groups.label(id) else {
            return StepOutcome::Ignore("unknown group");
        };

        session.selected_group = Some(id.clone());
        session.pending = None;
        StepOutcome::Advance(render::group_options(label))
    }

    fn show_group_options(&self, session: &mut Session) -> StepOutcome {
        session.pending = None;
        match session
            .selected_group
            .as_ref()
            .and_then(|id| self.groups.label(id))
        {
            Some(label) => StepOutcome::Advance(render::group_options(label)),
            None => self.regroup(session),
        }
    }

    async fn selected(&self, session: &Session) -> Option<GroupConfig> {
        let id = session.selected_group.as_ref()?;
        self.groups.snapshot(id).await.ok()
    }

    async fn show_limits(&self, session: &mut Session) -> StepOutcome {
        session.pending = None;
        match self.selected(session).await {
            Some(group) => StepOutcome::Advance(render::limits(&group)),
            None => self.regroup(session),
        }
    }

    fn prompt_limit(session: &mut Session, event: &Event) -> StepOutcome {
        let Event::Select(Action::SetLimit(kind)) = event else {
            return StepOutcome::Ignore("not a limit selection");
        };
        session.pending = Some(PendingInput::Limit(*kind));
        StepOutcome::Advance(render::limit_prompt(*kind))
    }

    async fn apply_limit(&self, user: UserId, session: &mut Session, event: &Event) -> StepOutcome {
        let Event::Text(text) = event else {
            return StepOutcome::Ignore("limit needs text");
        };
        let (Some(group), Some(PendingInput::Limit(kind))) =
            (session.selected_group.clone(), session.pending)
        else {
            return self.regroup(session);
        };

        let value = match parse_limit(text) {
            Ok(value) => value,
            Err(e) => {
                debug!("User {} entered an invalid limit: {}", user.masked(), e);
                return StepOutcome::Stay(render::limit_rejected(&e));
            }
        };

        match self.groups.set_limit(&group, kind, value).await {
            Ok(()) => {
                info!(
                    "User {} set {} limit of {} to {}",
                    user.masked(),
                    kind.label(),
                    group,
                    value
                );
                session.pending = None;
                StepOutcome::Advance(render::limit_updated(kind, value))
            }
            Err(GroupStoreError::Invalid(e)) => StepOutcome::Stay(render::limit_rejected(&e)),
            Err(GroupStoreError::UnknownGroup(_)) => self.regroup(session),
        }
    }

    async fn show_blacklist(&self, session: &mut Session) -> StepOutcome {
        session.pending = None;
        match self.selected(session).await {
            Some(group) => StepOutcome::Advance(render::blacklist(&group)),
            None => self.regroup(session),
        }
    }

    fn prompt_handle(session: &mut Session, next: State) -> StepOutcome {
        let op = match next {
            State::AwaitingBlacklistAdd => BlacklistOp::Add,
            State::AwaitingBlacklistRemove => BlacklistOp::Remove,
            _ => return StepOutcome::Ignore("not a blacklist prompt"),
        };
        session.pending = Some(PendingInput::Blacklist(op));
        StepOutcome::Advance(render::handle_prompt(op))
    }

    async fn apply_handle(&self, user: UserId, session: &mut Session, event: &Event) -> StepOutcome {
        let Event::Text(text) = event else {
            return StepOutcome::Ignore("handle needs text");
        };
        let op = match session.state {
            State::AwaitingBlacklistAdd => BlacklistOp::Add,
            State::AwaitingBlacklistRemove => BlacklistOp::Remove,
            _ => return StepOutcome::Ignore("not awaiting a handle"),
        };
        let Some(group) = session.selected_group.clone() else {
            return self.regroup(session);
        };

        let result = match op {
            BlacklistOp::Add => self.groups.blacklist_add(&group, text).await,
            BlacklistOp::Remove => self.groups.blacklist_remove(&group, text).await,
        };

        match result {
            Ok(edit) => {
                info!(
                    "User {} blacklist {:?} {} on {}: {:?}",
                    user.masked(),
                    op,
                    edit.handle,
                    group,
                    edit.outcome
                );
                session.pending = None;
                StepOutcome::Advance(render::blacklist_updated(&edit))
            }
            Err(GroupStoreError::Invalid(e)) => {
                debug!("User {} entered an invalid handle: {}", user.masked(), e);
                StepOutcome::Stay(render::handle_rejected(&e))
            }
            Err(GroupStoreError::UnknownGroup(_)) => self.regroup(session),
        }
    }

    async fn apply_time_slot(
        &self,
        user: UserId,
        session: &mut Session,
        event: &Event,
    ) -> StepOutcome {
        let Event::Text(text) = event else {
            return StepOutcome::Ignore("time slot needs text");
        };

        let window = match TimeWindow::parse(text) {
            Ok(window) => window,
            Err(e) => {
                debug!("User {} entered an invalid time slot: {}", user.masked(), e);
                return StepOutcome::Stay(render::time_rejected());
            }
        };

        if !window.is_in_range() {
            warn!(
                "Accepted time window '{}' from user {} is not a valid clock range",
                window,
                user.masked()
            );
        }

        let previous = self.window.set(window.clone()).await;
        info!(
            "User {} changed activation window: {} -> {}",
            user.masked(),
            previous,
            window
        );

        session.custom_time_slot = Some(window.as_str().to_owned());
        StepOutcome::Advance(render::time_updated(&window))
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("groups", &self.groups.entries().len())
            .finish_non_exhaustive()
    }
}
