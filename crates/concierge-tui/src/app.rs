//! Application state for the concierge TUI.

use concierge_engine::{Config, ControllerError, PropertyProfile, TurnController, TurnEvent};
use tracing::debug;

use crate::event::Action;
use crate::input::TextInputState;
use crate::theme::Theme;

/// Lines scrolled per PageUp/PageDown.
pub const SCROLL_STEP: u16 = 5;

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Conversation and pending input.
    pub controller: TurnController,
    /// Cursor and history for the input box.
    pub input: TextInputState,
    /// Left-pane content.
    pub property: PropertyProfile,
    /// Hint shown while only the welcome message exists.
    pub empty_hint: String,
    /// Placeholder for the empty input box.
    pub input_placeholder: String,
    /// Lines scrolled back from the newest message (0 = follow).
    pub scroll_back: u16,
    /// Whether the app should exit.
    pub should_quit: bool,
    pub theme: Theme,
}

impl App {
    /// Create the app with the reply path selected by the config.
    pub fn new(config: &Config) -> Result<Self, ControllerError> {
        let controller = TurnController::from_config(config, None)?;
        Ok(Self::with_controller(config, controller))
    }

    /// Create the app around an existing controller.
    pub fn with_controller(config: &Config, controller: TurnController) -> Self {
        let mut input = TextInputState::new();
        input.set_content(controller.pending_input());
        Self {
            controller,
            input,
            property: config.property.clone(),
            empty_hint: config.empty_hint.clone(),
            input_placeholder: config.input_placeholder.clone(),
            scroll_back: 0,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    /// Apply a key action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.controller.teardown();
                self.should_quit = true;
            }
            Action::Submit => {
                let sent = self.controller.pending_input().to_string();
                if self.controller.submit().is_some() {
                    self.input.record_sent(sent);
                    self.scroll_back = 0;
                }
            }
            Action::InsertNewline => self.edit(|input| input.insert('\n')),
            Action::Insert(c) => self.edit(|input| input.insert(c)),
            Action::Backspace => self.edit(TextInputState::backspace),
            Action::Delete => self.edit(TextInputState::delete),
            Action::HistoryPrev => self.edit(TextInputState::history_prev),
            Action::HistoryNext => self.edit(TextInputState::history_next),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP),
            Action::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP),
            Action::QuickAction(quick) => {
                self.controller.apply_quick_action(quick);
                self.input.set_content(self.controller.pending_input());
            }
            Action::ClearConversation => {
                self.controller.clear_conversation();
                self.scroll_back = 0;
            }
            Action::None => {}
        }
    }

    /// React to a reply appended by the controller.
    pub fn on_turn_event(&mut self, event: &TurnEvent) {
        debug!(?event, "Turn event");
        self.scroll_back = 0;
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInputState)) {
        f(&mut self.input);
        self.controller.update_pending_input(self.input.content());
    }
}
