use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use crate::app::logging::log_user_interaction;

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reload,
    Stop,
    TogglePanel,
    PrevPage,
    NextPage,
    Up,
    Down,
    Activate,
    Filter(char),
    ClearFilter,
}

/// Map a key press to an action. Uppercase letters set the artist filter,
/// so lowercase keys carry the commands.
pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Tab | KeyCode::BackTab => Action::TogglePanel,
        KeyCode::Left | KeyCode::Char('h') => Action::PrevPage,
        KeyCode::Right | KeyCode::Char('l') => Action::NextPage,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter => Action::Activate,
        KeyCode::Esc | KeyCode::Char('0') => Action::ClearFilter,
        KeyCode::Char(c) if c.is_ascii_uppercase() => Action::Filter(c),
        _ => return None,
    };
    Some(action)
}

/// Trait for event handling
pub trait EventHandlers {
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()>;
    fn on_key_event(&mut self, key: KeyEvent);
    fn quit(&mut self);
}

impl EventHandlers for App {
    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if let Event::Key(key) = crossterm::event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.on_key_event(key);
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        // Any key dismisses the warnings popup
        if self.show_config_warnings_popup {
            self.show_config_warnings_popup = false;
            return;
        }

        let Some(action) = action_for_key(key) else {
            return;
        };
        log_user_interaction(
            &format!("{:?}", action),
            Some(&format!("{:?} panel", self.panel_focus)),
        );

        match action {
            Action::Quit => self.quit(),
            Action::Reload => self.reload_library(),
            Action::Stop => self.stop_playback(),
            Action::TogglePanel => self.toggle_panel(),
            Action::PrevPage => self.prev_page(),
            Action::NextPage => self.next_page(),
            Action::Up => self.navigate_up(),
            Action::Down => self.navigate_down(),
            Action::Activate => self.activate_selection(),
            Action::Filter(letter) => self.set_letter_filter(Some(letter)),
            Action::ClearFilter => self.set_letter_filter(None),
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_vim_and_arrow_keys_agree() {
        assert_eq!(action_for_key(key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(action_for_key(key(KeyCode::Down)), Some(Action::Down));
        assert_eq!(action_for_key(key(KeyCode::Char('h'))), Some(Action::PrevPage));
        assert_eq!(action_for_key(key(KeyCode::Right)), Some(Action::NextPage));
    }

    #[test]
    fn test_uppercase_letters_filter() {
        let shifted = KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT);
        assert_eq!(action_for_key(shifted), Some(Action::Filter('B')));
        assert_eq!(action_for_key(key(KeyCode::Char('0'))), Some(Action::ClearFilter));
        assert_eq!(action_for_key(key(KeyCode::Esc)), Some(Action::ClearFilter));
    }

    #[test]
    fn test_ctrl_c_quits_and_other_chords_are_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(ctrl_c), Some(Action::Quit));
        assert_eq!(action_for_key(ctrl_r), None);
        assert_eq!(action_for_key(key(KeyCode::Char('x'))), None);
    }
}
