//! Component trait: the interface every view and panel implements.
//!
//! - Components own their local UI state and render themselves.
//! - Player data comes from `AppState`, which they only read.
//! - Input produces `Vec<Action>`; the App dispatches those actions.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Only called when this component has focus.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Called each UI tick (~100ms).
    fn tick(&mut self, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Every dispatched action reaches every component, focused or not.
    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);

    /// Rows this component needs when docked below the main view.
    fn min_height(&self) -> u16 {
        3
    }

    /// True while the component is capturing text input, so global
    /// single-letter shortcuts must not fire.
    fn wants_text_input(&self) -> bool {
        false
    }

    /// True while a popup owned by the component is open; it then receives
    /// every key, including the global ones.
    fn has_modal(&self) -> bool {
        false
    }
}
