//! Widgets for the two-pane screen.

mod chat_panel;
mod input_bar;
mod property_panel;

pub use chat_panel::ChatPanel;
pub use input_bar::InputBar;
pub use property_panel::PropertyPanel;
