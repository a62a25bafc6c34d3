//! User interface rendering.

mod browser;
mod theme;

use crate::app::App;
use crate::store::ContainerStore;
use ratatui::Frame;

pub use theme::ThemeColors;

/// Draw the UI.
pub fn draw<S: ContainerStore>(f: &mut Frame<'_>, app: &mut App<S>) {
    browser::draw_browser(f, app);
}
