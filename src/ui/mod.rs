pub mod layout;
mod game;
mod menu;
mod notice;
mod submenu;
mod summary;

pub use game::draw_game;
pub use layout::{calculate_game_chunks, calculate_summary_chunks};
pub use menu::draw_menu;
pub use notice::{draw_error, draw_loading};
pub use submenu::draw_submenu;
pub use summary::draw_game_over;
