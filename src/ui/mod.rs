//! Full-screen interface for the review session.

mod app;
pub mod theme;
mod widgets;

pub use app::App;
