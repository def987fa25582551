//! arnold-tui: terminal UI components
//!
//! Chat widgets built on ratatui and crossterm.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
