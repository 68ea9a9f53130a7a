pub mod delivery_log;
pub mod tui;

pub use delivery_log::LogDelivery;
pub use tui::TuiPrompter;
