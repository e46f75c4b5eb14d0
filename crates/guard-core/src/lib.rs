pub mod config;
mod state;
mod wire;

pub use config::GuardConfig;
pub use state::SharedDetector;
pub use wire::{AlertWire, SummaryWire};
