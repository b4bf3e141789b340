//! In-memory session lifecycle and runtime tuning state.

pub mod settings;
pub mod store;

pub use settings::SettingsStore;
pub use store::SessionStore;
