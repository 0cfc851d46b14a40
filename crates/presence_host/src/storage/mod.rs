//! Host storage contracts and adapters.

pub mod settings_store;
