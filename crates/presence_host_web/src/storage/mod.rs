//! Host storage adapters.

pub mod extension_settings;
