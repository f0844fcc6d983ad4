mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{EmbeddingProvider, Settings, SettingsError};
