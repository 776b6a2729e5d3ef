pub mod settings;

pub use settings::{AiSettings, ServerSettings, Settings, UploadSettings};
