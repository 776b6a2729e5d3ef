// Handlers HTTP da triagem de emails
pub mod health;
pub mod processar;

pub use health::*;
pub use processar::*;
