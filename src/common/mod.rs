pub mod prompt;
pub mod redact;
