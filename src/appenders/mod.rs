//! Appender implementations

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use rotating_file::{resolve_encoding, RotationSchedule, TimedRotatingFileAppender, When};

pub use crate::core::Appender;
