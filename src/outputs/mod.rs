//! Output implementations

pub mod background;
pub mod console;

#[cfg(feature = "async-outputs")]
pub mod spawn;

pub use background::BackgroundOutput;
pub use console::{ConsoleOutput, ConsoleStream};

#[cfg(feature = "async-outputs")]
pub use spawn::SpawnOutput;

pub use crate::core::{AsyncOutput, Output};
