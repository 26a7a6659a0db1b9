// Domain layer: configuration, the syntax-level engine and its error type.
// Nothing in here touches the filesystem or spawns processes.

pub mod config;
pub mod error;
pub mod guard;
pub mod mutator;
pub mod source;
pub mod template;
