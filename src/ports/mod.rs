use crate::domain::error::InstrumentResult;
use crate::domain::mutator::Mutation;
use crate::domain::source::LoadedSource;
use std::ffi::OsString;
use std::path::Path;

pub trait SourceLoader {
    fn load(&self, path: &Path) -> InstrumentResult<LoadedSource>;
}

pub trait SourceEmitter {
    /// Persist `mutation` applied to `source`, replacing the file it came from.
    fn emit(&self, source: &LoadedSource, mutation: &Mutation) -> InstrumentResult<()>;
}

/// How the delegated toolchain process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub success: bool,
    /// `None` when the child was terminated by a signal
    pub code: Option<i32>,
}

pub trait Toolchain {
    /// Run the toolchain with `args` verbatim, inheriting stdio, and wait for it.
    fn run(&self, args: &[OsString]) -> anyhow::Result<ChildExit>;
}
