use crate::domain::error::{InstrumentError, InstrumentResult};
use crate::domain::source::LoadedSource;
use crate::ports::SourceLoader;
use std::fs;
use std::path::Path;

/// Reads and parses source files from disk.
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn load(&self, path: &Path) -> InstrumentResult<LoadedSource> {
        let text = fs::read_to_string(path).map_err(|source| InstrumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        LoadedSource::parse(path, text).map_err(|e| InstrumentError::parse(path, &e))
    }
}
