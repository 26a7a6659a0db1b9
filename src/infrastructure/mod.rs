// Infrastructure implementations for tracewrap.

pub mod config_file;
pub mod emitter;
pub mod loader;
pub mod toolchain;

pub use config_file::load_config;
pub use emitter::FsSourceEmitter;
pub use loader::FsSourceLoader;
pub use toolchain::ProcessToolchain;
