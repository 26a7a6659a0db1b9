use crate::domain::config::{InstrumentConfig, WrapperConfig};
use crate::domain::error::{InstrumentError, InstrumentResult};
use crate::domain::mutator::{self, Outcome};
use crate::ports::{SourceEmitter, SourceLoader, Toolchain};
use std::ffi::{OsStr, OsString};
use tracing::{debug, error, info, warn};

/// Load, guard, mutate and write back the configured target file.
pub struct InstrumentUsecase<'a> {
    pub loader: &'a dyn SourceLoader,
    pub emitter: &'a dyn SourceEmitter,
}

impl<'a> InstrumentUsecase<'a> {
    pub fn run(&self, config: &InstrumentConfig) -> InstrumentResult<Outcome> {
        let mut source = self.loader.load(&config.target_file)?;
        debug!(
            path = %config.target_file.display(),
            items = source.tree.items.len(),
            "parsed target file"
        );
        let outcome = mutator::instrument(&mut source.tree, config)?;
        if let Outcome::Instrumented(mutation) = &outcome {
            self.emitter.emit(&source, mutation)?;
        }
        Ok(outcome)
    }
}

/// Decides whether to instrument, then always hands the arguments to the toolchain.
pub struct Dispatcher<'a> {
    pub config: &'a WrapperConfig,
    pub usecase: InstrumentUsecase<'a>,
    pub toolchain: &'a dyn Toolchain,
}

impl<'a> Dispatcher<'a> {
    /// Run one wrapper invocation and return the process exit code.
    ///
    /// `args` are the raw command-line arguments after the program name.
    /// Only an exact first argument equal to the trigger instruments.
    pub fn run(&self, args: &[OsString]) -> i32 {
        if args.first().map(OsString::as_os_str) == Some(OsStr::new(&self.config.trigger)) {
            self.attempt_instrumentation();
        }

        match self.toolchain.run(args) {
            Ok(exit) if exit.success => 0,
            Ok(exit) => {
                debug!(code = ?exit.code, "toolchain exited with failure");
                if self.config.propagate_exit_status {
                    exit.code.unwrap_or(1)
                } else {
                    1
                }
            }
            Err(e) => {
                error!("{:#}", e);
                1
            }
        }
    }

    /// Failures are logged and swallowed so the passthrough still runs.
    fn attempt_instrumentation(&self) {
        let path = self.config.instrument.target_file.display();
        match self.usecase.run(&self.config.instrument) {
            Ok(Outcome::Instrumented(_)) => info!("Instrumented: {}", path),
            Ok(Outcome::AlreadyInstrumented) => info!("Already instrumented: {}", path),
            Err(e @ InstrumentError::TargetNotFound { .. }) => {
                warn!("{} in {}; nothing instrumented", e, path)
            }
            Err(e) if e.is_precondition() => warn!("{}; nothing instrumented", e),
            Err(e) => error!("{}", e),
        }
    }
}
