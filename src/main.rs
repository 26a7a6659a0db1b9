// Command-line entry point for tracewrap.

use clap::{value_parser, Arg, ArgAction, Command};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracewrap::application::{Dispatcher, InstrumentUsecase};
use tracewrap::domain::config::WrapperConfig;
use tracewrap::infrastructure::{load_config, FsSourceEmitter, FsSourceLoader, ProcessToolchain};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Describes the command line for the usage message only.
///
/// Arguments are never parsed through clap: every one of them, a leading `--`
/// and non-UTF-8 bytes included, is forwarded to the toolchain verbatim.
fn cli() -> Command {
    Command::new("tracewrap")
        .about("cargo wrapper that injects a timing guard before building")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("args")
                .value_name("CARGO-ARGS")
                .action(ArgAction::Append)
                .value_parser(value_parser!(OsString))
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[WARN] Failed to set tracing subscriber: {}", e);
    }
}

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    if args.is_empty() {
        eprintln!("{}", cli().render_usage());
        return ExitCode::from(1);
    }

    init_logging();

    let config = match std::env::current_dir() {
        Ok(dir) => load_config(&dir).unwrap_or_else(|e| {
            tracing::warn!("{:#}; using defaults", e);
            WrapperConfig::default()
        }),
        Err(e) => {
            tracing::warn!("Cannot determine working directory: {}; using defaults", e);
            WrapperConfig::default()
        }
    };

    let toolchain = ProcessToolchain::new(config.toolchain.clone());
    let dispatcher = Dispatcher {
        config: &config,
        usecase: InstrumentUsecase {
            loader: &FsSourceLoader,
            emitter: &FsSourceEmitter,
        },
        toolchain: &toolchain,
    };

    let code = dispatcher.run(&args);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
