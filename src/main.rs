use std::{ffi::OsString, io, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use kitty_echo::{kitty_protocol_available, EchoLoop};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, checked before `RUST_LOG`
const LOG_ENV: &str = "KITTY_ECHO_LOG";

/// Request the kitty keyboard protocol and echo stdin until `q` or end of input
#[derive(Debug, Default, Parser)]
#[command(version, about)]
struct Cli {
    /// Pop the keyboard enhancement flags again when the echo loop ends
    #[arg(long)]
    restore: bool,

    /// Only report whether the terminal supports the protocol, then exit
    #[arg(long, conflicts_with = "restore")]
    check: bool,
}

impl Cli {
    /// Parse `args`, falling back to the plain echo loop on anything not understood
    ///
    /// Only help and version requests come back as errors.
    fn parse_lenient<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                Err(err)
            }
            Err(err) => {
                debug!(%err, "ignoring arguments");
                Ok(Self::default())
            }
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = match Cli::parse_lenient(std::env::args_os()) {
        Ok(cli) => cli,
        Err(info) => {
            let _ = info.print();
            return ExitCode::SUCCESS;
        }
    };

    if cli.check {
        let answer = if kitty_protocol_available() {
            "supported"
        } else {
            "unsupported"
        };
        println!("{answer}");
        return ExitCode::SUCCESS;
    }

    let echo = EchoLoop::new().with_restore_on_exit(cli.restore);
    match echo.run(io::stdin().lock(), io::stdout().lock()) {
        Ok(summary) => debug!(
            termination = %summary.termination,
            echoed = summary.echoed,
            "done"
        ),
        Err(err) if err.is_broken_pipe() => debug!(%err, "stdout closed"),
        Err(err) => warn!(%err, "echo loop stopped"),
    }

    ExitCode::SUCCESS
}

// Logs go to stderr so stdout carries nothing but the terminal traffic.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_keeps_terminal_in_enhanced_mode() {
        let cli = Cli::parse_lenient(["kitty-echo"]).unwrap();
        assert!(!cli.restore);
        assert!(!cli.check);
    }

    #[test]
    fn restore_flag_is_parsed() {
        let cli = Cli::parse_lenient(["kitty-echo", "--restore"]).unwrap();
        assert!(cli.restore);
        assert!(!cli.check);
    }

    #[test]
    fn conflicting_flags_fall_back_to_plain_echo() {
        let cli = Cli::parse_lenient(["kitty-echo", "--restore", "--check"]).unwrap();
        assert!(!cli.restore);
        assert!(!cli.check);
    }

    #[test]
    fn unknown_arguments_fall_back_to_plain_echo() {
        let cli = Cli::parse_lenient(["kitty-echo", "extra", "--quit", "x"]).unwrap();
        assert!(!cli.restore);
        assert!(!cli.check);
    }

    #[test]
    fn help_is_still_reported() {
        let err = Cli::parse_lenient(["kitty-echo", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
