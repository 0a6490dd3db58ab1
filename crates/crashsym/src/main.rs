use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crashsym_core::{Backend, Result as SymbolicateResult, SymbolicateOptions, Symbolicator};
use crashsym_utils::{debug, init_logging_with, LogFormat, LogLevel};

/// Symbolicate a macOS/iOS crash report against the dSYM bundles in a directory.
#[derive(Parser, Debug)]
#[command(name = "crashsym")]
#[command(version)]
#[command(
    about = "Symbolicate a crash report against the dSYM bundles in a directory",
    long_about = "Finds the crashed thread in a text crash report, matches each frame to its binary image \
                  and that image to a dSYM by UUID and architecture, and prints the report with the \
                  resolved frames spliced in. Frames without a matching dSYM are left as they were."
)]
struct Cli
{
    /// Crash report to symbolicate (legacy text format)
    #[arg(short = 'c', long = "crash", value_name = "FILE")]
    crash: PathBuf,

    /// Directory containing the .dSYM bundles; relative report paths resolve against it
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Symbolication backend: `tools` (dwarfdump + atos) or `native` (in-process DWARF)
    #[arg(short, long, default_value_t = Backend::Tools)]
    backend: Backend,

    /// Write the symbolicated report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Resolve every frame even if the same address was already resolved
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format (pretty, json); overrides CRASHSYM_LOG_FORMAT
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

fn main() -> ExitCode
{
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage problems are configuration errors: report and exit cleanly.
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let _guard = match init_logging_with(cli.log_level, cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_configuration() => {
            eprintln!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> SymbolicateResult<()>
{
    let mut options = SymbolicateOptions::new(cli.dir, cli.crash);
    options.backend = cli.backend;
    options.cache = !cli.no_cache;
    debug!(?options, "starting symbolication");

    let report = Symbolicator::new(options).run()?;

    match cli.output {
        Some(path) => fs::write(&path, report.output)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.output.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults()
    {
        let cli = Cli::try_parse_from(["crashsym", "--crash", "MyApp.crash"]).unwrap();
        assert_eq!(cli.crash, PathBuf::from("MyApp.crash"));
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.backend, Backend::Tools);
        assert!(!cli.no_cache);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_all_flags()
    {
        let cli = Cli::try_parse_from([
            "crashsym",
            "-c",
            "r.crash",
            "-d",
            "/symbols",
            "-b",
            "native",
            "-o",
            "out.txt",
            "--no-cache",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/symbols"));
        assert_eq!(cli.backend, Backend::Native);
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert!(cli.no_cache);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_crash_flag_is_required()
    {
        assert!(Cli::try_parse_from(["crashsym"]).is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected()
    {
        assert!(Cli::try_parse_from(["crashsym", "-c", "r.crash", "-b", "gdb"]).is_err());
    }
}
