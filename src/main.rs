use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use logmerge::cli::{Cli, ColorMode};
use logmerge::config::Config;
use logmerge::error::MergeError;
use logmerge::merge::{MergeEngine, Source};

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so `logmerge a b | head` ends quietly.
    reset_sigpipe();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logmerge: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    match run(&cli.logfiles, &config) {
        Ok(0) => ExitCode::SUCCESS,
        // Each failed source was already reported while merging.
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            eprintln!("logmerge: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Merge `paths` to stdout. Returns how many sources failed mid-merge.
fn run(paths: &[PathBuf], config: &Config) -> Result<usize, MergeError> {
    let use_color = resolve_color_mode(config.color_mode);
    let options = config.merge_options()?;
    let decorations = config.decorations(paths.len(), use_color);

    let mut sources = Vec::with_capacity(paths.len());
    let mut stdin_taken = false;
    for (path, decoration) in paths.iter().zip(decorations) {
        let reader = open_source(path, &mut stdin_taken)?;
        sources.push(Source::new(path.display().to_string(), reader, decoration));
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let mut failures = 0;

    for item in MergeEngine::new(sources, &options) {
        match item {
            Ok(emission) => {
                if let Err(e) = writer.write_all(emission.rendered.as_bytes()) {
                    if e.kind() == io::ErrorKind::BrokenPipe {
                        return Ok(failures);
                    }
                    return Err(e.into());
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("logmerge: {e}");
            }
        }
    }

    if let Err(e) = writer.flush() {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(failures);
        }
        return Err(e.into());
    }

    Ok(failures)
}

fn open_source(path: &Path, stdin_taken: &mut bool) -> Result<Box<dyn BufRead>, MergeError> {
    if path == Path::new("-") {
        if *stdin_taken {
            return Err(MergeError::Config("stdin (-) can only be merged once".to_string()));
        }
        *stdin_taken = true;
        debug!("reading stdin");
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(path).map_err(|source| MergeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("opened {}", path.display());
    Ok(Box::new(BufReader::new(file)))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            let stdout = io::stdout();
            if !stdout.is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// For a filter like `logmerge` piped into `head` or `less`, restoring
/// `SIG_DFL` lets the OS end the process normally.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
