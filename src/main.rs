use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use linewise::{editor::KeyEditor, error::Error, session::Session, terminal};

/// Edit piped or file-backed text one line at a time, in place
#[derive(Parser, Debug)]
#[command(name = "linewise")]
#[command(version)]
struct Cli {
    /// File to edit; omit to read redirected standard input
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to log file for diagnostics
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("tracing subscriber already installed")?;
    Ok(())
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Pick the text source: a named file, or stdin when it is redirected.
/// Invoking with neither is a usage error.
fn open_input(cli: &Cli) -> Result<Box<dyn BufRead>, Error> {
    if let Some(path) = &cli.file {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Box::new(BufReader::new(file)))
    } else if !io::stdin().is_terminal() {
        piped_stdin()
    } else {
        Err(Error::Usage {
            program: program_name(),
        })
    }
}

/// Keep the text pipe readable on a duplicated descriptor, then point fd 0
/// at the controlling terminal so key events still reach crossterm.
#[cfg(unix)]
fn piped_stdin() -> Result<Box<dyn BufRead>, Error> {
    use std::os::unix::io::{AsRawFd, FromRawFd};

    let pipe_fd = unsafe { libc::dup(io::stdin().as_raw_fd()) };
    if pipe_fd == -1 {
        return Err(Error::Terminal(io::Error::last_os_error()));
    }
    // SAFETY: pipe_fd is a freshly duplicated descriptor we now own
    let pipe = unsafe { File::from_raw_fd(pipe_fd) };

    let tty = File::open("/dev/tty").map_err(Error::Terminal)?;
    if unsafe { libc::dup2(tty.as_raw_fd(), libc::STDIN_FILENO) } == -1 {
        return Err(Error::Terminal(io::Error::last_os_error()));
    }
    tracing::info!("stdin is a pipe; reopened fd 0 from /dev/tty");

    Ok(Box::new(BufReader::new(pipe)))
}

/// The Windows console delivers key events independently of the stdin
/// handle, so the pipe can stay where it is.
#[cfg(not(unix))]
fn piped_stdin() -> Result<Box<dyn BufRead>, Error> {
    Ok(Box::new(BufReader::new(io::stdin())))
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        // Diagnostics are best-effort; a bad log path should not stop the
        // editor from running.
        if let Err(e) = init_tracing(path) {
            eprintln!("warning: {:#}", e);
        }
    }
    terminal::install_panic_hook();

    let input = open_input(&cli)?;

    let modes = terminal::TerminalModes::enable().map_err(Error::Terminal)?;
    let (width, height) = terminal::size().map_err(Error::Terminal)?;
    tracing::info!(width, height, "session starting");

    let mut session = Session::new(input, KeyEditor, io::stdout(), width, height);
    let result = session.run();

    drop(modes);
    tracing::info!("session ended");
    result
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
