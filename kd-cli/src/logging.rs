use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

// ─── line format ─────────────────────────────────────────────────────────────

/// `[timestamp] LEVEL target: fields`.
///
/// The terminal copy leaves out the timestamp; the log file keeps it.
struct LineFormat {
    timestamps: bool,
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if self.timestamps {
            write!(writer, "{} ", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))?;
        }

        if writer.has_ansi_escapes() {
            write!(writer, "{}{:>5}\x1b[0m ", level_color(*meta.level()), meta.level())?;
            write!(writer, "\x1b[2m{}:\x1b[0m ", meta.target())?;
        } else {
            write!(writer, "{:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ─── log file ────────────────────────────────────────────────────────────────

type SharedFile = Arc<Mutex<Option<File>>>;

/// Log file opened after the subscriber is installed. Writes are dropped
/// until [`enable_file_logging`] sets a file.
static LOG_FILE: OnceLock<SharedFile> = OnceLock::new();

#[derive(Clone)]
struct LogFile(SharedFile);

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// ─── public API ──────────────────────────────────────────────────────────────

/// Installs the global subscriber. Later calls are ignored.
///
/// Filter: `RUST_LOG` when set and valid, else `level`, else `info`.
/// Output goes to stderr so that stdout carries only command output.
pub fn init_logging(level: &str) {
    let file: SharedFile = Arc::new(Mutex::new(None));
    let _ = LOG_FILE.set(file.clone());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let terminal = tracing_subscriber::fmt::layer()
        .event_format(LineFormat { timestamps: false })
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let log_file = tracing_subscriber::fmt::layer()
        .event_format(LineFormat { timestamps: true })
        .with_ansi(false)
        .with_writer(LogFile(file));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(log_file)
        .try_init();
}

/// Appends log output to `path` from now on, replacing any earlier file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let Some(slot) = LOG_FILE.get() else {
        anyhow::bail!("logging not yet initialized");
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

/// Logs the failure of a task nobody awaits.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, error = %format!("{error:#}"), "background task failed");
    }
}
