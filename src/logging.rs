//! Tracing subscriber set-up.
//!
//! The interactive view owns the terminal, so log lines only go to a file
//! there. Without a file, plain-text runs log to stderr and interactive runs
//! install no formatter at all.

use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_error::{ErrorLayer, ExtractSpanTrace, SpanTrace};
use tracing_subscriber::{
    EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::domain::LOVError;

pub const LOG_ENV: &str = "LOV_LOG";

/// Where formatted log lines are written.
pub enum LogTarget {
    File(String),
    Stderr,
    Off,
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8, target: LogTarget) -> Result<(), LOVError> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level(verbosity)));

    let writer = match target {
        LogTarget::File(path) => {
            let path = shellexpand::full(&path)
                .map_err(|e| LOVError::InvalidArgument(format!("log file {path}: {e}")))?
                .into_owned();
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(BoxMakeWriter::new(Mutex::new(file)))
        }
        LogTarget::Stderr => Some(BoxMakeWriter::new(std::io::stderr)),
        LogTarget::Off => None,
    };
    let fmt_layer = writer.map(|w| fmt::layer().with_writer(w).with_ansi(false).with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| LOVError::Logging(e.to_string()))
}

/// First span trace recorded along the source chain of `err`.
pub fn span_trace<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a SpanTrace> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(trace) = e.span_trace() {
            return Some(trace);
        }
        current = e.source();
    }
    None
}
