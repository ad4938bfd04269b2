//! joe: logchamp
//! joe: call it logchamp
//! joe: please

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Mutex;

use colored::{Color, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::macros;

#[derive(Debug)]
pub enum InitError {
    LogFile(io::Error),
    Logger(SetLoggerError),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogFile(err) => write!(f, "cannot create log file: {err}"),
            Self::Logger(err) => write!(f, "cannot install logger: {err}"),
        }
    }
}

struct Logger {
    file: Mutex<BufWriter<File>>,
}

impl Logger {
    fn new(filename: &str) -> io::Result<Self> {
        log::set_max_level(LevelFilter::Debug);
        Ok(Self { file: Mutex::new(BufWriter::new(File::create(filename)?)) })
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match metadata.target().split("::").next() {
            Some("carousel_collage") => true,
            _ => metadata.level() <= Level::Info,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = time::OffsetDateTime::now_utc()
            .format(macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_default();
        let target = record.target();
        let level = record.level().as_str();
        let args = record.args();

        let color = match record.level() {
            Level::Error => Color::BrightRed,
            Level::Warn => Color::BrightYellow,
            Level::Info => Color::BrightCyan,
            Level::Debug => Color::Magenta,
            Level::Trace => Color::Green,
        };

        // stdout carries the collage path
        eprintln!("{} {} {args}", timestamp.color(Color::BrightBlack), level.color(color));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{timestamp} [{target} {level}] {args}").ok();
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            file.flush().ok();
        }
    }
}

pub fn init() -> Result<(), InitError> {
    let logger = Logger::new(".log").map_err(InitError::LogFile)?;
    log::set_boxed_logger(Box::new(logger)).map_err(InitError::Logger)
}
