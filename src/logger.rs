//! Logger that prints messages like `[WARN] Lorem ipsum`.
//!
//! When a log file is given, every record is also appended to it (without
//! color). That's the `<basepath>.log` file from `--log`.

use atty;
use log::{self, Log, Level, Metadata, Record};
use std::fs::File;
use std::io::Write;
use std::sync::Mutex;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

struct Logger {
    level: Level,
    use_color: bool,
    file: Option<Mutex<File>>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let color_choice = match self.use_color {
            true => ColorChoice::Auto,
            false => ColorChoice::Never,
        };
        let color = match record.level() {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            _ => Color::Green,
        };
        let mut stderr = StandardStream::stderr(color_choice);
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)));
        let _ = writeln!(&mut stderr, "[{}] {}",
            record.level().to_string(),
            record.args(),
        );
        let _ = stderr.reset();

        if let Some(ref file) = self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "[{}] {}", record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

pub fn init(level: Level, file: Option<File>) {
    let use_color = atty::is(atty::Stream::Stderr);
    let file = file.map(Mutex::new);
    let logger = Logger { level, use_color, file };
    let _ = log::set_boxed_logger(Box::new(logger));
    log::set_max_level(level.to_level_filter());
}
