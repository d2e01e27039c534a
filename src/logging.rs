use std::fs::OpenOptions;

use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use crate::eval::Interpretation;

/// Install the global logger: stderr at `level`, plus `log_file` when
/// given. A log file that cannot be opened is reported and skipped.
/// Calling this twice is a no-op.
pub fn init(level: LevelFilter, log_file: Option<&str>) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        let path = shellexpand::tilde(path).into_owned();
        if let Some(dir) = std::path::Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cmd-deob: cannot open log file {path}: {e}"),
        }
    }

    let _ = CombinedLogger::init(loggers);
}

/// Log one interpretation as a single summary line.
pub fn log_interpretation(input: &str, result: &Interpretation) {
    let input: String = input.chars().take(200).collect();
    let commands = result.commands().join(" ; ");
    info!(
        "frames={} commands={} errors={}\t{input}\t=> {commands}",
        result.frames.len(),
        result.records().len(),
        result.errors.len(),
    );
}
