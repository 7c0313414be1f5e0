//! Log output for the command-line tool.
//!
//! One line per record: local time, level, `file:line`, message. The level
//! is coloured only when stderr is a terminal and `NO_COLOR` is unset.

use chrono::Local;
use env_logger::{Builder, Env};
use log::Level;
use std::io::{IsTerminal, Write};

fn level_colour(level: Level) -> &'static str {
    match level {
        Level::Error => "31",
        Level::Warn => "33",
        Level::Info => "32",
        Level::Debug => "36",
        Level::Trace => "90",
    }
}

/// Level name padded to five columns, wrapped in ANSI bold colour if asked.
pub fn level_tag(level: Level, colour: bool) -> String {
    if colour {
        format!("\x1b[{};1m{level:<5}\x1b[0m", level_colour(level))
    } else {
        format!("{level:<5}")
    }
}

fn use_colour() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Install the global logger at `info`, or `debug` when `verbose`.
/// `RUST_LOG` overrides both.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let colour = use_colour();

    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} {} [{}:{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                level_tag(record.level(), colour),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .init();
}
