//! Line-oriented control commands read from stdin.

use std::io::{self, BufRead};
use std::thread;

use foundation::time::Month;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Year(i32),
    Month(Month),
    Resize { width: f64, height: f64 },
    Pause(bool),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(pub String);

impl std::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bad command: {}", self.0)
    }
}

impl std::error::Error for ParseCommandError {}

impl std::str::FromStr for ControlCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let err = |msg: &str| ParseCommandError(format!("{msg} (in {:?})", line.trim()));
        let mut words = line.split_whitespace();
        let cmd = words.next().ok_or_else(|| err("empty line"))?;
        let parsed = match cmd.to_ascii_lowercase().as_str() {
            "year" => {
                let y = words.next().ok_or_else(|| err("year needs a value"))?;
                ControlCommand::Year(y.parse().map_err(|_| err("year must be an integer"))?)
            }
            "month" => {
                let m = words.next().ok_or_else(|| err("month needs JAN..DEC"))?;
                ControlCommand::Month(Month::from_label(m).ok_or_else(|| err("unknown month"))?)
            }
            "resize" => {
                let mut dim = || -> Result<f64, ParseCommandError> {
                    let v: f64 = words
                        .next()
                        .ok_or_else(|| err("resize needs <width> <height>"))?
                        .parse()
                        .map_err(|_| err("size must be a number"))?;
                    if v.is_finite() && v > 0.0 {
                        Ok(v)
                    } else {
                        Err(err("size must be positive"))
                    }
                };
                let width = dim()?;
                let height = dim()?;
                ControlCommand::Resize { width, height }
            }
            "pause" => ControlCommand::Pause(true),
            "play" | "resume" => ControlCommand::Pause(false),
            "quit" | "exit" => ControlCommand::Quit,
            _ => return Err(err("unknown command")),
        };
        if words.next().is_some() {
            return Err(err("trailing arguments"));
        }
        Ok(parsed)
    }
}

/// Reads control lines on a detached thread, off the runtime, so a pending
/// stdin read never holds up shutdown. EOF ends the thread without quitting
/// the viewer.
pub fn spawn_stdin_reader(
    tx: mpsc::UnboundedSender<ControlCommand>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-controls".to_string())
        .spawn(move || forward_lines(io::stdin().lock(), &tx))
}

/// Parses each non-blank line and forwards it. Unparsable lines are logged
/// and skipped. Returns once the reader is exhausted or the receiver is gone.
fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<ControlCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ControlCommand>() {
            Ok(cmd) => {
                debug!(?cmd, "control command");
                if tx.send(cmd).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "ignoring control line"),
        }
    }
}
