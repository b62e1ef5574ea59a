// ZoneLoader - console.rs
//
// Line-oriented console acting as the UI binding layer.
//
// Architecture:
//   - A reader thread forwards stdin lines over an mpsc channel.
//   - The main loop waits up to `poll_interval` for a line, runs it as a
//     command, then polls the controller and prints every observed state
//     transition from its `Watcher`s.
//   - On end of input the loop keeps polling until the pending derivation
//     settles, so piped scripts see their final result.

use crate::app::controller::FilterController;
use crate::core::cell::Watcher;
use crate::core::source::DataSource;
use serde::Serialize;
use std::fmt::Display;
use std::io::BufRead;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Upper bound on how long the console waits for loading to settle after
/// stdin is closed.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(120);

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `zone N`: filter by raw zone id (0 = no filter).
    Zone(i64),
    /// `clear`: remove the filter.
    Clear,
    /// `ack`: dismiss the current error message.
    Ack,
    /// `show`: print the full current state.
    Show,
    /// `help`.
    Help,
    /// `quit` / `exit`.
    Quit,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let command = match head.to_lowercase().as_str() {
        "zone" | "z" => {
            let arg = words
                .next()
                .ok_or_else(|| "usage: zone <id>".to_string())?;
            let raw = arg
                .parse::<i64>()
                .map_err(|e| format!("'{arg}' is not a zone id: {e}"))?;
            Command::Zone(raw)
        }
        "clear" | "all" => Command::Clear,
        "ack" => Command::Ack,
        "show" | "status" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }
    Ok(Some(command))
}

const HELP: &str = "\
commands:
  zone <id>   show devices in one zone (0 = all zones)
  clear       show all zones
  ack         dismiss the current error message
  show        print the current state
  quit        exit";

/// Spawn the stdin reader thread.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot read stdin");
                    return;
                }
            }
        }
    });
    rx
}

pub struct Console<S: DataSource> {
    controller: FilterController<S>,
    poll_interval: Duration,
    json: bool,
    loading: Watcher<bool>,
    message: Watcher<Option<String>>,
    results: Watcher<Vec<S::Item>>,
}

impl<S> Console<S>
where
    S: DataSource,
    S::Item: Display + Serialize,
{
    pub fn new(controller: FilterController<S>, poll_interval: Duration, json: bool) -> Self {
        let loading = controller.loading().observe();
        let message = controller.message().observe();
        let results = controller.results().observe();
        Self {
            controller,
            poll_interval,
            json,
            loading,
            message,
            results,
        }
    }

    /// Run until `quit` or end of input.
    pub fn run(mut self, lines: mpsc::Receiver<String>) {
        println!("{HELP}");
        loop {
            match lines.recv_timeout(self.poll_interval) {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => self.execute(command),
                    Ok(None) => {}
                    Err(e) => println!("error: {e}"),
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.drain_until_settled();
                    break;
                }
            }
            self.controller.poll();
            self.report();
        }
        tracing::info!("Console closed");
    }

    fn execute(&mut self, command: Command) {
        tracing::debug!(?command, "Console command");
        match command {
            Command::Zone(raw) => {
                if let Err(e) = self.controller.set_zone(raw) {
                    println!("error: {e}");
                }
            }
            Command::Clear => self.controller.clear_filter(),
            Command::Ack => self.controller.acknowledge_message(),
            Command::Show => self.print_snapshot(),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    fn drain_until_settled(&mut self) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while self.controller.loading().get() && Instant::now() < deadline {
            self.controller.wait(self.poll_interval);
            self.report();
        }
        self.controller.poll();
        self.report();
    }

    /// Print the transitions observed since the last call.
    fn report(&mut self) {
        if self.json {
            let loading = self.loading.drain();
            let message = self.message.drain();
            let results = self.results.drain();
            if !(loading.is_empty() && message.is_empty() && results.is_empty()) {
                self.print_snapshot();
            }
            return;
        }

        for loading in self.loading.drain() {
            if loading {
                println!("loading {} ...", self.controller.filter());
            } else {
                println!("loaded");
            }
        }
        if let Some(results) = self.results.latest() {
            print_results(&results);
        }
        for message in self.message.drain() {
            match message {
                Some(text) => println!("error: {text} (type 'ack' to dismiss)"),
                None => println!("message dismissed"),
            }
        }
    }

    fn print_snapshot(&self) {
        let snapshot = self.controller.snapshot();
        if self.json {
            match serde_json::to_string(&snapshot) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Cannot serialise snapshot"),
            }
            return;
        }
        println!(
            "filter: {} | generation: {} | loading: {} | message: {}",
            snapshot.filter,
            snapshot.generation,
            snapshot.loading,
            snapshot.message.as_deref().unwrap_or("-"),
        );
        print_results(&snapshot.results);
    }
}

fn print_results<T: Display>(results: &[T]) {
    println!("{} result(s)", results.len());
    for item in results {
        println!("  {item}");
    }
}
