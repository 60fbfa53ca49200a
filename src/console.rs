//! Line-oriented operator console.
//!
//! [`parse`] turns one input line into a [`ConsoleCommand`]; [`execute`] runs
//! it against a [`DeskHandle`] and returns a [`Reply`] whose `Display` output
//! is what the operator sees.

use std::fmt;

use crate::{
    core::desk::{Admission, DeskSnapshot},
    record::{PatientDraft, PatientRecord, VisitStatus},
    runtime::handle::{DeskHandle, RuntimeError},
    types::{MAX_RANK, MIN_RANK, Rank, rank_in_range},
};

/// Usage text printed by `help`.
pub const HELP: &str = "\
Commands:
  intake <id> <rank 1-5> [info...]  admit or re-triage a patient
  next                              treat the most urgent patient
  peek                              show the most urgent patient
  lookup <id>                       show a patient record
  discharge <id>                    remove a patient record
  status                            desk counters as JSON
  help                              this text
  quit                              exit";

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Admit a patient.
    Intake(PatientDraft),
    /// Treat the next patient.
    Next,
    /// Show the next patient.
    Peek,
    /// Look a patient up by id.
    Lookup(String),
    /// Remove a patient record.
    Discharge(String),
    /// Print desk counters.
    Status,
    /// Print usage.
    Help,
    /// Leave the console loop.
    Quit,
}

/// Input the console could not turn into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// The line was blank.
    #[error("empty command")]
    Empty,
    /// The first word is not a command.
    #[error("unknown command {0:?}; try `help`")]
    Unknown(String),
    /// A required argument was not given.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// The rank is not a number in `MIN_RANK..=MAX_RANK`.
    #[error("rank must be a number from {min} to {max}, got {0:?}", min = MIN_RANK, max = MAX_RANK)]
    InvalidRank(String),
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let line = line.trim();
    let (op, rest) = match line.split_once(char::is_whitespace) {
        Some((op, rest)) => (op, rest.trim_start()),
        None => (line, ""),
    };

    match op {
        "" => Err(ConsoleError::Empty),
        "intake" => parse_intake(rest),
        "next" => Ok(ConsoleCommand::Next),
        "peek" => Ok(ConsoleCommand::Peek),
        "lookup" => single_arg(rest, "lookup <id>").map(ConsoleCommand::Lookup),
        "discharge" => single_arg(rest, "discharge <id>").map(ConsoleCommand::Discharge),
        "status" => Ok(ConsoleCommand::Status),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(ConsoleError::Unknown(other.to_string())),
    }
}

fn parse_intake(rest: &str) -> Result<ConsoleCommand, ConsoleError> {
    const USAGE: &str = "intake <id> <rank 1-5> [info...]";
    let (id, rest) = next_word(rest).ok_or(ConsoleError::Usage(USAGE))?;
    let (rank_text, info) = next_word(rest).ok_or(ConsoleError::Usage(USAGE))?;

    let rank = rank_text
        .parse::<i64>()
        .ok()
        .filter(|r| rank_in_range(*r))
        .and_then(|r| Rank::try_from(r).ok())
        .ok_or_else(|| ConsoleError::InvalidRank(rank_text.to_string()))?;

    Ok(ConsoleCommand::Intake(PatientDraft::new(id, rank, info)))
}

/// Splits off the first whitespace-delimited word; the remainder is trimmed.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    Some(match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    })
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, ConsoleError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(ConsoleError::Usage(usage)),
    }
}

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Patient queued.
    Admitted(Admission),
    /// Patient treated.
    Treated(PatientRecord),
    /// Next patient shown.
    Next(PatientRecord),
    /// Nobody is waiting.
    QueueEmpty,
    /// Record found.
    Record(PatientRecord),
    /// Record removed.
    Discharged(PatientRecord),
    /// No record for the id.
    NotFound(String),
    /// Desk counters.
    Status(DeskSnapshot),
    /// Usage text.
    Help,
    /// Console should exit.
    Quit,
}

impl Reply {
    /// True when the console loop should stop.
    pub fn is_quit(&self) -> bool {
        matches!(self, Reply::Quit)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Admitted(adm) => match adm.previous {
                Some(VisitStatus::Waiting) => write!(
                    f,
                    "Patient {} re-triaged to priority {}.",
                    adm.id, adm.rank
                ),
                _ => write!(f, "Patient {} added with priority {}.", adm.id, adm.rank),
            },
            Reply::Treated(rec) => {
                write!(f, "Treated patient: {} (Priority {})", rec.id, rec.rank)
            }
            Reply::Next(rec) => write!(
                f,
                "Next patient: {} | Priority {} | Info: {}",
                rec.id, rec.rank, rec.info
            ),
            Reply::QueueEmpty => f.write_str("No patients in queue."),
            Reply::Record(rec) => write!(
                f,
                "Record: {} | Priority {} | Arrival order: {} | Status: {} | Info: {}",
                rec.id, rec.rank, rec.arrival, rec.status, rec.info
            ),
            Reply::Discharged(rec) => write!(f, "Discharged patient {}.", rec.id),
            Reply::NotFound(id) => write!(f, "Patient {id} not found."),
            Reply::Status(snapshot) => match serde_json::to_string_pretty(snapshot) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
            Reply::Help => f.write_str(HELP),
            Reply::Quit => f.write_str("Exiting."),
        }
    }
}

/// Runs `cmd` against the desk behind `handle`.
pub async fn execute(handle: &DeskHandle, cmd: ConsoleCommand) -> Result<Reply, RuntimeError> {
    let reply = match cmd {
        ConsoleCommand::Intake(draft) => Reply::Admitted(handle.admit(draft).await?),
        ConsoleCommand::Next => handle
            .treat_next()
            .await?
            .map_or(Reply::QueueEmpty, Reply::Treated),
        ConsoleCommand::Peek => handle
            .peek_next()
            .await?
            .map_or(Reply::QueueEmpty, Reply::Next),
        ConsoleCommand::Lookup(id) => match handle.lookup(id.as_str()).await? {
            Some(rec) => Reply::Record(rec),
            None => Reply::NotFound(id),
        },
        ConsoleCommand::Discharge(id) => match handle.discharge(id.as_str()).await? {
            Some(rec) => Reply::Discharged(rec),
            None => Reply::NotFound(id),
        },
        ConsoleCommand::Status => Reply::Status(handle.snapshot().await?),
        ConsoleCommand::Help => Reply::Help,
        ConsoleCommand::Quit => Reply::Quit,
    };
    Ok(reply)
}
