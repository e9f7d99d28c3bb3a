//! Interactive record editing.
//!
//! [`EditSession`] is a small state machine over the fields the wizard asks
//! for. Every accepted answer is saved right away through the supplied apply
//! function, so quitting halfway keeps what was already entered.

use ipa_core::error::{IpaError, IpaResult};
use ipa_core::{MetadataPatch, MetadataRecord};
use std::io::{BufRead, Write};

/// Answer that leaves the current value alone
pub const KEEP_MARKER: &str = "-";

/// Field the session is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStep {
    Name,
    BundleIdentifier,
    Version,
    Done,
}

impl EditStep {
    fn next(self) -> Self {
        match self {
            EditStep::Name => EditStep::BundleIdentifier,
            EditStep::BundleIdentifier => EditStep::Version,
            EditStep::Version | EditStep::Done => EditStep::Done,
        }
    }

    /// Record field name shown to the operator
    pub fn label(self) -> &'static str {
        match self {
            EditStep::Name => "name",
            EditStep::BundleIdentifier => "bundleIdentifier",
            EditStep::Version => "version",
            EditStep::Done => "",
        }
    }

    fn current(self, record: &MetadataRecord) -> &str {
        match self {
            EditStep::Name => &record.name,
            EditStep::BundleIdentifier => &record.bundle_identifier,
            EditStep::Version => record.version(),
            EditStep::Done => "",
        }
    }

    fn patch(self, value: &str) -> MetadataPatch {
        let value = Some(value.to_string());
        match self {
            EditStep::Name => MetadataPatch {
                name: value,
                ..Default::default()
            },
            EditStep::BundleIdentifier => MetadataPatch {
                bundle_identifier: value,
                ..Default::default()
            },
            EditStep::Version => MetadataPatch {
                version: value,
                ..Default::default()
            },
            EditStep::Done => MetadataPatch::default(),
        }
    }
}

/// What happened to one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Value applied and saved
    Saved,
    /// Current value kept
    Kept,
    /// Answer refused; the same field is asked again
    Rejected(String),
}

/// Wizard state for one package
#[derive(Debug, Clone)]
pub struct EditSession {
    stem: String,
    step: EditStep,
    record: MetadataRecord,
}

impl EditSession {
    pub fn new(stem: impl Into<String>, record: MetadataRecord) -> Self {
        Self {
            stem: stem.into(),
            step: EditStep::Name,
            record,
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn step(&self) -> EditStep {
        self.step
    }

    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    pub fn is_done(&self) -> bool {
        self.step == EditStep::Done
    }

    /// Question for the current step, `None` once finished
    pub fn prompt(&self) -> Option<String> {
        if self.is_done() {
            return None;
        }
        Some(format!(
            "{} [{}] ({} keeps it): ",
            self.step.label(),
            self.step.current(&self.record),
            KEEP_MARKER
        ))
    }

    /// Feed one input line.
    ///
    /// `apply` receives the stem and a single-field patch and returns the
    /// saved record. Validation failures reject the answer without
    /// advancing; any other error ends the session.
    pub fn handle<F>(&mut self, input: &str, apply: F) -> IpaResult<Reply>
    where
        F: FnOnce(&str, &MetadataPatch) -> IpaResult<MetadataRecord>,
    {
        if self.is_done() {
            return Ok(Reply::Kept);
        }

        let answer = input.trim();
        if answer == KEEP_MARKER {
            self.step = self.step.next();
            return Ok(Reply::Kept);
        }
        if answer.is_empty() {
            return Ok(Reply::Rejected(format!(
                "{} cannot be blank",
                self.step.label()
            )));
        }

        let patch = self.step.patch(answer);
        match apply(&self.stem, &patch) {
            Ok(record) => {
                self.record = record;
                self.step = self.step.next();
                Ok(Reply::Saved)
            },
            Err(IpaError::InvalidField { field, reason }) => {
                Ok(Reply::Rejected(format!("{}: {}", field, reason)))
            },
            Err(e) => Err(e),
        }
    }
}

/// Drive a session from line input until it finishes or input ends.
///
/// Returns the number of saved answers.
pub fn run<R, W, F>(session: &mut EditSession, input: R, mut output: W, mut apply: F) -> IpaResult<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str, &MetadataPatch) -> IpaResult<MetadataRecord>,
{
    let write_err = |e| IpaError::io("Failed to write prompt".to_string(), e);
    let mut lines = input.lines();
    let mut saved = 0;

    while let Some(prompt) = session.prompt() {
        write!(output, "{}", prompt).map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let line = match lines.next() {
            Some(line) => line.map_err(|e| IpaError::io("Failed to read answer".to_string(), e))?,
            None => break,
        };

        match session.handle(&line, &mut apply)? {
            Reply::Saved => saved += 1,
            Reply::Kept => {},
            Reply::Rejected(reason) => writeln!(output, "{}", reason).map_err(write_err)?,
        }
    }

    Ok(saved)
}
