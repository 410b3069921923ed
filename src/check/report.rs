//! Terminal rendering of check results and the final verdict

use colored::Colorize;
use std::io::{self, Write};

use super::{CheckResult, CheckStatus, Verdict};

/// Width of the status column; messages and hints align after it.
const TAG_WIDTH: usize = 7;

/// Writes report lines to any `Write` sink (stdout in the CLI, a buffer in tests).
pub struct Reporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Plain (uncoloured) reporter
    pub fn plain(out: W) -> Self {
        Self::new(out, false)
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        let line = format!("=== {title} ===");
        if self.color {
            writeln!(self.out, "{}", line.bold())?;
        } else {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)
    }

    /// One status line followed by its indented hints.
    pub fn result(&mut self, result: &CheckResult) -> io::Result<()> {
        let tag = format!("{:<width$}", result.status.tag(), width = TAG_WIDTH);
        let tag = if self.color {
            match result.status {
                CheckStatus::Ok => tag.green().bold().to_string(),
                CheckStatus::Warn => tag.yellow().bold().to_string(),
                CheckStatus::Fail => tag.red().bold().to_string(),
            }
        } else {
            tag
        };
        writeln!(self.out, "{tag}{}", result.message)?;

        for hint in &result.hints {
            writeln!(self.out, "{:width$}{hint}", "", width = TAG_WIDTH)?;
        }
        Ok(())
    }

    /// Blank line, then `OK  <Name> link: VERIFIED` or `FAIL  <Name> link: FAILED`.
    pub fn summary(&mut self, dependency: &str, verdict: Verdict) -> io::Result<()> {
        writeln!(self.out)?;
        let (marker, word) = match verdict {
            Verdict::Verified => ("OK", "VERIFIED"),
            Verdict::Failed => ("FAIL", "FAILED"),
        };
        let marker = match (self.color, verdict) {
            (false, _) => marker.to_string(),
            (true, Verdict::Verified) => marker.green().bold().to_string(),
            (true, Verdict::Failed) => marker.red().bold().to_string(),
        };
        writeln!(self.out, "{marker}  {dependency} link: {word}")?;
        self.out.flush()
    }

    /// Follow-up actions, indented under the summary line.
    pub fn next_steps(&mut self, steps: &[&str]) -> io::Result<()> {
        for step in steps {
            writeln!(self.out, "    Next step: {step}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
