//! Generic check runner shared by every dependency profile.
//!
//! A profile is an ordered list of [`Check`] descriptors. The runner always
//! validates the environment first, then builds the profile's context and
//! executes checks in order:
//!
//! - a failed `fatal` check aborts the remaining sequence
//! - a failed `gating` check lets the sequence continue but fails the verdict
//! - anything else only contributes a report line
//!
//! The context is released once, after the last executed check, whether the
//! run completed or aborted.

pub mod env;
pub mod report;
pub mod result;


use std::io::{self, Write};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::EnvSource;
use crate::error::ConfigError;

pub use env::validate_env;
pub use report::Reporter;
pub use result::{CheckResult, CheckStatus};

/// Name recorded for the environment/configuration step.
pub const ENVIRONMENT_STEP: &str = "environment";

/// The external system a profile verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Database,
    Email,
    Storage,
}

impl DependencyKind {
    /// Name used in the summary line, e.g. "Database link: VERIFIED"
    pub fn name(&self) -> &'static str {
        match self {
            DependencyKind::Database => "Database",
            DependencyKind::Email => "Email",
            DependencyKind::Storage => "Storage",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DependencyKind::Database => "P2P Database (MySQL) Link Verification",
            DependencyKind::Email => "P2P Email (SMTP) Link Verification",
            DependencyKind::Storage => "P2P Object Storage Link Verification",
        }
    }

    /// Prefix of the profile's environment variables, used in messages
    pub fn env_label(&self) -> &'static str {
        match self {
            DependencyKind::Database => "DB",
            DependencyKind::Email => "SMTP",
            DependencyKind::Storage => "storage",
        }
    }
}

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Failed,
}

impl Verdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Verified => 0,
            Verdict::Failed => 1,
        }
    }
}

/// Per-run state handed to every check: configuration plus open clients.
pub trait CheckContext {
    /// Close sessions and connections. Called exactly once per run.
    fn release(&mut self);
}

/// One named step of a profile.
pub struct Check<C> {
    pub name: &'static str,
    /// A failure aborts the run
    pub fatal: bool,
    /// A failure fails the verdict; implied by `fatal`
    pub gating: bool,
    pub run: fn(&mut C) -> CheckResult,
}

impl<C> Check<C> {
    pub fn fatal(name: &'static str, run: fn(&mut C) -> CheckResult) -> Self {
        Self {
            name,
            fatal: true,
            gating: true,
            run,
        }
    }

    /// Non-fatal, but a failure still fails the verdict.
    pub fn gating(name: &'static str, run: fn(&mut C) -> CheckResult) -> Self {
        Self {
            name,
            fatal: false,
            gating: true,
            run,
        }
    }

    /// Non-fatal and never affects the verdict.
    pub fn advisory(name: &'static str, run: fn(&mut C) -> CheckResult) -> Self {
        Self {
            name,
            fatal: false,
            gating: false,
            run,
        }
    }
}

/// A dependency profile: required variables, context construction and checks.
pub trait Profile {
    type Context: CheckContext;

    fn kind(&self) -> DependencyKind;

    fn required_vars(&self) -> &'static [&'static str];

    /// Extra hints printed when required variables are missing
    fn env_hints(&self) -> &'static [&'static str] {
        &[]
    }

    /// Printed under a VERIFIED summary
    fn next_steps(&self) -> &'static [&'static str] {
        &[]
    }

    /// Parse configuration and construct clients. Must not touch the network.
    fn prepare(&self, env: &dyn EnvSource) -> Result<Self::Context>;

    fn checks(&self) -> Vec<Check<Self::Context>>;
}

/// Everything one run produced, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub kind: DependencyKind,
    pub verdict: Verdict,
    /// True when a fatal failure cut the sequence short
    pub aborted: bool,
    pub results: Vec<(&'static str, CheckResult)>,
}

impl RunReport {
    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, r)| r)
    }

    pub fn exit_code(&self) -> u8 {
        self.verdict.exit_code()
    }
}

/// Run `profile` against `env`, writing the report to `reporter`.
pub fn run_profile<P, W>(
    profile: &P,
    env: &dyn EnvSource,
    reporter: &mut Reporter<W>,
) -> io::Result<RunReport>
where
    P: Profile,
    W: Write,
{
    let kind = profile.kind();
    let mut report = RunReport {
        kind,
        verdict: Verdict::Verified,
        aborted: false,
        results: Vec::new(),
    };

    reporter.header(kind.title())?;

    let mut env_result = validate_env(kind.env_label(), profile.required_vars(), env);
    if env_result.is_fail() {
        for hint in profile.env_hints() {
            env_result = env_result.with_hint(*hint);
        }
        return abort(report, env_result, reporter);
    }
    reporter.result(&env_result)?;
    report.results.push((ENVIRONMENT_STEP, env_result));

    let mut context = match profile.prepare(env) {
        Ok(context) => context,
        Err(err) => {
            let detail = format!("{err:#}");
            warn!(dependency = kind.name(), error = %detail, "profile setup failed");
            return abort(report, setup_failure(&err), reporter);
        }
    };

    let executed = run_checks(profile, &mut context, reporter, &mut report);
    context.release();
    executed?;

    reporter.summary(kind.name(), report.verdict)?;
    if report.verdict == Verdict::Verified {
        reporter.next_steps(profile.next_steps())?;
    }
    Ok(report)
}

/// Execute the checks in order. A report write error stops the sequence, but
/// the caller still releases the context before propagating it.
fn run_checks<P, W>(
    profile: &P,
    context: &mut P::Context,
    reporter: &mut Reporter<W>,
    report: &mut RunReport,
) -> io::Result<()>
where
    P: Profile,
    W: Write,
{
    let kind = report.kind;
    for check in profile.checks() {
        debug!(dependency = kind.name(), check = check.name, "running check");
        let result = (check.run)(context);
        info!(
            dependency = kind.name(),
            check = check.name,
            status = ?result.status,
            "check finished"
        );

        let failed = result.is_fail();
        let written = reporter.result(&result);
        report.results.push((check.name, result));

        if failed && (check.fatal || check.gating) {
            report.verdict = Verdict::Failed;
        }
        if failed && check.fatal {
            report.aborted = true;
        }
        written?;
        if report.aborted {
            break;
        }
    }
    Ok(())
}

fn abort<W: Write>(
    mut report: RunReport,
    result: CheckResult,
    reporter: &mut Reporter<W>,
) -> io::Result<RunReport> {
    reporter.result(&result)?;
    report.results.push((ENVIRONMENT_STEP, result));
    report.verdict = Verdict::Failed;
    report.aborted = true;
    reporter.summary(report.kind.name(), report.verdict)?;
    Ok(report)
}

fn setup_failure(err: &anyhow::Error) -> CheckResult {
    match err.downcast_ref::<ConfigError>() {
        Some(config_err) => CheckResult::fail(config_err.to_string())
            .with_hint("Correct the value in .env (or the exported variable) and re-run."),
        None => CheckResult::fail(format!("Could not initialise the client: {err:#}"))
            .with_hint("Re-run with -vv for details."),
    }
}
