//! Ordered bundles of checks, one per pairing of release sources
//!
//! An audit takes already loaded inputs and a [ProductProfile], runs its
//! checks in a fixed order, and collects every [CheckReport]. Only input
//! that can't be parsed at all stops an audit early.
//!
//! [ProductProfile]: crate::config::ProductProfile

#[cfg(test)] mod tests;

mod ansible;
mod catalog;
mod constants;
mod operator;
mod release;

pub use ansible::AnsibleAudit;
pub use catalog::CatalogAudit;
pub use constants::ConstantsAudit;
pub use operator::{OperatorAudit, OperatorInputs};
pub use release::{ReleaseAudit, GIT_REFERENCE_LABEL};

use crate::reconcile::CheckReport;
use std::fmt;

/// Every check an audit ran, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub title: String,
    pub checks: Vec<CheckReport>,
}

impl AuditReport {
    pub fn new<S: Into<String>>(title: S) -> Self {
        AuditReport {
            title: title.into(),
            checks: Vec::new(),
        }
    }

    pub fn push(&mut self, check: CheckReport) {
        if check.passed {
            log::debug!("{}: PASS {}", self.title, check.title);
        } else {
            log::warn!("{}: FAIL {}", self.title, check.title);
        }
        self.checks.push(check);
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckReport> {
        self.checks.iter().filter(|check| !check.passed)
    }

    pub fn check(&self, title: &str) -> Option<&CheckReport> {
        self.checks.iter().find(|check| check.title == title)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        for check in &self.checks {
            write!(f, "{}", check)?;
        }
        writeln!(f)?;
        let passed = self.checks.iter().filter(|check| check.passed).count();
        writeln!(
            f,
            "{}: {} of {} checks passed",
            if self.passed() { "PASS" } else { "FAIL" },
            passed,
            self.checks.len()
        )
    }
}
