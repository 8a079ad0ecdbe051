use std::fmt;

/// Result of comparing one key between two sources
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// both references pin the same digest
    Match,
    /// digests differ, or one side has no digest at all
    DifferentHashes,
    /// the key is absent from one of the sources
    Missing,
    /// deliberately excluded from comparison, with the reason why
    Skipped(String),
}

impl Outcome {
    /// Does this outcome leave the check passing?
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Match | Outcome::Skipped(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Match => f.write_str("match"),
            Outcome::DifferentHashes => f.write_str("DIFFERENT HASHES"),
            Outcome::Missing => f.write_str("MISSING"),
            Outcome::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// One line of a check's listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finding {
    /// `key: detail`
    Entry { key: String, detail: String },
    /// a bare array item
    Item(String),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Entry { key, detail } => write!(f, "{}: {}", key, detail),
            Finding::Item(item) => write!(f, "- {}", item),
        }
    }
}

/// Verdict of a single check, with every finding in the check's domain
///
/// A check never stops at the first problem. Its [fmt::Display] output is
/// the full listing, so a failed run shows the complete difference between
/// sources at once:
///
/// ```text
/// FAIL operator images agree with snapshot
///     fulcio-server-image: match
///     rekor-server-image: DIFFERENT HASHES
///     tuf-image: MISSING
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    pub title: String,
    pub passed: bool,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new<S: Into<String>>(title: S) -> Self {
        CheckReport {
            title: title.into(),
            passed: true,
            findings: Vec::new(),
        }
    }

    /// Add a `key: detail` line without changing the verdict
    pub fn entry<K: fmt::Display, D: fmt::Display>(&mut self, key: K, detail: D) {
        self.findings.push(Finding::Entry {
            key: key.to_string(),
            detail: detail.to_string(),
        });
    }

    /// Add an item line without changing the verdict
    pub fn item<S: Into<String>>(&mut self, item: S) {
        self.findings.push(Finding::Item(item.into()));
    }

    /// Add a `key: detail` line and fail the check
    pub fn fail_entry<K: fmt::Display, D: fmt::Display>(&mut self, key: K, detail: D) {
        self.entry(key, detail);
        self.passed = false;
    }

    /// Add an item line and fail the check
    pub fn fail_item<S: Into<String>>(&mut self, item: S) {
        self.item(item);
        self.passed = false;
    }

    /// Record a key comparison, failing unless the outcome is acceptable
    pub fn outcome<K: fmt::Display>(&mut self, key: K, outcome: &Outcome) {
        if outcome.is_ok() {
            self.entry(key, outcome);
        } else {
            self.fail_entry(key, outcome);
        }
    }

    /// Look up the detail recorded for a key
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.findings.iter().find_map(|finding| match finding {
            Finding::Entry { key: k, detail } if k == key => Some(detail.as_str()),
            _ => None,
        })
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.verdict(), self.title)?;
        for finding in &self.findings {
            writeln!(f, "    {}", finding)?;
        }
        Ok(())
    }
}
