use crate::{image::ContentDigest, reconcile::CheckReport};
use regex::Regex;

/// The bundle's cluster service version must reference the operator digest
///
/// The manifest is searched as plain text for a `<field>: <...operator...>@sha256:<hex>`
/// line. Every matching line is listed.
pub fn bundle_reference(title: &str, csv_text: &str, operator: &ContentDigest) -> CheckReport {
    let mut report = CheckReport::new(title);
    let pattern = format!(
        r"(\w+:\s*[\w./-]+operator[\w-]*@sha256:{})",
        regex::escape(operator.hex_str())
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            report.fail_item(format!("bad pattern {}: {}", pattern, err));
            return report;
        }
    };
    for found in re.find_iter(csv_text) {
        report.item(found.as_str());
    }
    if report.findings.is_empty() {
        report.fail_item(format!(
            "no operator image with digest {} in bundle manifest",
            operator.hex_str()
        ));
    }
    report
}

/// The operator and bundle images must be built from the same commit
pub fn git_reference(title: &str, operator_ref: &str, bundle_ref: &str) -> CheckReport {
    let mut report = CheckReport::new(title);
    let operator_ref = operator_ref.trim();
    let bundle_ref = bundle_ref.trim();
    if operator_ref.is_empty() {
        report.fail_entry("operator", "MISSING");
    }
    if bundle_ref.is_empty() {
        report.fail_entry("bundle", "MISSING");
    }
    if report.passed {
        if operator_ref == bundle_ref {
            report.entry("vcs-ref", operator_ref);
        } else {
            report.fail_entry("operator", operator_ref);
            report.fail_entry("bundle", bundle_ref);
        }
    }
    report
}

/// Two copies of the same artifact must have the same content
///
/// Used for binaries that are served from one image and shipped inside
/// another.
pub fn artifact_checksums(title: &str, name: &str, served: &[u8], shipped: &[u8]) -> CheckReport {
    let mut report = CheckReport::new(title);
    let served = ContentDigest::from_content(served);
    let shipped = ContentDigest::from_content(shipped);
    if served == shipped {
        report.entry(name, served);
    } else {
        report.fail_entry(name, format!("{} != {}", served, shipped));
    }
    report
}
