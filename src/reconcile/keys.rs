use crate::{
    image::ImageKey,
    reconcile::CheckReport,
    source::{KeyConflict, SourceMapping},
};
use regex::Regex;

/// The mapping's key set must be exactly the mandatory set
///
/// Both conditions are checked: every mandatory key is present, and the
/// mapping has no more entries than the mandatory set. Missing keys are
/// listed as `MISSING` and extra keys as `UNEXPECTED`.
pub fn completeness(title: &str, mandatory: &[ImageKey], mapping: &SourceMapping) -> CheckReport {
    let mut report = CheckReport::new(title);
    for key in mandatory {
        if !mapping.contains_key(key.as_str()) {
            report.fail_entry(key, "MISSING");
        }
    }
    for key in mapping.keys() {
        if !mandatory.contains(key) {
            report.fail_entry(key, "UNEXPECTED");
        }
    }
    if mapping.len() != mandatory.len() {
        report.fail_item(format!(
            "found {} keys, expected {}",
            mapping.len(),
            mandatory.len()
        ));
    }
    if report.passed {
        report.item(format!("all {} keys present", mandatory.len()));
    }
    report
}

/// A source must declare at least one image
pub fn non_empty(title: &str, mapping: &SourceMapping) -> CheckReport {
    let mut report = CheckReport::new(title);
    if mapping.is_empty() {
        report.fail_item("no images found");
    } else {
        report.item(format!("{} images", mapping.len()));
    }
    report
}

/// Every value must match the expected image definition pattern
pub fn valid_definitions(title: &str, mapping: &SourceMapping, pattern: &Regex) -> CheckReport {
    let mut report = CheckReport::new(title);
    for (key, image) in mapping {
        if !pattern.is_match(image) {
            report.fail_entry(key, format!("{:?} does not match {}", image, pattern));
        }
    }
    if report.passed {
        report.item(format!("{} definitions match {}", mapping.len(), pattern));
    }
    report
}

/// No key may have been given two different references
///
/// Parsers keep the first reference for a key and hand back the others as
/// conflicts; each one fails this check.
pub fn defined_once(title: &str, conflicts: &[KeyConflict]) -> CheckReport {
    let mut report = CheckReport::new(title);
    for conflict in conflicts {
        report.fail_entry(&conflict.key, conflict);
    }
    if report.passed {
        report.item("no key is defined twice");
    }
    report
}
