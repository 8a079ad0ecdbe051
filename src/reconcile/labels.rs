use crate::{image::ImageKey, reconcile::CheckReport};
use std::collections::BTreeMap;

/// Labels read from one image's configuration
pub type ImageLabels = BTreeMap<String, String>;

/// Every image must carry the required labels
///
/// `required` maps a label name to its expected value. An empty expected
/// value only requires the label to be present and non-empty. Problems are
/// gathered for every image before the check fails, one `<key> <label>`
/// entry each.
pub fn image_labels(
    title: &str,
    labels: &BTreeMap<ImageKey, ImageLabels>,
    required: &BTreeMap<String, String>,
) -> CheckReport {
    let mut report = CheckReport::new(title);
    for (key, image_labels) in labels {
        for (label, expected) in required {
            let entry = format!("{} {}", key, label);
            match image_labels.get(label).map(|value| value.trim()) {
                None | Some("") => report.fail_entry(entry, "missing"),
                Some(value) if !expected.is_empty() && value != expected => {
                    report.fail_entry(entry, format!("{:?}, expected {:?}", value, expected))
                }
                Some(_) => {}
            }
        }
    }
    if report.passed {
        report.item(format!(
            "{} images carry {} required labels",
            labels.len(),
            required.len()
        ));
    }
    report
}
