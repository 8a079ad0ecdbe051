use crate::{reconcile::CheckReport, registry::RepositoryList, source::SourceMapping};

/// Every image must belong to a published repository
///
/// All misses are gathered into the one report.
pub fn registry_membership(
    title: &str,
    mapping: &SourceMapping,
    repositories: &RepositoryList,
) -> CheckReport {
    let mut report = CheckReport::new(title);
    for (key, image) in mapping {
        match repositories.find_by_image(image) {
            None => report.fail_entry(key, format!("not found in registry: {}", image)),
            Some(record) if !record.published => {
                report.fail_entry(key, format!("repository {} is not published", record.name))
            }
            Some(_) => {}
        }
    }
    if report.passed {
        report.item(format!("{} images found in registry", mapping.len()));
    }
    report
}
