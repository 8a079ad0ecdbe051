use crate::{
    audit::AuditReport,
    catalog::Catalog,
    config::{CatalogExpectations, ProductProfile},
    errors::AuditError,
    image::extract_digest,
    reconcile::{catalog_contents, CheckReport},
    source::SourceMapping,
};
use std::collections::BTreeMap;

/// Checks every file-based catalog image listed in the snapshot
///
/// Catalog images are the snapshot keys starting with the profile's key
/// prefix. The caller extracts each image's catalog file (found at
/// [CatalogExpectations::catalog_path]) and supplies its raw contents keyed
/// by snapshot key.
pub struct CatalogAudit<'a> {
    profile: &'a ProductProfile,
    expect: &'a CatalogExpectations,
}

impl<'a> CatalogAudit<'a> {
    pub fn new(profile: &'a ProductProfile) -> Result<Self, AuditError> {
        Ok(CatalogAudit {
            profile,
            expect: profile.catalog_expectations()?,
        })
    }

    /// Snapshot entries that name catalog images
    pub fn catalog_images(&self, snapshot: &SourceMapping) -> SourceMapping {
        snapshot.with_key_prefix(&self.expect.image_key_prefix)
    }

    pub fn run(
        &self,
        snapshot: &SourceMapping,
        catalogs: &BTreeMap<String, Vec<u8>>,
    ) -> Result<AuditReport, AuditError> {
        let expect = self.expect;
        let mut report = AuditReport::new(format!("{} file-based catalogs", self.profile.name));

        let images = self.catalog_images(snapshot);
        let mut coverage = CheckReport::new(format!(
            "catalog images with prefix {:?} are supplied",
            expect.image_key_prefix
        ));
        if images.is_empty() {
            coverage.fail_item(format!(
                "no snapshot keys start with {:?}",
                expect.image_key_prefix
            ));
        }
        for key in images.keys() {
            if catalogs.contains_key(key.as_str()) {
                coverage.entry(key, "supplied");
            } else {
                coverage.fail_entry(key, "MISSING");
            }
        }
        for key in catalogs.keys() {
            if !images.contains_key(key) {
                coverage.fail_entry(key, "UNEXPECTED");
            }
        }
        report.push(coverage);

        let bundle_key = expect.bundle_image_key();
        let bundle_digest = snapshot.get(bundle_key.as_str()).and_then(extract_digest);
        if bundle_digest.is_none() {
            log::warn!("{} missing or not pinned in snapshot", bundle_key);
        }

        for (key, contents) in catalogs {
            if !images.contains_key(key) {
                continue;
            }
            log::info!("checking {} from {}", expect.catalog_path, key);
            let catalog = Catalog::parse(contents)?;
            report.push(catalog_contents(
                &format!("{} catalog contents", key),
                &catalog,
                expect,
                bundle_digest.as_ref(),
            ));
        }
        Ok(report)
    }
}
