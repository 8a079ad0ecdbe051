use crate::{
    catalog::Catalog,
    config::CatalogExpectations,
    image::{ContentDigest, DIGEST_MARKER},
    reconcile::CheckReport,
};

/// Verify one file-based catalog against the product's expectations
///
/// `bundle_digest` is the digest of the operator bundle image taken from
/// the snapshot. At least one bundle in the catalog must reference the
/// expected bundle repository pinned to exactly that digest.
pub fn catalog_contents(
    title: &str,
    catalog: &Catalog,
    expect: &CatalogExpectations,
    bundle_digest: Option<&ContentDigest>,
) -> CheckReport {
    let mut report = CheckReport::new(title);

    if catalog.packages.is_empty() {
        report.fail_item("no olm.package documents");
    }
    if catalog.channels.is_empty() {
        report.fail_item("no olm.channel documents");
    }
    if catalog.bundles.is_empty() {
        report.fail_item("no olm.bundle documents");
    }

    for package in &catalog.packages {
        if package.name != expect.olm_package {
            report.fail_entry(
                format!("package {}", package.name),
                format!("expected {}", expect.olm_package),
            );
        }
        if package.default_channel != expect.default_channel {
            report.fail_entry(
                format!("package {} default channel", package.name),
                format!("{:?}, expected {:?}", package.default_channel, expect.default_channel),
            );
        }
    }

    if catalog.channels.len() != expect.expected_channels.len() {
        report.fail_item(format!(
            "found {} channels, expected {}",
            catalog.channels.len(),
            expect.expected_channels.len()
        ));
    }
    for channel in &catalog.channels {
        if !expect.expected_channels.contains(&channel.name) {
            report.fail_entry(format!("channel {}", channel.name), "UNEXPECTED");
        }
        if channel.package != expect.olm_package {
            report.fail_entry(
                format!("channel {}", channel.name),
                format!("package {}, expected {}", channel.package, expect.olm_package),
            );
        }
    }
    for name in &expect.expected_channels {
        if !catalog.channels.iter().any(|channel| &channel.name == name) {
            report.fail_entry(format!("channel {}", name), "MISSING");
        }
    }

    for bundle in &catalog.bundles {
        if bundle.package != expect.olm_package {
            report.fail_entry(
                format!("bundle {}", bundle.name),
                format!("package {}, expected {}", bundle.package, expect.olm_package),
            );
        }
    }
    match bundle_digest {
        None => report.fail_entry(
            format!("{}-bundle-image", expect.olm_package),
            "no digest in snapshot",
        ),
        Some(digest) => {
            let wanted = format!(
                "{}{}{}",
                expect.operator_bundle_image,
                DIGEST_MARKER,
                digest.hex_str()
            );
            match catalog.bundles.iter().find(|bundle| bundle.image == wanted) {
                Some(bundle) => report.entry(format!("bundle {}", bundle.name), "match"),
                None => report.fail_entry(wanted, "no olm.bundle with this image"),
            }
        }
    }

    if !expect.expected_deprecations.is_empty() {
        let entries: Vec<&str> = catalog
            .deprecation_entries()
            .map(|entry| entry.reference.name.as_str())
            .collect();
        if entries.len() != expect.expected_deprecations.len() {
            report.fail_item(format!(
                "found {} deprecation entries, expected {}",
                entries.len(),
                expect.expected_deprecations.len()
            ));
        }
        for name in entries {
            if !expect.expected_deprecations.iter().any(|expected| expected == name) {
                report.fail_entry(format!("deprecation {:?}", name), "UNEXPECTED");
            }
        }
    }

    report
}
