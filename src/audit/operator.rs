use crate::{
    audit::AuditReport,
    config::{OperatorProfile, OperatorSource, ProductProfile},
    errors::AuditError,
    image::{extract_digest, ImageKey},
    reconcile::{
        bundle_reference, completeness, defined_once, digest_agreement, digest_uniqueness,
        non_empty, registry_membership, valid_definitions, CheckReport,
    },
    registry::RepositoryList,
    source::{HelmValuesParser, HelpTextParser, SourceMapping, SourceParser},
};

/// What the operator audit reads
#[derive(Clone, Copy, Debug)]
pub struct OperatorInputs<'a> {
    pub snapshot: &'a SourceMapping,
    /// help text or Helm values, depending on the profile
    pub operator: &'a [u8],
    pub repositories: &'a RepositoryList,
    /// cluster service version text from the bundle image, if available
    pub bundle_manifest: Option<&'a str>,
}

/// Checks the images an operator deploys against the snapshot
pub struct OperatorAudit<'a> {
    profile: &'a ProductProfile,
    operator: &'a OperatorProfile,
}

impl<'a> OperatorAudit<'a> {
    pub fn new(profile: &'a ProductProfile) -> Result<Self, AuditError> {
        Ok(OperatorAudit {
            profile,
            operator: profile.operator_profile()?,
        })
    }

    /// The parser for this operator's image declarations
    pub fn parser(&self) -> Box<dyn SourceParser> {
        let other_keys = self.operator.other_image_keys.iter().cloned();
        match self.operator.source {
            OperatorSource::Help => Box::new(HelpTextParser::new(other_keys)),
            OperatorSource::Helm => {
                let parser = HelmValuesParser::new(other_keys);
                if self.operator.strip_suffixes.is_empty() {
                    Box::new(parser)
                } else {
                    Box::new(parser.strip_suffixes(self.operator.strip_suffixes.iter().cloned()))
                }
            }
        }
    }

    pub fn run(&self, inputs: &OperatorInputs<'_>) -> Result<AuditReport, AuditError> {
        let operator = self.operator;
        let image_pattern = operator.image_regex()?;
        let other_pattern = operator.other_image_regex()?;
        let expects_others = !operator.other_image_keys.is_empty();

        let mut report = AuditReport::new(format!("{} operator images", self.profile.name));

        let mut located = CheckReport::new("operator image is in snapshot");
        match inputs.snapshot.get(operator.image_key.as_str()) {
            Some(image) => located.entry(&operator.image_key, image),
            None => located.fail_entry(&operator.image_key, "MISSING"),
        }
        report.push(located);

        let images = self.parser().parse_logged(inputs.operator)?;

        report.push(non_empty("operator declares product images", &images.primary));
        if expects_others {
            report.push(non_empty("operator declares other images", &images.other));
        }
        report.push(defined_once(
            "operator image keys are defined once",
            &images.conflicts,
        ));
        report.push(registry_membership(
            "operator images are listed in the registry",
            &images.primary,
            inputs.repositories,
        ));
        report.push(completeness(
            "operator product image keys are complete",
            &operator.image_keys,
            &images.primary,
        ));
        report.push(valid_definitions(
            "operator product images are valid",
            &images.primary,
            &image_pattern,
        ));
        if expects_others {
            report.push(completeness(
                "operator other image keys are complete",
                &operator.other_image_keys,
                &images.other,
            ));
            report.push(valid_definitions(
                "operator other images are valid",
                &images.other,
                &other_pattern,
            ));
        }
        report.push(digest_agreement(
            "operator images agree with snapshot",
            &operator.image_keys,
            &images.primary,
            inputs.snapshot,
            |key: &str| ImageKey::new(key),
            &[],
        ));
        report.push(digest_uniqueness(
            "operator image digests are unique",
            &images.primary,
        ));

        if let Some(manifest) = inputs.bundle_manifest {
            let title = "operator bundle references the operator";
            let digest = inputs
                .snapshot
                .get(operator.image_key.as_str())
                .and_then(extract_digest);
            report.push(match digest {
                Some(digest) => bundle_reference(title, manifest, &digest),
                None => {
                    let mut check = CheckReport::new(title);
                    check.fail_entry(&operator.image_key, "no digest in snapshot");
                    check
                }
            });
        }

        Ok(report)
    }
}
