use crate::{
    audit::AuditReport,
    config::{AnsibleProfile, ProductProfile},
    errors::AuditError,
    image::canonicalize,
    reconcile::{
        completeness, digest_agreement, digest_uniqueness, non_empty, registry_membership,
        valid_definitions,
    },
    registry::RepositoryList,
    source::{AnsibleDefaultsParser, SourceMapping, SourceParser},
};

/// Checks the Ansible collection defaults against the snapshot
///
/// Ansible keys are compared under their canonical names, and the profile's
/// skip rules are applied to the digest comparison.
pub struct AnsibleAudit<'a> {
    profile: &'a ProductProfile,
    ansible: &'a AnsibleProfile,
}

impl<'a> AnsibleAudit<'a> {
    pub fn new(profile: &'a ProductProfile) -> Result<Self, AuditError> {
        Ok(AnsibleAudit {
            profile,
            ansible: profile.ansible_profile()?,
        })
    }

    pub fn parser(&self) -> AnsibleDefaultsParser {
        AnsibleDefaultsParser::new(self.ansible.image_keys.iter().cloned())
    }

    pub fn run(
        &self,
        snapshot: &SourceMapping,
        defaults: &[u8],
        repositories: &RepositoryList,
    ) -> Result<AuditReport, AuditError> {
        let ansible = self.ansible;
        let image_pattern = ansible.image_regex()?;
        let other_pattern = ansible.other_image_regex()?;
        let images = self.parser().parse_logged(defaults)?;

        let mut report = AuditReport::new(format!("{} ansible images", self.profile.name));
        report.push(non_empty("ansible declares product images", &images.primary));
        if !ansible.other_image_keys.is_empty() {
            report.push(non_empty("ansible declares other images", &images.other));
        }
        report.push(registry_membership(
            "ansible images are listed in the registry",
            &images.primary,
            repositories,
        ));
        report.push(completeness(
            "ansible product image keys are complete",
            &ansible.image_keys,
            &images.primary,
        ));
        report.push(valid_definitions(
            "ansible product images are valid",
            &images.primary,
            &image_pattern,
        ));
        if !ansible.other_image_keys.is_empty() {
            report.push(completeness(
                "ansible other image keys are complete",
                &ansible.other_image_keys,
                &images.other,
            ));
            report.push(valid_definitions(
                "ansible other images are valid",
                &images.other,
                &other_pattern,
            ));
        }
        report.push(digest_agreement(
            "ansible images agree with snapshot",
            &ansible.image_keys,
            &images.primary,
            snapshot,
            canonicalize,
            &ansible.skips,
        ));
        report.push(digest_uniqueness(
            "ansible image digests are unique",
            &images.primary,
        ));
        Ok(report)
    }
}
