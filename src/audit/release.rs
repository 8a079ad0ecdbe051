use crate::{
    audit::AuditReport,
    config::ProductProfile,
    errors::AuditError,
    image::ImageKey,
    reconcile::{
        artifact_checksums, defined_once, digest_uniqueness, git_reference, image_labels,
        non_empty, valid_definitions, ImageLabels,
    },
    source::{KeyConflict, SourceMapping},
};
use std::collections::BTreeMap;

/// Label holding the commit an image was built from
pub const GIT_REFERENCE_LABEL: &str = "vcs-ref";

/// Checks on the snapshot by itself
///
/// The snapshot must list images, every image must be pinned by digest, no
/// key may be defined twice, and no two images may share a digest. When
/// the caller has read the image labels, every image must carry the
/// profile's required labels and the operator and bundle `vcs-ref` labels
/// must agree. Any artifact pairs given must have identical content.
#[derive(Clone, Debug)]
pub struct ReleaseAudit<'a> {
    profile: &'a ProductProfile,
    conflicts: Vec<KeyConflict>,
    labels: Option<BTreeMap<ImageKey, ImageLabels>>,
    git_references: Option<(String, String)>,
    artifacts: Vec<(String, Vec<u8>, Vec<u8>)>,
}

impl<'a> ReleaseAudit<'a> {
    pub fn new(profile: &'a ProductProfile) -> Self {
        ReleaseAudit {
            profile,
            conflicts: Vec::new(),
            labels: None,
            git_references: None,
            artifacts: Vec::new(),
        }
    }

    /// Keys the snapshot parser saw with more than one reference
    pub fn key_conflicts(mut self, conflicts: Vec<KeyConflict>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Labels of each snapshot image, keyed like the snapshot
    ///
    /// Unless [ReleaseAudit::git_references] is also given, the operator and
    /// bundle references are taken from these labels.
    pub fn labels(mut self, labels: BTreeMap<ImageKey, ImageLabels>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Also compare the operator and bundle `vcs-ref` labels
    pub fn git_references<S: Into<String>>(mut self, operator: S, bundle: S) -> Self {
        self.git_references = Some((operator.into(), bundle.into()));
        self
    }

    /// Also compare two copies of one artifact by checksum
    pub fn artifact<S: Into<String>>(mut self, name: S, served: Vec<u8>, shipped: Vec<u8>) -> Self {
        self.artifacts.push((name.into(), served, shipped));
        self
    }

    fn label_references(&self) -> Option<(String, String)> {
        let labels = self.labels.as_ref()?;
        let operator = self.profile.operator.as_ref()?;
        let reference = |key: &ImageKey| {
            labels
                .get(key)
                .and_then(|labels| labels.get(GIT_REFERENCE_LABEL))
                .cloned()
                .unwrap_or_default()
        };
        Some((
            reference(&operator.image_key),
            reference(&operator.bundle_image_key),
        ))
    }

    pub fn run(&self, snapshot: &SourceMapping) -> Result<AuditReport, AuditError> {
        let pattern = self.profile.snapshot_regex()?;
        let mut report = AuditReport::new(format!("{} release snapshot", self.profile.name));
        report.push(non_empty("snapshot lists images", snapshot));
        report.push(valid_definitions(
            "snapshot images are pinned by digest",
            snapshot,
            &pattern,
        ));
        report.push(defined_once("snapshot keys are defined once", &self.conflicts));
        report.push(digest_uniqueness("snapshot digests are unique", snapshot));

        if let Some(labels) = &self.labels {
            for key in labels.keys().filter(|key| !snapshot.contains_key(key.as_str())) {
                log::warn!("labels given for {}, which is not in the snapshot", key);
            }
            // an image nobody inspected has no labels at all
            let every_image: BTreeMap<ImageKey, ImageLabels> = snapshot
                .keys()
                .map(|key| (key.clone(), labels.get(key).cloned().unwrap_or_default()))
                .collect();
            report.push(image_labels(
                "snapshot images have the required labels",
                &every_image,
                &self.profile.required_labels,
            ));
        }

        if let Some((operator, bundle)) = self
            .git_references
            .clone()
            .or_else(|| self.label_references())
        {
            report.push(git_reference(
                "operator and bundle share a git reference",
                &operator,
                &bundle,
            ));
        }
        for (name, served, shipped) in &self.artifacts {
            report.push(artifact_checksums(
                &format!("{} checksums agree", name),
                name,
                served,
                shipped,
            ));
        }
        Ok(report)
    }
}
