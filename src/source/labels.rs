use crate::{errors::ParseError, image::ImageKey, reconcile::ImageLabels, source::SourceKind};
use std::collections::BTreeMap;

/// Read image labels gathered by inspecting the snapshot images
///
/// The document is a JSON object keyed like the snapshot, each value the
/// image's label object:
///
/// ```
/// # use release_audit::source::parse_image_labels;
/// let labels = parse_image_labels(br#"{"tuf-image": {"vcs-ref": "3f9c2e1"}}"#).unwrap();
/// assert_eq!(labels["tuf-image"]["vcs-ref"], "3f9c2e1");
/// ```
pub fn parse_image_labels(input: &[u8]) -> Result<BTreeMap<ImageKey, ImageLabels>, ParseError> {
    let labels: BTreeMap<ImageKey, ImageLabels> =
        serde_json::from_slice(input).map_err(|err| ParseError::Json {
            source_kind: SourceKind::ImageLabels,
            err,
        })?;
    log::info!("labels for {} images", labels.len());
    Ok(labels)
}
