use crate::{
    errors::ParseError,
    image::{is_snapshot_image_key, ImageKey, DIGEST_MARKER},
    source::{SourceKind, SourceParser, SplitMapping},
};
use serde_json::{Map, Value};

/// Key under which the Ansible collection URL is reported in
/// [SplitMapping::other]
pub const ANSIBLE_COLLECTION_KEY: &str = "ansible-collection-url";

/// Snapshot object describing the Ansible collection; it is not an image
const ANSIBLE_COLLECTION_OBJECT: &str = "artifact-signer-ansible";

/// Reads the release snapshot, a JSON tree of arbitrary depth
///
/// Image definitions are recognized by the shape of their key, never by the
/// shape of their value. See [is_snapshot_image_key].
#[derive(Clone, Debug)]
pub struct SnapshotParser {
    value_fallback: bool,
}

impl Default for SnapshotParser {
    fn default() -> Self {
        SnapshotParser {
            value_fallback: true,
        }
    }
}

impl SnapshotParser {
    pub fn new() -> Self {
        SnapshotParser::default()
    }

    /// Disable the value-shape fallback
    ///
    /// Older snapshots were walked by looking for `@sha256:` in values. When
    /// no key matches at all the parser retries that way and logs a warning,
    /// unless this is turned off.
    pub fn without_value_fallback(mut self) -> Self {
        self.value_fallback = false;
        self
    }

    fn walk_keys(object: &Map<String, Value>, found: &mut SplitMapping) {
        for (key, value) in object {
            match value {
                Value::String(image) if is_snapshot_image_key(key) => {
                    found.add_primary(SourceKind::Snapshot, ImageKey::new(key.as_str()), image.clone());
                }
                Value::Object(nested) if key == ANSIBLE_COLLECTION_OBJECT => {
                    let url = nested
                        .get("collection")
                        .and_then(|collection| collection.get("url"))
                        .and_then(Value::as_str);
                    if let Some(url) = url {
                        found.add_other(
                            SourceKind::Snapshot,
                            ImageKey::new(ANSIBLE_COLLECTION_KEY),
                            url.to_owned(),
                        );
                    }
                }
                Value::Object(nested) => Self::walk_keys(nested, found),
                Value::Array(items) => {
                    for nested in items.iter().filter_map(Value::as_object) {
                        Self::walk_keys(nested, found);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_values(object: &Map<String, Value>, found: &mut SplitMapping) {
        for (key, value) in object {
            match value {
                Value::String(image) if image.contains(DIGEST_MARKER) => {
                    found.add_primary(SourceKind::Snapshot, ImageKey::new(key.as_str()), image.clone());
                }
                Value::Object(_) if key == ANSIBLE_COLLECTION_OBJECT => {}
                Value::Object(nested) => Self::walk_values(nested, found),
                Value::Array(items) => {
                    for nested in items.iter().filter_map(Value::as_object) {
                        Self::walk_values(nested, found);
                    }
                }
                _ => {}
            }
        }
    }
}

impl SourceParser for SnapshotParser {
    fn kind(&self) -> SourceKind {
        SourceKind::Snapshot
    }

    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        let document: Value = serde_json::from_slice(input).map_err(|err| ParseError::Json {
            source_kind: self.kind(),
            err,
        })?;
        let root = document
            .as_object()
            .ok_or(ParseError::UnexpectedDocumentShape {
                source_kind: self.kind(),
                expected: "json object",
            })?;

        let mut found = SplitMapping::default();
        Self::walk_keys(root, &mut found);

        if found.primary.is_empty() && self.value_fallback {
            Self::walk_values(root, &mut found);
            if !found.primary.is_empty() {
                log::warn!(
                    "no snapshot keys have the image key shape, fell back to matching {} values ({} found)",
                    DIGEST_MARKER,
                    found.primary.len()
                );
            }
        }
        Ok(found)
    }
}
