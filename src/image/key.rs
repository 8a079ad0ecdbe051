use regex::Regex;
use std::{borrow::Borrow, fmt};

/// Prefix shared by every image variable in the Ansible collection defaults
pub const ANSIBLE_KEY_PREFIX: &str = "tas_single_node_";

/// Logical identifier for "which image is this", shared across sources
///
/// Each source has its own naming convention. Snapshot and operator keys
/// already use the canonical `<component>-image` form; other sources are
/// rewritten with [canonicalize] or [ImageKey::from_identifier] before they
/// are compared against the snapshot.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageKey(String);

impl ImageKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        ImageKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a canonical key from a source code identifier
    ///
    /// CamelCase and snake_case identifiers are both split into lowercase
    /// words joined by hyphens, so `RekorServerImage`, `rekor_server_image`
    /// and `REKOR_SERVER_IMAGE` all become `rekor-server-image`. Runs of
    /// capitals are treated as one word (`CTLogImage` is `ct-log-image`).
    pub fn from_identifier(identifier: &str) -> Self {
        let mut words: Vec<String> = Vec::new();
        for part in identifier.split('_').filter(|part| !part.is_empty()) {
            let chars: Vec<char> = part.chars().collect();
            let mut word = String::new();
            for (i, c) in chars.iter().enumerate() {
                let starts_word = i > 0
                    && c.is_uppercase()
                    && (!chars[i - 1].is_uppercase()
                        || chars.get(i + 1).map_or(false, |next| next.is_lowercase()));
                if starts_word && !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
                word.extend(c.to_lowercase());
            }
            if !word.is_empty() {
                words.push(word);
            }
        }
        ImageKey(words.join("-"))
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Borrow<str> for ImageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageKey {
    fn from(key: &str) -> Self {
        ImageKey::new(key)
    }
}

impl From<String> for ImageKey {
    fn from(key: String) -> Self {
        ImageKey(key)
    }
}

/// Translate a source-specific key into the canonical key space
///
/// Ansible keys of the form `tas_single_node_<component>_image` lose their
/// prefix and have every underscore replaced by a hyphen, which leaves the
/// canonical `<component>-image`. Any other key passes through unchanged.
///
/// ```
/// # use release_audit::image::canonicalize;
/// assert_eq!(canonicalize("tas_single_node_rekor_server_image").as_str(), "rekor-server-image");
/// assert_eq!(canonicalize("rekor-server-image").as_str(), "rekor-server-image");
/// ```
pub fn canonicalize(source_key: &str) -> ImageKey {
    match source_key.strip_prefix(ANSIBLE_KEY_PREFIX) {
        Some(rest) => ImageKey(rest.replace('_', "-")),
        None => ImageKey::new(source_key),
    }
}

/// Does a snapshot key name an image definition?
///
/// The snapshot publisher guarantees that image leaves are keyed as
/// `fbc-<suffix>`, `pco-fbc-<suffix>`, or `<name>-image`.
pub fn is_snapshot_image_key(key: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^(fbc-[\w-]+|pco-fbc-[\w-]+|[\w-]+-image)$").unwrap();
    }
    RE.is_match(key)
}
