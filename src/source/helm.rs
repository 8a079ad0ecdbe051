use crate::{
    errors::ParseError,
    image::{ImageKey, ImageVersion},
    source::{text, SourceKind, SourceParser, SplitMapping},
};
use regex::Regex;

/// Reads a Helm values file bundled with an operator
///
/// Images are written as a `repository:` line directly followed by a
/// `version:` line. The version may be a `sha256:` digest, a bare 64 digit
/// hex digest, or a tag, and is joined to the repository accordingly.
///
/// Values files carry no image keys, so the key is derived from the last
/// repository path segment with any configured suffix removed:
/// `registry.redhat.io/rhtas/policy-controller-rhel9` becomes
/// `policy-controller-image`.
#[derive(Clone, Debug)]
pub struct HelmValuesParser {
    other_keys: Vec<ImageKey>,
    strip_suffixes: Vec<String>,
}

impl Default for HelmValuesParser {
    fn default() -> Self {
        HelmValuesParser {
            other_keys: Vec::new(),
            strip_suffixes: vec!["-rhel9".to_owned()],
        }
    }
}

impl HelmValuesParser {
    pub fn new<I, K>(other_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ImageKey>,
    {
        HelmValuesParser {
            other_keys: other_keys.into_iter().map(Into::into).collect(),
            ..HelmValuesParser::default()
        }
    }

    /// Replace the list of suffixes removed from repository names
    pub fn strip_suffixes<I: IntoIterator<Item = String>>(mut self, suffixes: I) -> Self {
        self.strip_suffixes = suffixes.into_iter().collect();
        self
    }

    fn key_for(&self, repository: &str) -> ImageKey {
        let mut name = repository.rsplit('/').next().unwrap_or(repository);
        for suffix in &self.strip_suffixes {
            if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
                name = stripped;
                break;
            }
        }
        ImageKey::new(format!("{}-image", name))
    }
}

/// Join a repository and a separately written version into one reference
fn join_version(repository: &str, version: &str) -> String {
    match ImageVersion::parse(version) {
        Ok(version) => format!("{}{}", repository, version.reference_suffix()),
        Err(_) => format!("{}@{}", repository, version),
    }
}

impl SourceParser for HelmValuesParser {
    fn kind(&self) -> SourceKind {
        SourceKind::HelmValues
    }

    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        lazy_static! {
            static ref RE: Regex = Regex::new(concat!(
                r#"(?m)^[ \t-]*repository:[ \t]*["']?([^\s"']+)["']?[ \t]*\r?\n"#,
                r#"[ \t]*version:[ \t]*["']?([^\s"']+)["']?"#,
            ))
            .unwrap();
        }
        let values = text(self.kind(), input)?;
        let mut found = SplitMapping::default();
        for captures in RE.captures_iter(values) {
            let repository = &captures[1];
            let key = self.key_for(repository);
            let image = join_version(repository, &captures[2]);
            if self.other_keys.contains(&key) {
                found.add_other(self.kind(), key, image);
            } else {
                found.add_primary(self.kind(), key, image);
            }
        }
        Ok(found)
    }
}
