use crate::{
    errors::ParseError,
    image::ImageKey,
    source::{text, SourceKind, SourceParser, SplitMapping},
};
use regex::Regex;

/// Reads the `-h` output of an operator binary
///
/// The operator declares each image it deploys as a string flag with a
/// default value, which the flag library prints as
///
/// ```text
///   -rekor-server-image string
///         The image used for rekor server (default "registry.redhat.io/...")
/// ```
///
/// Flags named in `other_keys` are helper images that do not belong to the
/// product and are returned in [SplitMapping::other].
#[derive(Clone, Debug, Default)]
pub struct HelpTextParser {
    other_keys: Vec<ImageKey>,
}

impl HelpTextParser {
    pub fn new<I, K>(other_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ImageKey>,
    {
        HelpTextParser {
            other_keys: other_keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceParser for HelpTextParser {
    fn kind(&self) -> SourceKind {
        SourceKind::OperatorHelp
    }

    /// Zero matching flags is not an error here; the caller decides whether
    /// an empty mapping is acceptable.
    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        lazy_static! {
            static ref RE: Regex = Regex::new(r#"-([\w-]+image)\s+string[^"]+default "([^"]+)""#).unwrap();
        }
        let help = text(self.kind(), input)?;
        let mut found = SplitMapping::default();
        for captures in RE.captures_iter(help) {
            let key = ImageKey::new(&captures[1]);
            let image = captures[2].to_owned();
            if self.other_keys.contains(&key) {
                found.add_other(self.kind(), key, image);
            } else {
                found.add_primary(self.kind(), key, image);
            }
        }
        if found.primary.is_empty() && found.other.is_empty() {
            log::warn!("no image flags found in operator help text");
        }
        Ok(found)
    }
}
