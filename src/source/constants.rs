use crate::{
    errors::ParseError,
    image::ImageKey,
    source::{text, SourceKind, SourceParser, SplitMapping},
};
use regex::Regex;

/// Scans source code text for image constants
///
/// Matches `Name = "value"` and `Name := "value"` assignments and keeps the
/// ones whose identifier ends in `image` (in any case). Identifiers are
/// turned into canonical keys with [ImageKey::from_identifier]. The source is
/// treated as plain text, so this is a weaker check than the operator's own
/// help output.
#[derive(Clone, Debug, Default)]
pub struct ConstantsParser;

impl ConstantsParser {
    pub fn new() -> Self {
        ConstantsParser
    }
}

impl SourceParser for ConstantsParser {
    fn kind(&self) -> SourceKind {
        SourceKind::Constants
    }

    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        lazy_static! {
            static ref RE: Regex = Regex::new(r#"(\w+)\s*:?=\s*"([^"]+)""#).unwrap();
        }
        let source = text(self.kind(), input)?;
        let mut found = SplitMapping::default();
        for captures in RE.captures_iter(source) {
            let identifier = &captures[1];
            if !identifier.to_ascii_lowercase().ends_with("image") {
                continue;
            }
            found.add_primary(
                self.kind(),
                ImageKey::from_identifier(identifier),
                captures[2].to_owned(),
            );
        }
        Ok(found)
    }
}
