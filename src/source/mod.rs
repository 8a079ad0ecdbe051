//! Parsers that turn raw release sources into image mappings
//!
//! Every format the release is described in gets one [SourceParser]
//! implementation. They all produce the same [SplitMapping], so the
//! reconciliation checks never need to know where a mapping came from.


mod ansible;
mod constants;
mod help;
mod helm;
mod labels;
mod mapping;
mod snapshot;

pub use ansible::AnsibleDefaultsParser;
pub use constants::ConstantsParser;
pub use help::HelpTextParser;
pub use helm::HelmValuesParser;
pub use labels::parse_image_labels;
pub use mapping::{KeyConflict, SourceMapping, SplitMapping};
pub use snapshot::{SnapshotParser, ANSIBLE_COLLECTION_KEY};

use crate::errors::ParseError;
use std::{fmt, str};

/// Which kind of document a payload came from
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SourceKind {
    Snapshot,
    OperatorHelp,
    AnsibleDefaults,
    HelmValues,
    Constants,
    Catalog,
    Repositories,
    ImageLabels,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Snapshot => "snapshot",
            SourceKind::OperatorHelp => "operator help text",
            SourceKind::AnsibleDefaults => "ansible defaults",
            SourceKind::HelmValues => "helm values",
            SourceKind::Constants => "image constants",
            SourceKind::Catalog => "file-based catalog",
            SourceKind::Repositories => "repositories list",
            SourceKind::ImageLabels => "image labels",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw source format
pub trait SourceParser {
    /// The kind of document this parser reads, used to label errors
    fn kind(&self) -> SourceKind;

    /// Extract the image mapping from a raw payload
    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError>;

    /// Parse and log what was found
    fn parse_logged(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        let mapping = self.parse(input)?;
        mapping
            .primary
            .log(&format!("{} images", self.kind()));
        if !mapping.other.is_empty() {
            mapping.other.log(&format!("{} other entries", self.kind()));
        }
        Ok(mapping)
    }
}

pub(crate) fn text(source_kind: SourceKind, input: &[u8]) -> Result<&str, ParseError> {
    str::from_utf8(input).map_err(|err| ParseError::Utf8 { source_kind, err })
}
