//! Known repositories of the registry a release is published to


use crate::{errors::ParseError, source::SourceKind};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One entry from the registry's repository catalog
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RepositoryRecord {
    #[serde(rename = "repository")]
    pub name: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub published: bool,
}

/// The repositories document, `{"data": [...]}`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RepositoryList {
    pub data: Vec<RepositoryRecord>,
}

impl RepositoryList {
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        let list: RepositoryList = serde_json::from_slice(input).map_err(|err| ParseError::Json {
            source_kind: SourceKind::Repositories,
            err,
        })?;
        log::debug!("loaded {} known repositories", list.data.len());
        Ok(list)
    }

    /// Look up the record for an image's repository path
    ///
    /// The reference is split into registry, repository path, and the tag or
    /// digest suffix, and the path must equal a record name exactly. A
    /// reference that can't be split that way is simply not found.
    ///
    /// ```
    /// # use release_audit::registry::{RepositoryList, RepositoryRecord};
    /// let list = RepositoryList {
    ///     data: vec![RepositoryRecord {
    ///         name: "rhtas/rekor-server-rhel9".into(),
    ///         id: "1".into(),
    ///         published: true,
    ///     }],
    /// };
    /// assert!(list.find_by_image("registry.redhat.io/rhtas/rekor-server-rhel9@sha256:abc").is_some());
    /// assert!(list.find_by_image("registry.redhat.io/rhtas/rekor-server@sha256:abc").is_none());
    /// assert!(list.find_by_image("rhtas/rekor-server-rhel9").is_none());
    /// ```
    pub fn find_by_image(&self, reference: &str) -> Option<&RepositoryRecord> {
        lazy_static! {
            static ref RE: Regex = Regex::new(concat!(
                r"^(?P<registry>[\w.\-_]+)/",
                r"(?P<image>[^@:]+)",
                r"(?P<tag>.+)$",
            ))
            .unwrap();
        }
        let captures = RE.captures(reference)?;
        let path = captures.name("image")?.as_str();
        self.data.iter().find(|record| record.name == path)
    }
}
