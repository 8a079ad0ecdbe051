use crate::{
    errors::ImageError,
    image::{ContentDigest, Tag, SHA256_HEX_LEN},
};
use std::{fmt, str::FromStr};

/// Either an image tag or a content digest
///
/// Helm values and similar sources write the version of an image separately
/// from its repository. The version may be a full `sha256:<hex>` digest, a
/// bare 64 digit hex string, or an ordinary tag.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ImageVersion {
    Tag(Tag),
    ContentDigest(ContentDigest),
}

impl ImageVersion {
    pub fn as_str(&self) -> &str {
        match self {
            ImageVersion::Tag(tag) => tag.as_str(),
            ImageVersion::ContentDigest(content_digest) => content_digest.as_str(),
        }
    }

    /// Parse a [prim@str] as an [ImageVersion]
    ///
    /// ```
    /// # use release_audit::image::ImageVersion;
    /// let hex = "c".repeat(64);
    /// assert!(ImageVersion::parse(&hex).unwrap().is_content_digest());
    /// assert!(ImageVersion::parse(&format!("sha256:{}", hex)).unwrap().is_content_digest());
    /// assert!(ImageVersion::parse("v1.2.0").unwrap().is_tag());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ImageError> {
        if s.contains(':') {
            Ok(ImageVersion::ContentDigest(ContentDigest::parse(s)?))
        } else if s.len() == SHA256_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(ImageVersion::ContentDigest(ContentDigest::from_parts(
                "sha256",
                &s.to_ascii_lowercase(),
            )?))
        } else {
            Ok(ImageVersion::Tag(Tag::parse(s)?))
        }
    }

    /// Text to append to a repository to reference this version
    ///
    /// Digests are joined with `@`, tags with `:`.
    pub fn reference_suffix(&self) -> String {
        match self {
            ImageVersion::Tag(tag) => format!(":{}", tag),
            ImageVersion::ContentDigest(digest) => format!("@{}", digest),
        }
    }

    pub fn is_content_digest(&self) -> bool {
        matches!(self, ImageVersion::ContentDigest(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, ImageVersion::Tag(_))
    }
}

impl FromStr for ImageVersion {
    type Err = ImageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageVersion::parse(s)
    }
}

impl fmt::Display for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
