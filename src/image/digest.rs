use crate::errors::ImageError;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::ops::Range;

/// Literal text separating a repository from a pinned sha256 digest
pub const DIGEST_MARKER: &str = "@sha256:";

/// Number of hex digits in a sha256 digest
pub const SHA256_HEX_LEN: usize = 64;

static SHA256_FORMAT: &str = "sha256";

/// A digest securely identifies the specific contents of an image
///
/// Release images are always pinned by `sha256`, so this only accepts that
/// format, followed by exactly 64 lowercase hexadecimal digits.
#[derive(Clone)]
pub struct ContentDigest {
    serialized: String,
    format_pos: Range<usize>,
    hex_pos: Range<usize>,
}

serialized_value_impls!(ContentDigest, ContentDigest::parse);

impl ContentDigest {
    /// Returns a reference to the existing string representation of a
    /// [ContentDigest]
    ///
    /// This is always `sha256:` followed by 64 lowercase hex digits.
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    /// Create a new ContentDigest from parts
    ///
    /// The format string and hex string are assembled and parsed.
    pub fn from_parts(format_part: &str, hex_part: &str) -> Result<Self, ImageError> {
        if format_part != SHA256_FORMAT {
            return Err(ImageError::UnsupportedDigestFormat(format_part.to_owned()));
        }
        ContentDigest::parse(&format!("{}:{}", format_part, hex_part))
    }

    /// Create a new ContentDigest by hashing content data
    ///
    /// ```
    /// # use release_audit::image::ContentDigest;
    /// let digest = ContentDigest::from_content(b"cat");
    /// assert_eq!(digest.as_str(), "sha256:77af778b51abd4a3c51c5ddd97204a9c3ae614ebccb75a606c3b6865aed6744e");
    /// ```
    pub fn from_content(content_bytes: &[u8]) -> Self {
        let hex = format!("{:x}", Sha256::digest(content_bytes));
        let serialized = format!("{}:{}", SHA256_FORMAT, hex);
        ContentDigest {
            format_pos: 0..SHA256_FORMAT.len(),
            hex_pos: SHA256_FORMAT.len() + 1..serialized.len(),
            serialized,
        }
    }

    /// Parse a [prim@str] as a [ContentDigest]
    ///
    /// ```
    /// # use release_audit::image::ContentDigest;
    /// let hex = "a".repeat(64);
    /// let digest = ContentDigest::parse(&format!("sha256:{}", hex)).unwrap();
    /// assert_eq!(digest.format_str(), "sha256");
    /// assert_eq!(digest.hex_str(), hex);
    /// ```
    pub fn parse(s: &str) -> Result<Self, ImageError> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(&format!("^{}$", ContentDigest::regex_str(),)).unwrap();
        }
        match RE.captures(s) {
            None => Err(ImageError::InvalidDigestFormat(s.to_owned())),
            Some(captures) => match (captures.name("dig_f"), captures.name("dig_h")) {
                (Some(format), Some(hex)) => Ok(ContentDigest {
                    serialized: s.to_owned(),
                    format_pos: format.range(),
                    hex_pos: hex.range(),
                }),
                _ => Err(ImageError::InvalidDigestFormat(s.to_owned())),
            },
        }
    }

    /// Return a reference to the format string portion of this digest.
    pub fn format_str(&self) -> &str {
        &self.serialized[self.format_pos.clone()]
    }

    /// Return a reference to the hexadecimal string portion of this digest.
    ///
    /// This is guaranteed to be exactly 64 lowercase hex digits.
    pub fn hex_str(&self) -> &str {
        &self.serialized[self.hex_pos.clone()]
    }

    pub(crate) fn regex_str() -> &'static str {
        concat!(
            "(?P<dig>", // digest group
            /*  */ "(?P<dig_f>sha256)", // only sha256 pins are accepted
            /*  */ "[:]",
            /*  */ "(?P<dig_h>[a-f0-9]{64})",
            ")",
        )
    }
}

/// Pull the pinned digest out of an image reference
///
/// Looks for the literal `@sha256:` marker and takes the 64 characters
/// that follow it. Returns `None` when the marker is absent, when fewer than
/// 64 characters follow, or when those characters are not lowercase hex.
/// Anything after the digest is ignored.
///
/// ```
/// # use release_audit::image::extract_digest;
/// let hex = "0123456789abcdef".repeat(4);
/// let image = format!("registry.redhat.io/rhtas/rekor-server@sha256:{}", hex);
/// assert_eq!(extract_digest(&image).unwrap().hex_str(), hex);
/// assert!(extract_digest("registry.redhat.io/rhtas/rekor-server:1.0").is_none());
/// ```
pub fn extract_digest(reference: &str) -> Option<ContentDigest> {
    let start = reference.find(DIGEST_MARKER)? + DIGEST_MARKER.len();
    let hex = reference.get(start..start + SHA256_HEX_LEN)?;
    ContentDigest::from_parts(SHA256_FORMAT, hex).ok()
}
