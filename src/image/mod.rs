//! Container image references and image identity

// Comparison, hashing, and formatting for string-backed value types all
// follow the serialized form, so they share one implementation.
macro_rules! serialized_value_impls {
    ($ty:ty, $parse:path) => {
        impl Eq for $ty {}

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.serialized.eq(&other.serialized)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::errors::ImageError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $parse(s)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self)
            }
        }

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.serialized, state);
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.serialized.cmp(&other.serialized)
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
    };
}


mod digest;
mod key;
mod tag;
mod version;

pub use digest::{extract_digest, ContentDigest, DIGEST_MARKER, SHA256_HEX_LEN};
pub use key::{canonicalize, is_snapshot_image_key, ImageKey, ANSIBLE_KEY_PREFIX};
pub use tag::Tag;
pub use version::ImageVersion;
