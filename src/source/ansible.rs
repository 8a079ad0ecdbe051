use crate::{
    errors::ParseError,
    image::ImageKey,
    source::{SourceKind, SourceParser, SplitMapping},
};
use serde_yaml::Value;

/// Reads the defaults file of the Ansible collection
///
/// Only top level string values whose key ends in `image` are kept. Keys
/// listed in `product_keys` make up [SplitMapping::primary]; every other
/// image variable lands in [SplitMapping::other]. Keys stay in the Ansible
/// naming convention; see [crate::image::canonicalize].
#[derive(Clone, Debug, Default)]
pub struct AnsibleDefaultsParser {
    product_keys: Vec<ImageKey>,
}

impl AnsibleDefaultsParser {
    pub fn new<I, K>(product_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ImageKey>,
    {
        AnsibleDefaultsParser {
            product_keys: product_keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceParser for AnsibleDefaultsParser {
    fn kind(&self) -> SourceKind {
        SourceKind::AnsibleDefaults
    }

    fn parse(&self, input: &[u8]) -> Result<SplitMapping, ParseError> {
        let document: Value = serde_yaml::from_slice(input).map_err(|err| ParseError::Yaml {
            source_kind: self.kind(),
            err,
        })?;
        let mut found = SplitMapping::default();
        let variables = match document {
            Value::Null => return Ok(found),
            Value::Mapping(variables) => variables,
            _ => {
                return Err(ParseError::UnexpectedDocumentShape {
                    source_kind: self.kind(),
                    expected: "yaml mapping",
                })
            }
        };
        for (key, value) in variables {
            if let (Value::String(key), Value::String(image)) = (key, value) {
                if !key.ends_with("image") {
                    continue;
                }
                let key = ImageKey::new(key);
                if self.product_keys.contains(&key) {
                    found.primary.insert(key, image);
                } else {
                    found.other.insert(key, image);
                }
            }
        }
        Ok(found)
    }
}
