//! Per-product expectations: key sets, patterns, skips, and catalog contents
//!
//! Each product ships a built-in descriptor. A test configuration document
//! can override any field of any section; fields it leaves out keep their
//! built-in values.


use crate::{errors::ConfigError, image::ImageKey, reconcile::SkipRule};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Environment variable naming the snapshot file
pub const ENV_SNAPSHOT: &str = "SNAPSHOT";
/// Environment variable naming the repositories file
pub const ENV_REPOSITORIES: &str = "REPOSITORIES";
/// Environment variable naming the test configuration file
pub const ENV_TEST_CONFIG: &str = "TEST_CONFIG";

const BUILTIN_PROFILES: &[(&str, &str)] = &[
    ("rhtas", include_str!("../../profiles/rhtas.yaml")),
    ("policy-controller", include_str!("../../profiles/policy-controller.yaml")),
    ("model-validation", include_str!("../../profiles/model-validation.yaml")),
];

const SECTIONS: &[&str] = &["operator", "ansible", "fbc"];

/// Names of the products with a built-in profile
pub fn builtin_products() -> impl Iterator<Item = &'static str> {
    BUILTIN_PROFILES.iter().map(|(name, _)| *name)
}

fn default_snapshot_pattern() -> String {
    r"\S\w+@sha256:\w{64}$".to_owned()
}

fn default_other_pattern() -> String {
    r"^[\w./-]+(@sha256:\w{64}|:[\w.-]+)$".to_owned()
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern {
        pattern: pattern.to_owned(),
        err,
    })
}

/// Where the operator declares its images
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorSource {
    /// string flags in the `-h` output of the operator binary
    Help,
    /// a Helm values file bundled inside the operator image
    Helm,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorProfile {
    /// snapshot key of the operator image itself
    pub image_key: ImageKey,
    /// snapshot key of the operator bundle image
    pub bundle_image_key: ImageKey,
    pub source: OperatorSource,
    pub image_keys: Vec<ImageKey>,
    #[serde(default)]
    pub other_image_keys: Vec<ImageKey>,
    pub image_pattern: String,
    #[serde(default = "default_other_pattern")]
    pub other_image_pattern: String,
    #[serde(default)]
    pub strip_suffixes: Vec<String>,
}

impl OperatorProfile {
    pub fn image_regex(&self) -> Result<Regex, ConfigError> {
        compile(&self.image_pattern)
    }

    pub fn other_image_regex(&self) -> Result<Regex, ConfigError> {
        compile(&self.other_image_pattern)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsibleProfile {
    pub image_keys: Vec<ImageKey>,
    #[serde(default)]
    pub other_image_keys: Vec<ImageKey>,
    pub image_pattern: String,
    #[serde(default = "default_other_pattern")]
    pub other_image_pattern: String,
    #[serde(default)]
    pub skips: Vec<SkipRule>,
}

impl AnsibleProfile {
    pub fn image_regex(&self) -> Result<Regex, ConfigError> {
        compile(&self.image_pattern)
    }

    pub fn other_image_regex(&self) -> Result<Regex, ConfigError> {
        compile(&self.other_image_pattern)
    }
}

/// What a product's file-based catalog must contain
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExpectations {
    pub olm_package: String,
    pub operator_bundle_image: String,
    pub catalog_path: String,
    pub image_key_prefix: String,
    pub default_channel: String,
    pub expected_channels: Vec<String>,
    #[serde(default)]
    pub expected_deprecations: Vec<String>,
}

impl CatalogExpectations {
    /// Snapshot key of the bundle image for this package
    pub fn bundle_image_key(&self) -> ImageKey {
        ImageKey::new(format!("{}-bundle-image", self.olm_package))
    }
}

/// Everything the audits need to know about one product
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProfile {
    pub name: String,
    #[serde(default = "default_snapshot_pattern")]
    pub snapshot_pattern: String,
    #[serde(default)]
    pub operator: Option<OperatorProfile>,
    #[serde(default)]
    pub ansible: Option<AnsibleProfile>,
    #[serde(default)]
    pub fbc: Option<CatalogExpectations>,
    /// Labels every snapshot image must carry; an empty value means any
    /// non-empty value
    #[serde(default)]
    pub required_labels: BTreeMap<String, String>,
}

impl ProductProfile {
    /// Decode a profile descriptor; `document` names it in errors
    pub fn from_yaml(document: &str, text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|err| ConfigError::Yaml {
            document: document.to_owned(),
            err,
        })
    }

    /// The built-in profile for a product
    pub fn builtin(product: &str) -> Result<Self, ConfigError> {
        let (name, text) = BUILTIN_PROFILES
            .iter()
            .find(|(name, _)| *name == product)
            .ok_or_else(|| ConfigError::UnknownProduct(product.to_owned()))?;
        ProductProfile::from_yaml(&format!("built-in profile {}", name), text)
    }

    /// The built-in profile with any overrides from a test configuration
    pub fn load(product: &str, test_config: Option<&TestConfig>) -> Result<Self, ConfigError> {
        let profile = ProductProfile::builtin(product)?;
        match test_config {
            Some(test_config) => profile.with_overrides(test_config),
            None => Ok(profile),
        }
    }

    /// Apply the test configuration sections for this product
    ///
    /// Each field present in an override section replaces the built-in
    /// value; absent, null, and empty string fields fall back to it. A
    /// section the built-in profile lacks must be given in full.
    pub fn with_overrides(self, test_config: &TestConfig) -> Result<Self, ConfigError> {
        let sections = match test_config.product(&self.name) {
            Some(sections) => sections,
            None => return Ok(self),
        };
        let document = format!("test config for {}", self.name);
        let mut merged = serde_yaml::to_value(&self).map_err(|err| ConfigError::Yaml {
            document: document.clone(),
            err,
        })?;
        if let Value::Mapping(profile) = &mut merged {
            for section in SECTIONS {
                if let Some(Value::Mapping(user)) = sections.get(*section) {
                    log::info!("{}: overriding {} section", document, section);
                    let key = Value::String((*section).to_owned());
                    let base = match profile.remove(&key) {
                        Some(Value::Mapping(base)) => base,
                        _ => Mapping::new(),
                    };
                    profile.insert(key, Value::Mapping(overlay(base, user)));
                }
            }
        }
        serde_yaml::from_value(merged).map_err(|err| ConfigError::Yaml { document, err })
    }

    pub fn operator_profile(&self) -> Result<&OperatorProfile, ConfigError> {
        self.operator
            .as_ref()
            .ok_or_else(|| self.missing_section("operator"))
    }

    pub fn ansible_profile(&self) -> Result<&AnsibleProfile, ConfigError> {
        self.ansible
            .as_ref()
            .ok_or_else(|| self.missing_section("ansible"))
    }

    fn missing_section(&self, section: &'static str) -> ConfigError {
        ConfigError::MissingSection {
            product: self.name.clone(),
            section,
        }
    }

    pub fn snapshot_regex(&self) -> Result<Regex, ConfigError> {
        compile(&self.snapshot_pattern)
    }

    pub fn catalog_expectations(&self) -> Result<&CatalogExpectations, ConfigError> {
        self.fbc
            .as_ref()
            .ok_or_else(|| self.missing_section("fbc"))
    }
}

fn overlay(mut base: Mapping, user: &Mapping) -> Mapping {
    for (field, value) in user {
        let absent = match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        };
        if !absent {
            base.insert(field.clone(), value.clone());
        }
    }
    base
}

/// User supplied overrides, keyed by product then section
///
/// ```yaml
/// rhtas:
///   fbc:
///     defaultChannel: stable-v1.3
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TestConfig {
    products: BTreeMap<String, BTreeMap<String, Value>>,
}

impl TestConfig {
    pub fn parse(input: &[u8]) -> Result<Self, ConfigError> {
        if input.iter().all(u8::is_ascii_whitespace) {
            return Ok(TestConfig::default());
        }
        let config: Option<TestConfig> =
            serde_yaml::from_slice(input).map_err(|err| ConfigError::Yaml {
                document: "test config".to_owned(),
                err,
            })?;
        Ok(config.unwrap_or_default())
    }

    pub fn product(&self, product: &str) -> Option<&BTreeMap<String, Value>> {
        self.products.get(product)
    }

    pub fn section(&self, product: &str, section: &str) -> Option<&Value> {
        self.product(product)?.get(section)
    }
}
