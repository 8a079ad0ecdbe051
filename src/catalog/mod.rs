//! Operator Lifecycle Manager file-based catalogs
//!
//! A catalog is a stream of JSON documents, each tagged with a `schema`
//! field. Only the four schemas the release checks care about are
//! understood, and anything else is rejected so that schema drift shows up
//! as a hard error instead of silently passing.
//!
//! Reference: https://olm.operatorframework.io/docs/reference/file-based-catalogs/

#[cfg(test)] mod tests;

use crate::{errors::ParseError, source::SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod schemas {
    pub const PACKAGE: &str = "olm.package";
    pub const CHANNEL: &str = "olm.channel";
    pub const BUNDLE: &str = "olm.bundle";
    pub const DEPRECATIONS: &str = "olm.deprecations";
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Package {
    pub schema: String,
    pub name: String,
    #[serde(rename = "defaultChannel", default)]
    pub default_channel: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Channel {
    pub schema: String,
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub entries: Vec<ChannelEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChannelEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skips: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Bundle {
    pub schema: String,
    pub name: String,
    pub package: String,
    pub image: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: String,
    pub value: Value,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Deprecation {
    pub schema: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub entries: Vec<DeprecationEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DeprecationEntry {
    pub reference: DeprecationReference,
    #[serde(default)]
    pub message: String,
}

/// What a deprecation entry points at; `name` is absent for whole packages
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DeprecationReference {
    pub schema: String,
    #[serde(default)]
    pub name: String,
}

/// One document from a catalog stream
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogObject {
    Package(Package),
    Channel(Channel),
    Bundle(Bundle),
    Deprecation(Deprecation),
}

impl CatalogObject {
    /// Decode one document, dispatching on its `schema` field
    pub fn from_value(document: Value) -> Result<Self, ParseError> {
        let schema = match document.get("schema") {
            Some(Value::String(schema)) => schema.clone(),
            Some(other) => return Err(ParseError::UnknownCatalogSchema(other.to_string())),
            None => return Err(ParseError::MissingCatalogSchema),
        };
        Ok(match schema.as_str() {
            schemas::PACKAGE => CatalogObject::Package(decode(schemas::PACKAGE, document)?),
            schemas::CHANNEL => CatalogObject::Channel(decode(schemas::CHANNEL, document)?),
            schemas::BUNDLE => CatalogObject::Bundle(decode(schemas::BUNDLE, document)?),
            schemas::DEPRECATIONS => {
                CatalogObject::Deprecation(decode(schemas::DEPRECATIONS, document)?)
            }
            _ => return Err(ParseError::UnknownCatalogSchema(schema)),
        })
    }

    pub fn schema(&self) -> &'static str {
        match self {
            CatalogObject::Package(_) => schemas::PACKAGE,
            CatalogObject::Channel(_) => schemas::CHANNEL,
            CatalogObject::Bundle(_) => schemas::BUNDLE,
            CatalogObject::Deprecation(_) => schemas::DEPRECATIONS,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    schema: &'static str,
    document: Value,
) -> Result<T, ParseError> {
    serde_json::from_value(document).map_err(|err| ParseError::CatalogObject { schema, err })
}

/// Decode a whole catalog stream, failing on the first bad document
pub fn parse_catalog(input: &[u8]) -> Result<Vec<CatalogObject>, ParseError> {
    let mut objects = Vec::new();
    for document in serde_json::Deserializer::from_slice(input).into_iter::<Value>() {
        let document = document.map_err(|err| ParseError::Json {
            source_kind: SourceKind::Catalog,
            err,
        })?;
        objects.push(CatalogObject::from_value(document)?);
    }
    log::debug!("catalog stream has {} documents", objects.len());
    Ok(objects)
}

/// Catalog objects grouped by schema, in stream order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub packages: Vec<Package>,
    pub channels: Vec<Channel>,
    pub bundles: Vec<Bundle>,
    pub deprecations: Vec<Deprecation>,
}

impl Catalog {
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        Ok(parse_catalog(input)?.into_iter().collect())
    }

    /// Every deprecation entry across all deprecation documents
    pub fn deprecation_entries(&self) -> impl Iterator<Item = &DeprecationEntry> {
        self.deprecations
            .iter()
            .flat_map(|deprecation| deprecation.entries.iter())
    }
}

impl std::iter::FromIterator<CatalogObject> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogObject>>(iter: I) -> Self {
        let mut catalog = Catalog::default();
        for object in iter {
            match object {
                CatalogObject::Package(package) => catalog.packages.push(package),
                CatalogObject::Channel(channel) => catalog.channels.push(channel),
                CatalogObject::Bundle(bundle) => catalog.bundles.push(bundle),
                CatalogObject::Deprecation(deprecation) => catalog.deprecations.push(deprecation),
            }
        }
        catalog
    }
}
