//! Error types you might see while reading release sources

use crate::source::SourceKind;
use thiserror::Error;

/// Errors in the shape of a single image reference or digest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// invalid image reference format
    #[error("invalid image reference format: {0:?}")]
    InvalidReferenceFormat(String),

    /// invalid content digest format
    #[error("invalid content digest format: {0:?}")]
    InvalidDigestFormat(String),

    /// unsupported digest algorithm
    #[error("unsupported digest algorithm, {0:?}")]
    UnsupportedDigestFormat(String),
}

/// Errors while turning a raw source payload into a mapping or catalog
///
/// These are always fatal to the check consuming the source. Malformed
/// input means the upstream publisher broke its contract.
#[derive(Error, Debug)]
pub enum ParseError {
    /// source is not valid utf8 text
    #[error("{source_kind} is not valid utf8 text: {err}")]
    Utf8 {
        source_kind: SourceKind,
        err: std::str::Utf8Error,
    },

    /// json error in a source
    #[error("json error while parsing {source_kind}: {err}")]
    Json {
        source_kind: SourceKind,
        err: serde_json::Error,
    },

    /// yaml error in a source
    #[error("yaml error while parsing {source_kind}: {err}")]
    Yaml {
        source_kind: SourceKind,
        err: serde_yaml::Error,
    },

    /// top level of a document has an unexpected type
    #[error("{source_kind} must be a {expected} at the top level")]
    UnexpectedDocumentShape {
        source_kind: SourceKind,
        expected: &'static str,
    },

    /// catalog document has a schema value we don't recognize
    #[error("unknown catalog schema: {0:?}")]
    UnknownCatalogSchema(String),

    /// catalog document has no schema field
    #[error("catalog document has no schema field")]
    MissingCatalogSchema,

    /// catalog document failed to decode as its declared schema
    #[error("failed to parse catalog {schema} object: {err}")]
    CatalogObject {
        schema: &'static str,
        err: serde_json::Error,
    },
}

/// Errors loading product profiles and test configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// yaml error in a configuration document
    #[error("yaml error in {document}: {err}")]
    Yaml {
        document: String,
        err: serde_yaml::Error,
    },

    /// no built-in profile for this product
    #[error("unknown product {0:?}")]
    UnknownProduct(String),

    /// profile descriptor lacks a section an audit needs
    #[error("missing {section} section in profile for {product:?}")]
    MissingSection {
        product: String,
        section: &'static str,
    },

    /// configured pattern is not a valid regular expression
    #[error("invalid pattern {pattern:?} in profile: {err}")]
    InvalidPattern { pattern: String, err: regex::Error },
}

/// Errors that stop an audit before it can report
///
/// Everything else an audit finds is part of its report.
#[derive(Error, Debug)]
pub enum AuditError {
    /// a source could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// the product profile is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// an input file could not be read
    #[error("failed to read {path}: {err}")]
    Io { path: String, err: std::io::Error },
}
