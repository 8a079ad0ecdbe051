//! Cross-source consistency checks for the container images of a release
//!
//! Each release source (the snapshot, the operator's own declarations, the
//! Ansible collection, the file-based catalogs) is parsed into an image
//! mapping by [source], then compared key by key and digest by digest by
//! [reconcile]. [audit] bundles those checks the way a release review runs
//! them, driven by a per-product [config::ProductProfile].

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate serde;

pub mod audit;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod image;
pub mod reconcile;
pub mod registry;
pub mod source;

pub use crate::{
    audit::AuditReport,
    config::ProductProfile,
    image::{ContentDigest, ImageKey},
    reconcile::CheckReport,
};
