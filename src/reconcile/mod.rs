//! Checks that compare image mappings across release sources
//!
//! Every check is a plain function returning a [CheckReport]. Missing keys,
//! absent digests, and registry misses are findings inside the report; they
//! never stop a check early.


mod artifacts;
mod catalog;
mod digests;
mod keys;
mod labels;
mod registry;
mod report;

pub use artifacts::{artifact_checksums, bundle_reference, git_reference};
pub use catalog::catalog_contents;
pub use digests::{compare_digests, digest_agreement, digest_uniqueness, SkipRule};
pub use keys::{completeness, defined_once, non_empty, valid_definitions};
pub use labels::{image_labels, ImageLabels};
pub use registry::registry_membership;
pub use report::{CheckReport, Finding, Outcome};
