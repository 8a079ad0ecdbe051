use crate::{
    image::{extract_digest, ContentDigest, ImageKey},
    reconcile::{CheckReport, Outcome},
    source::SourceMapping,
};
use std::collections::BTreeMap;

/// A named exception to the digest agreement check
///
/// Skips are always explicit: the key is listed in the report as
/// `skipped (<reason>)` and logged with both references.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkipRule {
    pub key: ImageKey,
    pub reason: String,
}

impl SkipRule {
    pub fn new<K: Into<ImageKey>, S: Into<String>>(key: K, reason: S) -> Self {
        SkipRule {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Compare each mandatory key of `source` against `reference` by digest
///
/// `keys` are in the source's own key space. Each is translated with
/// `key_map` before it is looked up in `reference`, which is normally the
/// snapshot. A key absent from either side is [Outcome::Missing]. A side
/// without a pinned digest never matches.
pub fn compare_digests<F>(
    keys: &[ImageKey],
    source: &SourceMapping,
    reference: &SourceMapping,
    key_map: F,
    skips: &[SkipRule],
) -> BTreeMap<ImageKey, Outcome>
where
    F: Fn(&str) -> ImageKey,
{
    let mut outcomes = BTreeMap::new();
    for key in keys {
        let reference_key = key_map(key.as_str());
        let source_image = source.get(key.as_str());
        let reference_image = reference.get(reference_key.as_str());

        let skip = skips
            .iter()
            .find(|rule| rule.key == *key || rule.key == reference_key);
        let outcome = if let Some(rule) = skip {
            log::warn!(
                "skipping {}: {} ({} vs {})",
                key,
                rule.reason,
                source_image.unwrap_or("<absent>"),
                reference_image.unwrap_or("<absent>")
            );
            Outcome::Skipped(rule.reason.clone())
        } else {
            match (source_image, reference_image) {
                (Some(source_image), Some(reference_image)) => {
                    match (extract_digest(source_image), extract_digest(reference_image)) {
                        (Some(a), Some(b)) if a == b => Outcome::Match,
                        _ => Outcome::DifferentHashes,
                    }
                }
                _ => Outcome::Missing,
            }
        };
        log::debug!("{} -> {}: {}", key, reference_key, outcome);
        outcomes.insert(key.clone(), outcome);
    }
    outcomes
}

/// Digest agreement as a reported check
pub fn digest_agreement<F>(
    title: &str,
    keys: &[ImageKey],
    source: &SourceMapping,
    reference: &SourceMapping,
    key_map: F,
    skips: &[SkipRule],
) -> CheckReport
where
    F: Fn(&str) -> ImageKey,
{
    let mut report = CheckReport::new(title);
    for (key, outcome) in compare_digests(keys, source, reference, key_map, skips) {
        report.outcome(key, &outcome);
    }
    report
}

/// Every entry must pin a digest that no other entry uses
///
/// Passes exactly when the map from key to digest is injective. Entries
/// without a digest are listed as `no digest` and fail the check.
pub fn digest_uniqueness(title: &str, mapping: &SourceMapping) -> CheckReport {
    let mut report = CheckReport::new(title);
    let mut users: BTreeMap<ContentDigest, Vec<&ImageKey>> = BTreeMap::new();
    let mut pinned = 0;
    for (key, image) in mapping {
        match extract_digest(image) {
            Some(digest) => {
                users.entry(digest).or_default().push(key);
                pinned += 1;
            }
            None => report.fail_entry(key, "no digest"),
        }
    }
    for (digest, keys) in &users {
        if keys.len() > 1 {
            let keys: Vec<&str> = keys.iter().map(|key| key.as_str()).collect();
            report.fail_entry(digest.hex_str(), format!("used by {}", keys.join(", ")));
        }
    }
    if users.len() != pinned {
        report.fail_item(format!(
            "{} distinct digests for {} pinned images",
            users.len(),
            pinned
        ));
    }
    if report.passed {
        report.item(format!("{} distinct digests", users.len()));
    }
    report
}
