use super::*;
use crate::{
    config::{ProductProfile, TestConfig},
    errors::{AuditError, ParseError},
    image::{canonicalize, ImageKey},
    registry::{RepositoryList, RepositoryRecord},
    reconcile::ImageLabels,
    source::{KeyConflict, SourceMapping},
};
use std::collections::BTreeMap;

fn digest(n: usize) -> String {
    format!("{:064x}", n + 1)
}

fn repository(key: &ImageKey) -> String {
    format!("rhtas/{}-rhel9", key.as_str().trim_end_matches("-image"))
}

fn image(key: &ImageKey, n: usize) -> String {
    format!("registry.redhat.io/{}@sha256:{}", repository(key), digest(n))
}

/// A snapshot and registry consistent with the rhtas profile
fn rhtas_release(profile: &ProductProfile) -> (SourceMapping, RepositoryList) {
    let operator = profile.operator.as_ref().unwrap();
    let mut keys: Vec<ImageKey> = operator.image_keys.clone();
    keys.push(operator.image_key.clone());
    keys.push(operator.bundle_image_key.clone());
    let snapshot: SourceMapping = keys
        .iter()
        .enumerate()
        .map(|(n, key)| (key.clone(), image(key, n)))
        .collect();
    let repositories = RepositoryList {
        data: keys
            .iter()
            .map(|key| RepositoryRecord {
                name: repository(key),
                id: key.to_string(),
                published: true,
            })
            .collect(),
    };
    (snapshot, repositories)
}

fn help_text(profile: &ProductProfile, snapshot: &SourceMapping) -> String {
    let operator = profile.operator.as_ref().unwrap();
    let mut help = String::from("Usage of /manager:\n");
    for key in &operator.image_keys {
        help.push_str(&format!(
            "  -{} string\n    \tThe image used by the operator (default \"{}\")\n",
            key,
            snapshot.get(key.as_str()).unwrap()
        ));
    }
    for key in &operator.other_image_keys {
        help.push_str(&format!(
            "  -{} string\n    \tHelper image (default \"registry.access.redhat.com/ubi9/{}:latest\")\n",
            key, key
        ));
    }
    help
}

#[test]
fn release_snapshot() {
    let _ = env_logger::builder().is_test(true).try_init();
    let profile = ProductProfile::builtin("rhtas").unwrap();
    let (snapshot, _) = rhtas_release(&profile);

    let report = ReleaseAudit::new(&profile)
        .git_references("0a1b2c", "0a1b2c")
        .artifact("cosign-linux-amd64.gz", b"gz".to_vec(), b"gz".to_vec())
        .run(&snapshot)
        .unwrap();
    assert!(report.passed(), "{}", report);
    assert_eq!(report.checks.len(), 6);
    assert!(report.to_string().ends_with("PASS: 6 of 6 checks passed\n"));

    let mut entries: Vec<(ImageKey, String)> =
        snapshot.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    entries[1].1 = entries[0].1.clone();
    let duplicated: SourceMapping = entries.into_iter().collect();
    let report = ReleaseAudit::new(&profile)
        .git_references("0a1b2c", "ffffff")
        .run(&duplicated)
        .unwrap();
    assert!(!report.passed());
    let failed: Vec<&str> = report.failures().map(|check| check.title.as_str()).collect();
    assert_eq!(
        failed,
        vec![
            "snapshot digests are unique",
            "operator and bundle share a git reference"
        ]
    );

    let report = ReleaseAudit::new(&profile).run(&SourceMapping::new()).unwrap();
    assert!(!report.check("snapshot lists images").unwrap().passed);
}

fn release_labels(profile: &ProductProfile, snapshot: &SourceMapping) -> BTreeMap<ImageKey, ImageLabels> {
    snapshot
        .keys()
        .map(|key| {
            let mut labels = profile.required_labels.clone();
            for (label, value) in labels.iter_mut() {
                if value.is_empty() {
                    *value = format!("{} of {}", label, key);
                }
            }
            labels.insert(GIT_REFERENCE_LABEL.to_owned(), "0a1b2c".to_owned());
            (key.clone(), labels)
        })
        .collect()
}

#[test]
fn release_image_labels() {
    let _ = env_logger::builder().is_test(true).try_init();
    let profile = ProductProfile::builtin("rhtas").unwrap();
    let (snapshot, _) = rhtas_release(&profile);
    let operator = profile.operator.as_ref().unwrap();
    let labels = release_labels(&profile, &snapshot);

    // the git reference comes from the operator and bundle labels
    let report = ReleaseAudit::new(&profile).labels(labels.clone()).run(&snapshot).unwrap();
    assert!(report.passed(), "{}", report);
    let git = report.check("operator and bundle share a git reference").unwrap();
    assert_eq!(git.detail("vcs-ref"), Some("0a1b2c"));

    let mut drifted = labels.clone();
    drifted
        .get_mut(&operator.bundle_image_key)
        .unwrap()
        .insert(GIT_REFERENCE_LABEL.to_owned(), "ffffff".to_owned());
    let report = ReleaseAudit::new(&profile).labels(drifted).run(&snapshot).unwrap();
    let git = report.check("operator and bundle share a git reference").unwrap();
    assert!(!git.passed);
    assert_eq!(git.detail("bundle"), Some("ffffff"));

    // explicit references win over the labels
    let report = ReleaseAudit::new(&profile)
        .labels(labels.clone())
        .git_references("77ab01c", "77ab01c")
        .run(&snapshot)
        .unwrap();
    let git = report.check("operator and bundle share a git reference").unwrap();
    assert_eq!(git.detail("vcs-ref"), Some("77ab01c"));

    let first = operator.image_keys[0].clone();
    let mut broken = labels.clone();
    broken.get_mut(&first).unwrap().insert("vcs-type".to_owned(), "svn".to_owned());
    broken.remove(&operator.image_keys[1]);
    let report = ReleaseAudit::new(&profile).labels(broken).run(&snapshot).unwrap();
    assert!(!report.passed());
    let required = report.check("snapshot images have the required labels").unwrap();
    assert_eq!(
        required.detail(&format!("{} vcs-type", first)),
        Some("\"svn\", expected \"git\"")
    );
    assert_eq!(
        required.detail(&format!("{} build-date", operator.image_keys[1])),
        Some("missing")
    );

    // without labels there is no label check and no git reference check
    let report = ReleaseAudit::new(&profile).run(&snapshot).unwrap();
    assert!(report.check("snapshot images have the required labels").is_none());
    assert!(report.check("operator and bundle share a git reference").is_none());
}

#[test]
fn release_key_conflicts() {
    let profile = ProductProfile::builtin("rhtas").unwrap();
    let (snapshot, _) = rhtas_release(&profile);
    let (key, kept) = snapshot.iter().next().map(|(k, v)| (k.clone(), v.clone())).unwrap();
    let conflict = KeyConflict {
        key: key.clone(),
        kept,
        dropped: image(&key, 99),
    };

    let report = ReleaseAudit::new(&profile)
        .key_conflicts(vec![conflict.clone()])
        .run(&snapshot)
        .unwrap();
    assert!(!report.passed());
    let failed: Vec<&str> = report.failures().map(|check| check.title.as_str()).collect();
    assert_eq!(failed, vec!["snapshot keys are defined once"]);
    assert_eq!(
        report.check("snapshot keys are defined once").unwrap().detail(key.as_str()),
        Some(conflict.to_string().as_str())
    );
}

#[test]
fn operator_images() {
    let profile = ProductProfile::builtin("rhtas").unwrap();
    let (snapshot, repositories) = rhtas_release(&profile);
    let help = help_text(&profile, &snapshot);
    let operator_digest = snapshot
        .get("rhtas-operator-image")
        .and_then(crate::image::extract_digest)
        .unwrap();
    let csv = format!(
        "    containerImage: registry.redhat.io/rhtas/rhtas-rhel9-operator@sha256:{}\n",
        operator_digest.hex_str()
    );

    let audit = OperatorAudit::new(&profile).unwrap();
    let report = audit
        .run(&OperatorInputs {
            snapshot: &snapshot,
            operator: help.as_bytes(),
            repositories: &repositories,
            bundle_manifest: Some(&csv),
        })
        .unwrap();
    assert!(report.passed(), "{}", report);

    // one operator image drifts from the snapshot
    let drifted = help.replacen(&digest(0), &"f".repeat(64), 1);
    let report = audit
        .run(&OperatorInputs {
            snapshot: &snapshot,
            operator: drifted.as_bytes(),
            repositories: &repositories,
            bundle_manifest: None,
        })
        .unwrap();
    assert!(!report.passed());
    let agreement = report.check("operator images agree with snapshot").unwrap();
    assert!(!agreement.passed);
    let first_key = profile.operator.as_ref().unwrap().image_keys[0].as_str();
    assert_eq!(agreement.detail(first_key), Some("DIFFERENT HASHES"));

    // an operator that declares nothing
    let report = audit
        .run(&OperatorInputs {
            snapshot: &snapshot,
            operator: b"Usage of /manager:\n",
            repositories: &repositories,
            bundle_manifest: None,
        })
        .unwrap();
    assert!(!report.check("operator declares product images").unwrap().passed);
    assert!(!report.check("operator product image keys are complete").unwrap().passed);
}

#[test]
fn helm_operator_images() {
    let profile = ProductProfile::builtin("policy-controller").unwrap();
    let webhook = format!(
        "registry.redhat.io/rhtas/policy-controller-rhel9@sha256:{}",
        digest(7)
    );
    let snapshot: SourceMapping = vec![
        ("policy-controller-image", webhook.clone()),
        (
            "policy-controller-operator-image",
            format!("registry.redhat.io/rhtas/policy-controller-rhel9-operator@sha256:{}", digest(8)),
        ),
    ]
    .into_iter()
    .collect();
    let repositories = RepositoryList {
        data: vec![RepositoryRecord {
            name: "rhtas/policy-controller-rhel9".into(),
            id: "pc".into(),
            published: true,
        }],
    };
    let values = format!(
        concat!(
            "webhook:\n",
            "  image:\n",
            "    repository: registry.redhat.io/rhtas/policy-controller-rhel9\n",
            "    version: sha256:{}\n",
            "cleanup:\n",
            "  image:\n",
            "    repository: registry.redhat.io/openshift4/ose-cli\n",
            "    version: v4.16\n",
        ),
        digest(7)
    );
    let audit = OperatorAudit::new(&profile).unwrap();
    let report = audit
        .run(&OperatorInputs {
            snapshot: &snapshot,
            operator: values.as_bytes(),
            repositories: &repositories,
            bundle_manifest: None,
        })
        .unwrap();
    assert!(report.passed(), "{}", report);
}

#[test]
fn ansible_images() {
    let profile = ProductProfile::builtin("rhtas").unwrap();
    let ansible = profile.ansible.as_ref().unwrap();
    let (mut entries, mut records): (Vec<(ImageKey, String)>, Vec<RepositoryRecord>) =
        (Vec::new(), Vec::new());
    let mut defaults = String::from("---\n");
    for (n, key) in ansible.image_keys.iter().enumerate() {
        let canonical = canonicalize(key.as_str());
        let snapshot_image = image(&canonical, n);
        // the skipped key points somewhere else entirely
        let ansible_image = if key.as_str() == "tas_single_node_tuf_image" {
            image(&canonical, 100)
        } else {
            snapshot_image.clone()
        };
        defaults.push_str(&format!("{}: \"{}\"\n", key, ansible_image));
        entries.push((canonical.clone(), snapshot_image));
        records.push(RepositoryRecord {
            name: repository(&canonical),
            id: canonical.to_string(),
            published: true,
        });
    }
    for key in &ansible.other_image_keys {
        defaults.push_str(&format!("{}: docker.io/library/{}:1.25\n", key, key));
    }
    defaults.push_str("tas_single_node_replicas: 1\n");
    let snapshot: SourceMapping = entries.into_iter().collect();
    let repositories = RepositoryList { data: records };

    let audit = AnsibleAudit::new(&profile).unwrap();
    let report = audit.run(&snapshot, defaults.as_bytes(), &repositories).unwrap();
    assert!(report.passed(), "{}", report);
    let agreement = report.check("ansible images agree with snapshot").unwrap();
    assert_eq!(
        agreement.detail("tas_single_node_tuf_image"),
        Some("skipped (Ansible uses different TUF image)")
    );

    // without the skip rule the TUF image is a real mismatch
    let config = TestConfig::parse(b"rhtas:\n  ansible:\n    skips: []\n").unwrap();
    let strict = ProductProfile::load("rhtas", Some(&config)).unwrap();
    let report = AnsibleAudit::new(&strict)
        .unwrap()
        .run(&snapshot, defaults.as_bytes(), &repositories)
        .unwrap();
    let agreement = report.check("ansible images agree with snapshot").unwrap();
    assert_eq!(
        agreement.detail("tas_single_node_tuf_image"),
        Some("DIFFERENT HASHES")
    );

    match audit.run(&snapshot, b"- not\n- a mapping\n", &repositories) {
        Err(AuditError::Parse(ParseError::UnexpectedDocumentShape { .. })) => {}
        other => panic!("unexpected {:?}", other),
    }

    let missing = ProductProfile::builtin("model-validation").unwrap();
    assert!(AnsibleAudit::new(&missing).is_err());
}

#[test]
fn catalog_images() {
    let profile = ProductProfile::builtin("policy-controller").unwrap();
    let bundle = format!(
        "registry.redhat.io/rhtas/policy-controller-operator-bundle@sha256:{}",
        digest(3)
    );
    let snapshot: SourceMapping = vec![
        ("policy-controller-operator-bundle-image", bundle.clone()),
        (
            "pco-fbc-v4-15",
            format!("quay.io/securesign/pco-fbc-v4-15@sha256:{}", digest(4)),
        ),
        (
            "pco-fbc-v4-16",
            format!("quay.io/securesign/pco-fbc-v4-16@sha256:{}", digest(5)),
        ),
        (
            "fbc-v4-16",
            format!("quay.io/securesign/fbc-v4-16@sha256:{}", digest(6)),
        ),
    ]
    .into_iter()
    .collect();
    let catalog = format!(
        concat!(
            r#"{{"schema":"olm.package","name":"policy-controller-operator","defaultChannel":"tech-preview"}}"#,
            "\n",
            r#"{{"schema":"olm.channel","name":"tech-preview","package":"policy-controller-operator","entries":[{{"name":"policy-controller-operator.v0.1.0"}}]}}"#,
            "\n",
            r#"{{"schema":"olm.bundle","name":"policy-controller-operator.v0.1.0","package":"policy-controller-operator","image":"{}","properties":[]}}"#,
            "\n",
        ),
        bundle
    );

    let audit = CatalogAudit::new(&profile).unwrap();
    assert_eq!(audit.catalog_images(&snapshot).len(), 2);

    let mut catalogs = BTreeMap::new();
    catalogs.insert("pco-fbc-v4-15".to_owned(), catalog.clone().into_bytes());
    catalogs.insert("pco-fbc-v4-16".to_owned(), catalog.into_bytes());
    let report = audit.run(&snapshot, &catalogs).unwrap();
    assert!(report.passed(), "{}", report);
    assert_eq!(report.checks.len(), 3);

    catalogs.remove("pco-fbc-v4-16");
    let report = audit.run(&snapshot, &catalogs).unwrap();
    assert!(!report.passed());
    assert_eq!(
        report.checks[0].detail("pco-fbc-v4-16"),
        Some("MISSING")
    );

    catalogs.insert(
        "pco-fbc-v4-16".to_owned(),
        br#"{"schema":"olm.unknown"}"#.to_vec(),
    );
    assert!(matches!(
        audit.run(&snapshot, &catalogs),
        Err(AuditError::Parse(ParseError::UnknownCatalogSchema(_)))
    ));
}

#[test]
fn image_constants() {
    let key = ImageKey::new("rekor-server-image");
    let snapshot: SourceMapping = vec![(key.clone(), image(&key, 0))].into_iter().collect();

    let source = format!("const RekorServerImage = \"{}\"\n", image(&key, 0));
    let report = ConstantsAudit::new().run(&snapshot, source.as_bytes()).unwrap();
    assert!(report.passed(), "{}", report);

    let source = format!(
        "const RekorServerImage = \"{}\"\nconst TufImage = \"{}\"\n",
        image(&key, 1),
        image(&ImageKey::new("tuf-image"), 2)
    );
    let report = ConstantsAudit::new().run(&snapshot, source.as_bytes()).unwrap();
    let agreement = report.check("image constants agree with snapshot").unwrap();
    assert_eq!(agreement.detail("rekor-server-image"), Some("DIFFERENT HASHES"));
    assert_eq!(agreement.detail("tuf-image"), Some("MISSING"));

    // a constant redefined with another image
    let source = format!(
        "const RekorServerImage = \"{}\"\nRekorServerImage := \"{}\"\n",
        image(&key, 0),
        image(&key, 1)
    );
    let report = ConstantsAudit::new().run(&snapshot, source.as_bytes()).unwrap();
    assert!(report.check("image constants agree with snapshot").unwrap().passed);
    let once = report.check("image constants are defined once").unwrap();
    assert!(!once.passed);
    assert!(once.detail("rekor-server-image").unwrap().ends_with(&format!("{} ignored", image(&key, 1))));

    let report = ConstantsAudit::new().run(&snapshot, b"package images\n").unwrap();
    assert!(!report.passed());
}
