use super::*;
use crate::errors::ParseError;

const STREAM: &str = r#"
{"schema":"olm.package","name":"rhtas-operator","defaultChannel":"stable"}
{"schema":"olm.channel","name":"stable","package":"rhtas-operator","entries":[
    {"name":"rhtas-operator.v1.2.0","replaces":"rhtas-operator.v1.1.2","skips":["rhtas-operator.v1.1.0"]}
]}
{
    "schema": "olm.bundle",
    "name": "rhtas-operator.v1.2.0",
    "package": "rhtas-operator",
    "image": "registry.redhat.io/rhtas/rhtas-operator-bundle@sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    "properties": [
        {"type":"olm.package","value":{"packageName":"rhtas-operator","version":"1.2.0"}}
    ]
}
{"schema":"olm.deprecations","package":"rhtas-operator","entries":[
    {"reference":{"schema":"olm.channel","name":"stable-v1.1"},"message":"use stable"},
    {"reference":{"schema":"olm.package"},"message":"gone"}
]}
"#;

#[test]
fn package_and_channel() {
    let objects = parse_catalog(
        br#"{"schema":"olm.package","name":"rhtas-operator","defaultChannel":"stable"} {"schema":"olm.channel","name":"stable","package":"rhtas-operator","entries":[]}"#,
    )
    .unwrap();
    assert_eq!(objects.len(), 2);
    match &objects[0] {
        CatalogObject::Package(package) => {
            assert_eq!(package.name, "rhtas-operator");
            assert_eq!(package.default_channel, "stable");
        }
        other => panic!("expected a package, got {:?}", other),
    }
    match &objects[1] {
        CatalogObject::Channel(channel) => {
            assert_eq!(channel.name, "stable");
            assert_eq!(channel.package, "rhtas-operator");
            assert!(channel.entries.is_empty());
        }
        other => panic!("expected a channel, got {:?}", other),
    }
}

#[test]
fn unknown_schema() {
    let result = parse_catalog(
        br#"{"schema":"olm.package","name":"rhtas-operator"} {"schema":"olm.unknown","name":"x"}"#,
    );
    match result {
        Err(ParseError::UnknownCatalogSchema(schema)) => assert_eq!(schema, "olm.unknown"),
        other => panic!("unexpected {:?}", other),
    }
    let err = parse_catalog(br#"{"schema":"olm.unknown"}"#).unwrap_err();
    assert!(err.to_string().contains("olm.unknown"));
}

#[test]
fn missing_or_odd_schema() {
    assert!(matches!(
        parse_catalog(br#"{"name":"rhtas-operator"}"#),
        Err(ParseError::MissingCatalogSchema)
    ));
    assert!(matches!(
        parse_catalog(br#"{"schema":7}"#),
        Err(ParseError::UnknownCatalogSchema(_))
    ));
    assert!(matches!(
        parse_catalog(br#"{"schema":"olm.bundle","name":"no-image"}"#),
        Err(ParseError::CatalogObject { schema: "olm.bundle", .. })
    ));
    assert!(matches!(
        parse_catalog(br#"{"schema":"olm.package""#),
        Err(ParseError::Json { .. })
    ));
}

#[test]
fn empty_stream() {
    assert!(parse_catalog(b"").unwrap().is_empty());
    assert!(parse_catalog(b"\n  \n").unwrap().is_empty());
}

#[test]
fn grouped_catalog() {
    let catalog = Catalog::parse(STREAM.as_bytes()).unwrap();
    assert_eq!(catalog.packages.len(), 1);
    assert_eq!(catalog.channels.len(), 1);
    assert_eq!(catalog.bundles.len(), 1);
    assert_eq!(catalog.deprecations.len(), 1);

    let entry = &catalog.channels[0].entries[0];
    assert_eq!(entry.replaces.as_deref(), Some("rhtas-operator.v1.1.2"));
    assert_eq!(entry.skips, vec!["rhtas-operator.v1.1.0".to_owned()]);

    assert_eq!(catalog.bundles[0].properties[0].property_type, "olm.package");
    let names: Vec<&str> = catalog
        .deprecation_entries()
        .map(|entry| entry.reference.name.as_str())
        .collect();
    assert_eq!(names, vec!["stable-v1.1", ""]);
}
