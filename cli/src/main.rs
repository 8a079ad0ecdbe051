#[macro_use] extern crate clap;

use clap::{App, ArgMatches};
use env_logger::{from_env, Env};
use release_audit::{
    audit::{
        AnsibleAudit, AuditReport, CatalogAudit, ConstantsAudit, OperatorAudit, OperatorInputs,
        ReleaseAudit,
    },
    config::{ProductProfile, TestConfig, ENV_REPOSITORIES, ENV_SNAPSHOT, ENV_TEST_CONFIG},
    errors::AuditError,
    registry::RepositoryList,
    source::{parse_image_labels, SnapshotParser, SourceParser, SplitMapping},
};
use std::{collections::BTreeMap, fs, process};

const EXIT_FAILED: i32 = 1;
const EXIT_INPUT_ERROR: i32 = 2;

fn main() {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).get_matches();

    let log_level = matches.value_of("log_level").unwrap_or("warn");
    from_env(Env::default().default_filter_or(log_level)).init();

    match run(&matches) {
        Ok(report) => {
            print!("{}", report);
            if !report.passed() {
                process::exit(EXIT_FAILED);
            }
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            process::exit(EXIT_INPUT_ERROR);
        }
    }
}

fn run(matches: &ArgMatches) -> Result<AuditReport, AuditError> {
    let (name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        // SubcommandRequired means clap exits before we get here
        (name, None) => unreachable!("no arguments for subcommand {:?}", name),
    };

    let product = global_value(matches, sub, "product").unwrap_or("rhtas");
    let test_config = match file_arg(matches, sub, "test_config", ENV_TEST_CONFIG) {
        Some(path) => Some(TestConfig::parse(&read(&path)?)?),
        None => None,
    };
    let profile = ProductProfile::load(product, test_config.as_ref())?;
    let parsed = load_snapshot(&required_file(matches, sub, "snapshot", ENV_SNAPSHOT)?)?;
    let snapshot = &parsed.primary;

    match name {
        "release" => {
            let mut audit = ReleaseAudit::new(&profile).key_conflicts(parsed.conflicts.clone());
            if let Some(path) = sub.value_of("labels") {
                audit = audit.labels(parse_image_labels(&read(path)?)?);
            }
            if let (Some(operator), Some(bundle)) =
                (sub.value_of("operator_ref"), sub.value_of("bundle_ref"))
            {
                audit = audit.git_references(operator, bundle);
            }
            let artifacts: Vec<&str> = sub.values_of("artifact").into_iter().flatten().collect();
            for triple in artifacts.chunks(3) {
                if let [name, served, shipped] = triple {
                    audit = audit.artifact(*name, read(served)?, read(shipped)?);
                }
            }
            audit.run(snapshot)
        }
        "operator" => {
            let repositories = load_repositories(matches, sub)?;
            let operator = read(sub.value_of("operator_source").unwrap_or_default())?;
            let bundle_manifest = match sub.value_of("bundle_manifest") {
                Some(path) => Some(read_text(path)?),
                None => None,
            };
            OperatorAudit::new(&profile)?.run(&OperatorInputs {
                snapshot,
                operator: &operator,
                repositories: &repositories,
                bundle_manifest: bundle_manifest.as_deref(),
            })
        }
        "ansible" => {
            let repositories = load_repositories(matches, sub)?;
            let defaults = read(sub.value_of("defaults").unwrap_or_default())?;
            AnsibleAudit::new(&profile)?.run(snapshot, &defaults, &repositories)
        }
        "catalog" => {
            let mut catalogs = BTreeMap::new();
            for spec in sub.values_of("catalog").into_iter().flatten() {
                let mut parts = spec.splitn(2, '=');
                let key = parts.next().unwrap_or_default();
                let path = parts.next().unwrap_or(key);
                catalogs.insert(key.to_owned(), read(path)?);
            }
            CatalogAudit::new(&profile)?.run(snapshot, &catalogs)
        }
        "constants" => {
            let source = read(sub.value_of("constants_source").unwrap_or_default())?;
            ConstantsAudit::new().run(snapshot, &source)
        }
        other => unreachable!("unknown subcommand {:?}", other),
    }
}

/// Global args can be given before or after the subcommand
fn global_value<'a>(matches: &'a ArgMatches, sub: &'a ArgMatches, name: &str) -> Option<&'a str> {
    sub.value_of(name).or_else(|| matches.value_of(name))
}

fn file_arg(matches: &ArgMatches, sub: &ArgMatches, name: &str, env: &str) -> Option<String> {
    global_value(matches, sub, name)
        .map(str::to_owned)
        .or_else(|| std::env::var(env).ok())
}

fn required_file(
    matches: &ArgMatches,
    sub: &ArgMatches,
    name: &str,
    env: &str,
) -> Result<String, AuditError> {
    file_arg(matches, sub, name, env).ok_or_else(|| AuditError::Io {
        path: format!("<{}>", env),
        err: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no --{} given and {} is not set", name.replace('_', "-"), env),
        ),
    })
}

fn read(path: &str) -> Result<Vec<u8>, AuditError> {
    fs::read(path).map_err(|err| AuditError::Io {
        path: path.to_owned(),
        err,
    })
}

fn read_text(path: &str) -> Result<String, AuditError> {
    fs::read_to_string(path).map_err(|err| AuditError::Io {
        path: path.to_owned(),
        err,
    })
}

fn load_snapshot(path: &str) -> Result<SplitMapping, AuditError> {
    Ok(SnapshotParser::new().parse_logged(&read(path)?)?)
}

fn load_repositories(matches: &ArgMatches, sub: &ArgMatches) -> Result<RepositoryList, AuditError> {
    let path = required_file(matches, sub, "repositories", ENV_REPOSITORIES)?;
    Ok(RepositoryList::parse(&read(&path)?)?)
}
