use crate::{
    audit::AuditReport,
    errors::AuditError,
    image::ImageKey,
    reconcile::{defined_once, digest_agreement, non_empty},
    source::{ConstantsParser, SourceMapping, SourceParser},
};

/// Checks image constants embedded in source code against the snapshot
///
/// This is weaker than the operator audit: the key set comes from the
/// constants themselves, so a constant that was removed goes unnoticed.
#[derive(Clone, Debug, Default)]
pub struct ConstantsAudit;

impl ConstantsAudit {
    pub fn new() -> Self {
        ConstantsAudit
    }

    pub fn run(&self, snapshot: &SourceMapping, source: &[u8]) -> Result<AuditReport, AuditError> {
        let found = ConstantsParser::new().parse_logged(source)?;
        let constants = &found.primary;
        let keys: Vec<ImageKey> = constants.keys().cloned().collect();

        let mut report = AuditReport::new("image constants");
        report.push(non_empty("source declares image constants", constants));
        report.push(defined_once(
            "image constants are defined once",
            &found.conflicts,
        ));
        report.push(digest_agreement(
            "image constants agree with snapshot",
            &keys,
            constants,
            snapshot,
            |key: &str| ImageKey::new(key),
            &[],
        ));
        Ok(report)
    }
}
