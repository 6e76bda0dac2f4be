//! Dataset loading: corruption checks and repair per row
//!
//! A loader owns the map it builds and hands it back to the caller. Rows
//! whose identifier is corrupted are skipped before any other field is
//! looked at; a row with any field that cannot be repaired is discarded as
//! a whole, and a field the repairer keeps stays as read. Later rows replace
//! earlier ones with the same identifier.

use crate::corruption::{check_field, is_corrupted};
use crate::feeds::RawRow;
use crate::fields::{Field, SourceKind};
use crate::record::{CleanRecord, FieldValue, SourceMap};
use crate::repair::{FieldRepairer, Repair};
use rand::Rng;
use tracing::{debug, info};

/// Result of loading one source
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Cleaned records keyed by identifier
    pub records: SourceMap,
    /// Rows that survived loading (duplicates counted each time)
    pub retained: usize,
    /// Rows discarded for a corrupted identifier or an unrepairable field
    pub dropped: usize,
    /// Field values replaced by the repairer in retained rows
    pub repaired: usize,
}

/// Load rows of `kind`, calling `repair(field, guid)` for each corrupted non-identifier field
pub fn load_source<I, F>(kind: SourceKind, rows: I, mut repair: F) -> LoadOutcome
where
    I: IntoIterator<Item = RawRow>,
    F: FnMut(Field, &str) -> Repair,
{
    let mut outcome = LoadOutcome::default();

    'rows: for row in rows {
        let guid = row.get(Field::Guid.column()).unwrap_or_default();
        if is_corrupted(guid) {
            debug!(source = %kind, guid, "Dropping row with corrupted identifier");
            outcome.dropped += 1;
            continue;
        }

        let mut record = CleanRecord::new(guid);
        let mut repairs = 0;

        for &field in kind.fields().iter().filter(|f| **f != Field::Guid) {
            let raw = row.get(field.column()).unwrap_or_default();
            let value = match check_field(raw) {
                Ok(text) => FieldValue::Text(text.to_string()),
                Err(corruption) => match repair(field, guid) {
                    Repair::Replaced(value) => {
                        debug!(source = %kind, guid, %field, %corruption, value, "Repaired field");
                        repairs += 1;
                        FieldValue::Repaired(value)
                    }
                    Repair::Drop => {
                        debug!(source = %kind, guid, %field, %corruption, "Dropping row with unrepairable field");
                        outcome.dropped += 1;
                        continue 'rows;
                    }
                    Repair::Keep => FieldValue::Text(raw.to_string()),
                },
            };
            record.values.insert(field, value);
        }

        outcome.repaired += repairs;
        outcome.retained += 1;
        outcome.records.insert(record.guid.clone(), record);
    }

    info!(
        source = %kind,
        retained = outcome.retained,
        unique = outcome.records.len(),
        dropped = outcome.dropped,
        repaired = outcome.repaired,
        "Loaded source"
    );

    outcome
}

/// Load the geography reference rows
///
/// Only the identifier is checked. Four-letter place names ("Napa", "Kern")
/// are real values, and a zip code that does not read as an integer is
/// skipped later by zip code repair, so every other field is kept as read.
pub fn load_geography<I>(rows: I) -> LoadOutcome
where
    I: IntoIterator<Item = RawRow>,
{
    load_source(SourceKind::Geography, rows, |_, _| Repair::Keep)
}

/// Load housing rows, rebuilding corrupted zip codes from `geography`
pub fn load_housing<I, R>(
    rows: I,
    repairer: &mut FieldRepairer<R>,
    geography: &SourceMap,
) -> LoadOutcome
where
    I: IntoIterator<Item = RawRow>,
    R: Rng,
{
    load_source(SourceKind::Housing, rows, |field, guid| {
        repairer.repair(field, guid, geography)
    })
}

/// Load income rows
pub fn load_income<I, R>(rows: I, repairer: &mut FieldRepairer<R>) -> LoadOutcome
where
    I: IntoIterator<Item = RawRow>,
    R: Rng,
{
    let no_geography = SourceMap::new();
    load_source(SourceKind::Income, rows, |field, guid| {
        repairer.repair(field, guid, &no_geography)
    })
}
