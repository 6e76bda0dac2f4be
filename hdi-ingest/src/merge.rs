//! Merge-and-load: three-way join by identifier and per-entry persistence
//!
//! Only identifiers present in all three cleaned maps produce an entry.
//! Nothing here aborts the run: join misses are skipped and rejected writes
//! are rolled back and counted.

use crate::fields::Field;
use crate::record::{CleanRecord, SourceMap};
use crate::store::RecordStore;
use hdi_common::db::HousingEntry;
use thiserror::Error;
use tracing::{debug, info};

/// Counts from one merge-and-load pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries committed to the store
    pub persisted: usize,
    /// Entries that could not be assembled or were rejected by the store
    pub failed: usize,
    /// Housing identifiers missing from the income or geography map
    pub unmatched: usize,
}

/// Why a joined identifier could not become a [`HousingEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("{guid}: field {field} is missing")]
    MissingField { guid: String, field: Field },

    #[error("{guid}: field {field} is not an integer ('{value}')")]
    NotInteger {
        guid: String,
        field: Field,
        value: String,
    },
}

/// Build the persisted entry from the three records sharing `guid`
pub fn assemble_entry(
    guid: &str,
    housing: &CleanRecord,
    income: &CleanRecord,
    geography: &CleanRecord,
) -> Result<HousingEntry, AssemblyError> {
    let integer = |record: &CleanRecord, field: Field| -> Result<i64, AssemblyError> {
        let value = record.get(field).ok_or_else(|| AssemblyError::MissingField {
            guid: guid.to_string(),
            field,
        })?;
        value.as_integer().ok_or_else(|| AssemblyError::NotInteger {
            guid: guid.to_string(),
            field,
            value: value.as_text().into_owned(),
        })
    };
    let text = |record: &CleanRecord, field: Field| -> Result<String, AssemblyError> {
        record
            .get(field)
            .map(|value| value.as_text().into_owned())
            .ok_or_else(|| AssemblyError::MissingField {
                guid: guid.to_string(),
                field,
            })
    };

    Ok(HousingEntry {
        guid: guid.to_string(),
        zip_code: integer(housing, Field::ZipCode)?,
        city: text(geography, Field::City)?,
        state: text(geography, Field::State)?,
        county: text(geography, Field::County)?,
        median_age: integer(housing, Field::HousingMedianAge)?,
        total_rooms: integer(housing, Field::TotalRooms)?,
        total_bedrooms: integer(housing, Field::TotalBedrooms)?,
        population: integer(housing, Field::Population)?,
        households: integer(housing, Field::Households)?,
        median_income: integer(income, Field::MedianIncome)?,
        median_house_value: integer(housing, Field::MedianHouseValue)?,
    })
}

/// Join the three maps and persist one entry per common identifier
///
/// Walks `housing` in identifier order. The maps are only read.
pub async fn merge_and_load<S>(
    housing: &SourceMap,
    income: &SourceMap,
    geography: &SourceMap,
    store: &S,
) -> MergeOutcome
where
    S: RecordStore + ?Sized,
{
    let mut outcome = MergeOutcome::default();

    for (guid, housing_record) in housing {
        let (Some(income_record), Some(geography_record)) = (income.get(guid), geography.get(guid))
        else {
            outcome.unmatched += 1;
            continue;
        };

        let entry = match assemble_entry(guid, housing_record, income_record, geography_record) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(guid = %guid, error = %e, "Skipping entry that cannot be assembled");
                outcome.failed += 1;
                continue;
            }
        };

        match store.insert(&entry).await {
            Ok(()) => outcome.persisted += 1,
            Err(e) => {
                debug!(guid = %guid, error = %e, "Store rejected entry, skipped");
                outcome.failed += 1;
            }
        }
    }

    info!(
        persisted = outcome.persisted,
        failed = outcome.failed,
        unmatched = outcome.unmatched,
        "Merge and load complete"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use async_trait::async_trait;
    use hdi_common::{Error, Result};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory store; rejects identifiers listed in `reject`
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<Vec<HousingEntry>>,
        reject: HashSet<String>,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn clear(&self) -> Result<u64> {
            let mut entries = self.entries.lock().unwrap();
            let n = entries.len() as u64;
            entries.clear();
            Ok(n)
        }

        async fn insert(&self, entry: &HousingEntry) -> Result<()> {
            if self.reject.contains(&entry.guid) {
                return Err(Error::InvalidInput("constraint violation".into()));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn sum_bedrooms_above(&self, _rooms: i64) -> Result<i64> {
            Ok(0)
        }

        async fn average_income_for_zip(&self, _zip_code: i64) -> Result<f64> {
            Ok(0.0)
        }
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    fn housing(guid: &str) -> CleanRecord {
        CleanRecord::new(guid)
            .with(Field::ZipCode, text("62701"))
            .with(Field::HousingMedianAge, text("30"))
            .with(Field::TotalRooms, FieldValue::Repaired(1500))
            .with(Field::TotalBedrooms, text("300"))
            .with(Field::Population, text("7000"))
            .with(Field::Households, text("900"))
            .with(Field::MedianHouseValue, text("200000"))
    }

    fn income(guid: &str) -> CleanRecord {
        CleanRecord::new(guid).with(Field::MedianIncome, text("55000"))
    }

    fn geography(guid: &str) -> CleanRecord {
        CleanRecord::new(guid)
            .with(Field::ZipCode, text("62704"))
            .with(Field::City, text("Springfield"))
            .with(Field::State, text("IL"))
            .with(Field::County, text("Sangamon"))
    }

    fn map(records: Vec<CleanRecord>) -> SourceMap {
        records.into_iter().map(|r| (r.guid.clone(), r)).collect()
    }

    #[test]
    fn test_assemble_takes_zip_from_housing() {
        let entry = assemble_entry("X", &housing("X"), &income("X"), &geography("X")).unwrap();

        assert_eq!(entry.zip_code, 62701);
        assert_eq!(entry.city, "Springfield");
        assert_eq!(entry.county, "Sangamon");
        assert_eq!(entry.total_rooms, 1500);
        assert_eq!(entry.median_income, 55000);
        assert_eq!(entry.median_house_value, 200000);
    }

    #[test]
    fn test_assemble_rejects_non_integer_text() {
        let bad = housing("X").with(Field::Population, text("7,000"));

        let err = assemble_entry("X", &bad, &income("X"), &geography("X")).unwrap_err();

        assert_eq!(
            err,
            AssemblyError::NotInteger {
                guid: "X".into(),
                field: Field::Population,
                value: "7,000".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_only_common_identifiers_are_merged() {
        let store = MemoryStore::default();

        let outcome = merge_and_load(
            &map(vec![housing("X"), housing("Y")]),
            &map(vec![income("X")]),
            &map(vec![geography("X"), geography("Y")]),
            &store,
        )
        .await;

        assert_eq!(
            outcome,
            MergeOutcome {
                persisted: 1,
                failed: 0,
                unmatched: 1
            }
        );
        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].guid, "X");
    }

    #[tokio::test]
    async fn test_missing_geography_is_skipped() {
        let store = MemoryStore::default();

        let outcome = merge_and_load(
            &map(vec![housing("X")]),
            &map(vec![income("X")]),
            &SourceMap::new(),
            &store,
        )
        .await;

        assert_eq!(outcome.persisted, 0);
        assert_eq!(outcome.unmatched, 1);
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn test_rejected_write_does_not_stop_the_pass() {
        let store = MemoryStore {
            reject: ["A".to_string()].into_iter().collect(),
            ..MemoryStore::default()
        };
        let ids = ["A", "B", "C"];

        let outcome = merge_and_load(
            &map(ids.iter().map(|g| housing(g)).collect()),
            &map(ids.iter().map(|g| income(g)).collect()),
            &map(ids.iter().map(|g| geography(g)).collect()),
            &store,
        )
        .await;

        assert_eq!(outcome.persisted, 2);
        assert_eq!(outcome.failed, 1);
        let guids: Vec<String> = store
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.guid.clone())
            .collect();
        assert_eq!(guids, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_unassemblable_entry_counts_as_failed() {
        let store = MemoryStore::default();
        let bad = housing("X").with(Field::TotalBedrooms, text(""));

        let outcome = merge_and_load(
            &map(vec![bad]),
            &map(vec![income("X")]),
            &map(vec![geography("X")]),
            &store,
        )
        .await;

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.persisted, 0);
        assert!(store.entries.lock().unwrap().is_empty());
    }
}
