//! Import pipeline: clear, load the three sources, merge and persist
//!
//! One linear pass per run. Geography is loaded first because housing zip
//! code repair reads it.

use crate::feeds::{read_feed, RawRow};
use crate::fields::SourceKind;
use crate::loader::{load_geography, load_housing, load_income, LoadOutcome};
use crate::merge::{merge_and_load, MergeOutcome};
use crate::repair::FieldRepairer;
use crate::store::RecordStore;
use hdi_common::config::ImportPaths;
use hdi_common::Result;
use rand::Rng;
use tracing::info;

/// Raw rows of all three feeds
#[derive(Debug, Clone, Default)]
pub struct SourceRows {
    pub housing: Vec<RawRow>,
    pub income: Vec<RawRow>,
    pub geography: Vec<RawRow>,
}

impl SourceRows {
    /// Read every feed; any unreadable or malformed file fails the run
    pub fn read(paths: &ImportPaths) -> Result<Self> {
        Ok(Self {
            geography: read_feed(&paths.zip_file, SourceKind::Geography)?,
            housing: read_feed(&paths.housing_file, SourceKind::Housing)?,
            income: read_feed(&paths.income_file, SourceKind::Income)?,
        })
    }
}

/// Per-source loading counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub retained: usize,
    pub dropped: usize,
    pub repaired: usize,
}

impl From<&LoadOutcome> for SourceCounts {
    fn from(outcome: &LoadOutcome) -> Self {
        Self {
            retained: outcome.retained,
            dropped: outcome.dropped,
            repaired: outcome.repaired,
        }
    }
}

/// What one import run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries removed from the store before loading
    pub cleared: u64,
    pub housing: SourceCounts,
    pub income: SourceCounts,
    pub geography: SourceCounts,
    pub merge: MergeOutcome,
}

impl ImportSummary {
    pub fn counts(&self, kind: SourceKind) -> SourceCounts {
        match kind {
            SourceKind::Housing => self.housing,
            SourceKind::Income => self.income,
            SourceKind::Geography => self.geography,
        }
    }
}

/// Run one full import against `store`
///
/// Only a failure to clear the store is returned as an error; row-level
/// problems are absorbed and show up in the counts.
pub async fn run_import<S, R>(
    store: &S,
    rows: SourceRows,
    repairer: &mut FieldRepairer<R>,
) -> Result<ImportSummary>
where
    S: RecordStore + ?Sized,
    R: Rng,
{
    let cleared = store.clear().await?;
    info!(cleared, "Cleared housing table");

    let SourceRows {
        housing,
        income,
        geography,
    } = rows;

    let geography = load_geography(geography);
    let housing = load_housing(housing, repairer, &geography.records);
    let income = load_income(income, repairer);

    let merge = merge_and_load(
        &housing.records,
        &income.records,
        &geography.records,
        store,
    )
    .await;

    let summary = ImportSummary {
        cleared,
        housing: SourceCounts::from(&housing),
        income: SourceCounts::from(&income),
        geography: SourceCounts::from(&geography),
        merge,
    };

    info!(
        housing = summary.housing.retained,
        income = summary.income.retained,
        geography = summary.geography.retained,
        persisted = summary.merge.persisted,
        "Import completed"
    );

    Ok(summary)
}
