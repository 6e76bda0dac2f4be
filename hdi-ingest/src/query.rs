//! Query stage: aggregate lookups over persisted entries and their report lines

use crate::store::RecordStore;
use hdi_common::Result;
use tracing::debug;

/// Read-only aggregate queries against a [`RecordStore`]
pub struct QueryStage<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> QueryStage<'a, S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Total bedrooms over entries with more than `rooms` rooms (0 if none)
    pub async fn total_bedrooms_above(&self, rooms: i64) -> Result<i64> {
        let total = self.store.sum_bedrooms_above(rooms).await?;
        debug!(rooms, total, "Bedroom total query");
        Ok(total)
    }

    /// Average median income for `zip_code` (0 if no entry has it)
    pub async fn average_income_for_zip(&self, zip_code: i64) -> Result<f64> {
        let average = self.store.average_income_for_zip(zip_code).await?;
        debug!(zip_code, average, "Median income query");
        Ok(average)
    }
}

/// Two-line report for the bedroom total
pub fn bedrooms_report(rooms: i64, total_bedrooms: i64) -> String {
    format!(
        "For locations with more than {} rooms, there are a total of\n{} bedrooms.",
        rooms, total_bedrooms
    )
}

/// Report line for the average income; the average is truncated toward zero
pub fn income_report(zip_code: i64, average_income: f64) -> String {
    format!(
        "The median household income for ZIP code {} is {}.",
        zip_code,
        format_thousands(average_income.trunc() as i64)
    )
}

/// Render an integer with comma thousands separators ("1,234,567")
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
