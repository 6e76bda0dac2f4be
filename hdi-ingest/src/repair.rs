//! Field repair for corrupted values
//!
//! Replacement values are placeholders, not estimates: numeric columns get a
//! uniform draw from a fixed range and zip codes are rebuilt from the
//! geography reference data. The random source is injected so tests can
//! seed it.

use crate::fields::Field;
use crate::record::{CleanRecord, SourceMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use tracing::debug;

/// Zip code used when geography cannot supply one
pub const DEFAULT_ZIP_CODE: i64 = 90000;

pub const MEDIAN_AGE_RANGE: RangeInclusive<i64> = 10..=50;
/// Shared by `total_rooms` and `total_bedrooms` (independent draws)
pub const ROOMS_RANGE: RangeInclusive<i64> = 1000..=2000;
pub const POPULATION_RANGE: RangeInclusive<i64> = 5000..=10000;
pub const HOUSEHOLDS_RANGE: RangeInclusive<i64> = 500..=2500;
pub const HOUSE_VALUE_RANGE: RangeInclusive<i64> = 100_000..=250_000;
pub const INCOME_RANGE: RangeInclusive<i64> = 100_000..=750_000;

/// Outcome of repairing one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// Use this value in place of the corrupted one
    Replaced(i64),
    /// The field cannot be repaired; the whole row must be discarded
    Drop,
    /// Descriptive text with no repair path; keep the value as read
    Keep,
}

/// Produces replacement values for corrupted fields
pub struct FieldRepairer<R = StdRng> {
    rng: R,
}

impl FieldRepairer<StdRng> {
    /// Repairer backed by an OS-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FieldRepairer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Repair one corrupted field of the record identified by `guid`
    ///
    /// `geography` is only consulted for `zip_code`. A corrupted identifier
    /// yields [`Repair::Drop`]; city, state and county are place names, so a
    /// four-letter value such as "Napa" is kept with [`Repair::Keep`].
    pub fn repair(&mut self, field: Field, guid: &str, geography: &SourceMap) -> Repair {
        match field {
            Field::Guid => Repair::Drop,
            Field::City | Field::State | Field::County => Repair::Keep,
            Field::ZipCode => Repair::Replaced(repair_zip_code(guid, geography)),
            Field::HousingMedianAge => self.draw(MEDIAN_AGE_RANGE),
            Field::TotalRooms | Field::TotalBedrooms => self.draw(ROOMS_RANGE),
            Field::Population => self.draw(POPULATION_RANGE),
            Field::Households => self.draw(HOUSEHOLDS_RANGE),
            Field::MedianHouseValue => self.draw(HOUSE_VALUE_RANGE),
            Field::MedianIncome => self.draw(INCOME_RANGE),
        }
    }

    fn draw(&mut self, range: RangeInclusive<i64>) -> Repair {
        Repair::Replaced(self.rng.gen_range(range))
    }
}

/// Rebuild a zip code from the geography entries sharing the record's city and state
///
/// Scans `geography` in identifier order; the first same-city, same-state
/// entry whose zip code reads as a non-negative integer wins and yields its
/// first digit followed by four zeros. Falls back to [`DEFAULT_ZIP_CODE`].
pub fn repair_zip_code(guid: &str, geography: &SourceMap) -> i64 {
    let Some(origin) = geography.get(guid) else {
        debug!(guid, "No geography entry for record, using default zip code");
        return DEFAULT_ZIP_CODE;
    };

    let (Some(city), Some(state)) = (origin.text(Field::City), origin.text(Field::State)) else {
        return DEFAULT_ZIP_CODE;
    };

    geography
        .values()
        .filter(|entry| {
            entry.text(Field::City) == Some(city) && entry.text(Field::State) == Some(state)
        })
        .find_map(leading_digit_zip)
        .unwrap_or(DEFAULT_ZIP_CODE)
}

fn leading_digit_zip(entry: &CleanRecord) -> Option<i64> {
    let zip = entry.get(Field::ZipCode)?.as_integer()?;
    if zip < 0 {
        return None;
    }
    let digit = zip.to_string().chars().next()?.to_digit(10)?;
    Some(i64::from(digit) * 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn geo(guid: &str, zip: &str, city: &str, state: &str) -> (String, CleanRecord) {
        let record = CleanRecord::new(guid)
            .with(Field::ZipCode, FieldValue::Text(zip.into()))
            .with(Field::City, FieldValue::Text(city.into()))
            .with(Field::State, FieldValue::Text(state.into()))
            .with(Field::County, FieldValue::Text("Sangamon".into()));
        (guid.to_string(), record)
    }

    fn springfield() -> SourceMap {
        [
            geo("A", "62701", "Springfield", "IL"),
            geo("B", "62704", "Springfield", "IL"),
        ]
        .into_iter()
        .collect()
    }

    fn seeded() -> FieldRepairer<StdRng> {
        FieldRepairer::new(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_zip_code_from_matching_city_state() {
        let mut repairer = seeded();
        assert_eq!(
            repairer.repair(Field::ZipCode, "A", &springfield()),
            Repair::Replaced(60000)
        );
    }

    #[test]
    fn test_zip_code_default_when_guid_unknown() {
        let mut repairer = seeded();
        assert_eq!(
            repairer.repair(Field::ZipCode, "missing", &springfield()),
            Repair::Replaced(DEFAULT_ZIP_CODE)
        );
        assert_eq!(repair_zip_code("A", &SourceMap::new()), 90000);
    }

    #[test]
    fn test_zip_code_skips_unparseable_entries() {
        let geography: SourceMap = [
            geo("A", "", "Springfield", "IL"),
            geo("B", "n/a", "Springfield", "IL"),
            geo("C", "-12", "Springfield", "IL"),
            geo("D", "73301", "Austin", "TX"),
            geo("E", "46201", "Springfield", "IL"),
        ]
        .into_iter()
        .collect();

        assert_eq!(repair_zip_code("A", &geography), 40000);
    }

    #[test]
    fn test_zip_code_default_when_no_entry_parses() {
        let geography: SourceMap = [
            geo("A", "", "Springfield", "IL"),
            geo("B", "73301", "Springfield", "MO"),
        ]
        .into_iter()
        .collect();

        assert_eq!(repair_zip_code("A", &geography), DEFAULT_ZIP_CODE);
    }

    #[test]
    fn test_zip_code_first_match_in_identifier_order() {
        let geography: SourceMap = [
            geo("m", "10001", "Portland", "OR"),
            geo("b", "80202", "Portland", "OR"),
            geo("z", "30301", "Portland", "OR"),
        ]
        .into_iter()
        .collect();

        // "b" sorts first
        assert_eq!(repair_zip_code("z", &geography), 80000);
        assert_eq!(repair_zip_code("m", &geography), 80000);
    }

    #[test]
    fn test_zip_code_leading_zeros_are_dropped() {
        let geography: SourceMap = [geo("A", "00501", "Holtsville", "NY")].into_iter().collect();
        assert_eq!(repair_zip_code("A", &geography), 50000);
    }

    #[test]
    fn test_identifier_drops_and_place_names_are_kept() {
        let mut repairer = seeded();
        let geography = springfield();
        assert_eq!(repairer.repair(Field::Guid, "A", &geography), Repair::Drop);
        for field in [Field::City, Field::State, Field::County] {
            assert_eq!(repairer.repair(field, "A", &geography), Repair::Keep, "{}", field);
        }
    }

    #[test]
    fn test_random_repairs_stay_in_bounds() {
        let mut repairer = seeded();
        let geography = SourceMap::new();
        let cases = [
            (Field::HousingMedianAge, MEDIAN_AGE_RANGE),
            (Field::TotalRooms, ROOMS_RANGE),
            (Field::TotalBedrooms, ROOMS_RANGE),
            (Field::Population, POPULATION_RANGE),
            (Field::Households, HOUSEHOLDS_RANGE),
            (Field::MedianHouseValue, HOUSE_VALUE_RANGE),
            (Field::MedianIncome, INCOME_RANGE),
        ];

        for (field, range) in cases {
            for _ in 0..2000 {
                match repairer.repair(field, "g", &geography) {
                    Repair::Replaced(value) => assert!(
                        range.contains(&value),
                        "{} repaired to {} outside {:?}",
                        field,
                        value,
                        range
                    ),
                    other => panic!("{} must be replaced, got {:?}", field, other),
                }
            }
        }
    }

    #[test]
    fn test_random_repairs_reach_both_ends() {
        let mut repairer = seeded();
        let geography = SourceMap::new();
        let values: Vec<i64> = (0..5000)
            .filter_map(|_| match repairer.repair(Field::HousingMedianAge, "g", &geography) {
                Repair::Replaced(v) => Some(v),
                Repair::Drop | Repair::Keep => None,
            })
            .collect();

        assert!(values.contains(&10), "lower bound is inclusive");
        assert!(values.contains(&50), "upper bound is inclusive");
    }

    #[test]
    fn test_same_seed_same_repairs() {
        let geography = SourceMap::new();
        let mut a = FieldRepairer::new(StdRng::seed_from_u64(42));
        let mut b = FieldRepairer::new(StdRng::seed_from_u64(42));

        for _ in 0..100 {
            assert_eq!(
                a.repair(Field::Population, "g", &geography),
                b.repair(Field::Population, "g", &geography)
            );
        }
    }
}
