//! Database models

/// One row of the `housing` table
///
/// Built only for identifiers present in all three cleaned sources. The
/// zip code comes from the housing source, the location names from the
/// geography source and the income from the income source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HousingEntry {
    pub guid: String,
    pub zip_code: i64,
    pub city: String,
    pub state: String,
    pub county: String,
    pub median_age: i64,
    pub total_rooms: i64,
    pub total_bedrooms: i64,
    pub population: i64,
    pub households: i64,
    pub median_income: i64,
    pub median_house_value: i64,
}
