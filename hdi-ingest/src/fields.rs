//! Source kinds and the columns each one carries

use std::fmt;

/// A known column across the three source feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Guid,
    ZipCode,
    HousingMedianAge,
    TotalRooms,
    TotalBedrooms,
    Population,
    Households,
    MedianHouseValue,
    MedianIncome,
    City,
    State,
    County,
}

impl Field {
    /// Column name as it appears in the CSV header
    pub fn column(self) -> &'static str {
        match self {
            Field::Guid => "guid",
            Field::ZipCode => "zip_code",
            Field::HousingMedianAge => "housing_median_age",
            Field::TotalRooms => "total_rooms",
            Field::TotalBedrooms => "total_bedrooms",
            Field::Population => "population",
            Field::Households => "households",
            Field::MedianHouseValue => "median_house_value",
            Field::MedianIncome => "median_income",
            Field::City => "city",
            Field::State => "state",
            Field::County => "county",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The three feeds joined by the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Housing,
    Income,
    Geography,
}

impl SourceKind {
    /// Columns read from this source, identifier first
    pub fn fields(self) -> &'static [Field] {
        match self {
            SourceKind::Housing => &[
                Field::Guid,
                Field::ZipCode,
                Field::HousingMedianAge,
                Field::TotalRooms,
                Field::TotalBedrooms,
                Field::Population,
                Field::Households,
                Field::MedianHouseValue,
            ],
            SourceKind::Income => &[Field::Guid, Field::MedianIncome],
            SourceKind::Geography => &[
                Field::Guid,
                Field::ZipCode,
                Field::City,
                Field::State,
                Field::County,
            ],
        }
    }

    /// Label used in progress output ("Housing", "Income", "ZIP")
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Housing => "Housing",
            SourceKind::Income => "Income",
            SourceKind::Geography => "ZIP",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_source_starts_with_guid() {
        for kind in [SourceKind::Housing, SourceKind::Income, SourceKind::Geography] {
            assert_eq!(kind.fields()[0], Field::Guid, "{} schema", kind);
        }
    }

    #[test]
    fn test_column_names_match_headers() {
        assert_eq!(Field::HousingMedianAge.column(), "housing_median_age");
        assert_eq!(Field::MedianHouseValue.to_string(), "median_house_value");
    }
}
