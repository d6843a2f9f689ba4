//! Canonical record schema and column names

use std::fmt;
use std::str::FromStr;

/// One output column. The string form is also the CSV header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    DateExtracted,
    Unit,
    Resource,
    Location,
    InstructionalMoment,
    PageNumbers,
    ImprovementDescription,
    ImprovementType,
    DateUpdated,
}

impl Column {
    /// Canonical column order
    pub const ALL: [Column; 9] = [
        Column::DateExtracted,
        Column::Unit,
        Column::Resource,
        Column::Location,
        Column::InstructionalMoment,
        Column::PageNumbers,
        Column::ImprovementDescription,
        Column::ImprovementType,
        Column::DateUpdated,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Column::DateExtracted => "Date_Extracted",
            Column::Unit => "Unit",
            Column::Resource => "Resource",
            Column::Location => "Location",
            Column::InstructionalMoment => "Instructional_Moment",
            Column::PageNumbers => "Page_Numbers",
            Column::ImprovementDescription => "Improvement_Description",
            Column::ImprovementType => "Improvement_Type",
            Column::DateUpdated => "Date_Updated",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a configured column name is not part of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown column '{}', expected one of: {}",
            self.0,
            Column::ALL.map(Column::as_str).join(", ")
        )
    }
}

impl std::error::Error for UnknownColumn {}

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| UnknownColumn(trimmed.to_string()))
    }
}

/// A normalized errata record.
///
/// Produced only by the normalizer (or read back from an existing dataset)
/// and never mutated afterwards; fields are exposed through getters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrataRecord {
    pub(crate) date_extracted: String,
    pub(crate) unit: String,
    pub(crate) resource: String,
    pub(crate) location: String,
    pub(crate) instructional_moment: String,
    pub(crate) page_numbers: String,
    pub(crate) improvement_description: String,
    pub(crate) improvement_type: String,
    pub(crate) date_updated: String,
}

impl ErrataRecord {
    #[must_use]
    pub fn date_extracted(&self) -> &str {
        &self.date_extracted
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn instructional_moment(&self) -> &str {
        &self.instructional_moment
    }

    #[must_use]
    pub fn page_numbers(&self) -> &str {
        &self.page_numbers
    }

    #[must_use]
    pub fn improvement_description(&self) -> &str {
        &self.improvement_description
    }

    #[must_use]
    pub fn improvement_type(&self) -> &str {
        &self.improvement_type
    }

    #[must_use]
    pub fn date_updated(&self) -> &str {
        &self.date_updated
    }

    /// Value of a single column
    #[must_use]
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::DateExtracted => &self.date_extracted,
            Column::Unit => &self.unit,
            Column::Resource => &self.resource,
            Column::Location => &self.location,
            Column::InstructionalMoment => &self.instructional_moment,
            Column::PageNumbers => &self.page_numbers,
            Column::ImprovementDescription => &self.improvement_description,
            Column::ImprovementType => &self.improvement_type,
            Column::DateUpdated => &self.date_updated,
        }
    }

    /// Build a record from a header/row pair of an existing dataset.
    /// Columns missing from the header read as empty.
    pub(crate) fn from_columns<'a>(
        pairs: impl IntoIterator<Item = (Column, &'a str)>,
    ) -> Self {
        let mut record = ErrataRecord::default();
        for (column, value) in pairs {
            let slot = match column {
                Column::DateExtracted => &mut record.date_extracted,
                Column::Unit => &mut record.unit,
                Column::Resource => &mut record.resource,
                Column::Location => &mut record.location,
                Column::InstructionalMoment => &mut record.instructional_moment,
                Column::PageNumbers => &mut record.page_numbers,
                Column::ImprovementDescription => &mut record.improvement_description,
                Column::ImprovementType => &mut record.improvement_type,
                Column::DateUpdated => &mut record.date_updated,
            };
            *slot = value.to_string();
        }
        record
    }

    /// Copy holding only `columns`, the rest left empty. This is the record
    /// as it reads back from a dataset written with those columns.
    #[must_use]
    pub fn project(&self, columns: &[Column]) -> Self {
        ErrataRecord::from_columns(columns.iter().map(|c| (*c, self.get(*c))))
    }

    /// Identity used for deduplication. `Date_Extracted` is excluded so a
    /// re-extraction of the same erratum is recognised as a duplicate.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            unit: self.unit.clone(),
            resource: self.resource.clone(),
            location: self.location.clone(),
            improvement_description: self.improvement_description.clone(),
            date_updated: self.date_updated.clone(),
        }
    }
}

/// Identity tuple (Unit, Resource, Location, Improvement_Description, Date_Updated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    unit: String,
    resource: String,
    location: String,
    improvement_description: String,
    date_updated: String,
}
