//! The fixed-shape record written for every extracted detail page

use std::fmt;
use thiserror::Error;

/// Number of fields in a record
pub const FIELD_COUNT: usize = 12;

/// Column headers in store order
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "Title",
    "Introduction",
    "Category",
    "Version",
    "Size",
    "Last Updated",
    "App Link",
    "Download_link",
    "Image_link",
    "Other_pics_link",
    "Developer",
    "Crawl Time",
];

/// One named field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Introduction,
    Category,
    Version,
    Size,
    LastUpdated,
    AppLink,
    DownloadLink,
    ImageLink,
    OtherPicsLink,
    Developer,
    CrawlTime,
}

impl Field {
    /// All fields in column order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Title,
        Field::Introduction,
        Field::Category,
        Field::Version,
        Field::Size,
        Field::LastUpdated,
        Field::AppLink,
        Field::DownloadLink,
        Field::ImageLink,
        Field::OtherPicsLink,
        Field::Developer,
        Field::CrawlTime,
    ];

    /// Column position of this field
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column header for this field
    pub fn header(self) -> &'static str {
        COLUMNS[self.index()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A record was built while a field was still unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record field '{0}' was never set")]
pub struct UnsetField(pub Field);

/// A complete record, one value per column
///
/// Only `RecordBuilder::build` creates records, so every field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: [String; FIELD_COUNT],
}

impl Record {
    /// Value of one field
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Values in column order
    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }

    /// (header, value) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        COLUMNS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Accumulates field values until every column is set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBuilder {
    values: [Option<String>; FIELD_COUNT],
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> &mut Self {
        self.values[field.index()] = Some(value.into());
        self
    }

    /// By-value variant of `set` for chaining
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.values[field.index()].is_some()
    }

    /// Fields not yet set, in column order
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.is_set(*f))
            .collect()
    }

    /// Builds the record, failing on the first unset field
    pub fn build(self) -> Result<Record, UnsetField> {
        if let Some(field) = self.missing().first() {
            return Err(UnsetField(*field));
        }
        let values = self.values.map(Option::unwrap_or_default);
        Ok(Record { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> RecordBuilder {
        Field::ALL
            .into_iter()
            .fold(RecordBuilder::new(), |b, f| b.with(f, format!("value of {}", f)))
    }

    #[test]
    fn test_columns_match_fields() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(field.header(), COLUMNS[i]);
        }
        assert_eq!(Field::LastUpdated.header(), "Last Updated");
        assert_eq!(Field::OtherPicsLink.header(), "Other_pics_link");
    }

    #[test]
    fn test_build_complete_record() {
        let record = full_builder().build().unwrap();
        assert_eq!(record.get(Field::Title), "value of Title");
        assert_eq!(record.get(Field::CrawlTime), "value of Crawl Time");
        assert_eq!(record.iter().count(), FIELD_COUNT);
    }

    #[test]
    fn test_build_refuses_unset_field() {
        let mut builder = RecordBuilder::new();
        builder
            .set(Field::Title, "Some App")
            .set(Field::Introduction, "An app");

        let missing = builder.missing();
        assert_eq!(missing.len(), FIELD_COUNT - 2);
        assert_eq!(missing[0], Field::Category);

        assert_eq!(builder.build().unwrap_err(), UnsetField(Field::Category));
    }

    #[test]
    fn test_empty_string_counts_as_set() {
        let record = full_builder()
            .with(Field::OtherPicsLink, "")
            .build()
            .unwrap();
        assert_eq!(record.get(Field::OtherPicsLink), "");
    }

    #[test]
    fn test_set_replaces_value() {
        let record = full_builder().with(Field::Size, "12MB").build().unwrap();
        assert_eq!(record.get(Field::Size), "12MB");
    }
}
