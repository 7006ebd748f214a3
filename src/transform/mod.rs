pub mod collate;
pub mod dates;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::CertificateRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Institution,
    Title,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Date, SortKey::Institution, SortKey::Title];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "date" | "fecha" => Some(Self::Date),
            "institution" | "institucion" | "institución" => Some(Self::Institution),
            "title" | "titulo" | "título" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Institution => "institution",
            Self::Title => "title",
        }
    }

    /// Label of the matching sort control.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Fecha",
            Self::Institution => "Institución",
            Self::Title => "Título",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("invalid sort key '{s}', expected date, institution or title")
        })
    }
}

/// Records sharing one category, in first-seen order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub name: &'a str,
    pub records: Vec<&'a CertificateRecord>,
}

/// Partitions records by category.
///
/// Groups come out in the order their category first appears; records keep
/// their relative input order inside each group.
pub fn group_by_category(records: &[CertificateRecord]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for record in records {
        let key = record.category_key();
        match groups.iter_mut().find(|g| g.name == key) {
            Some(group) => group.records.push(record),
            None => groups.push(CategoryGroup {
                name: key,
                records: vec![record],
            }),
        }
    }
    groups
}

/// Groups records and orders the groups by category name.
pub fn grouped_for_display(records: &[CertificateRecord]) -> Vec<CategoryGroup<'_>> {
    let mut groups = group_by_category(records);
    groups.sort_by(|a, b| collate::compare(a.name, b.name));
    groups
}

fn compare_dates_desc(a: &CertificateRecord, b: &CertificateRecord) -> Ordering {
    let da = a.date_text().and_then(dates::parse_date).map(|d| d.instant);
    let db = b.date_text().and_then(dates::parse_date).map(|d| d.instant);
    // None < Some, so reversing puts undated records last.
    db.cmp(&da)
}

pub fn compare_records(key: SortKey, a: &CertificateRecord, b: &CertificateRecord) -> Ordering {
    match key {
        SortKey::Date => compare_dates_desc(a, b),
        SortKey::Institution => collate::compare(&a.institution, &b.institution),
        SortKey::Title => collate::compare(&a.title, &b.title),
    }
}

/// Sorts in place; stable, so equal keys keep their current order.
pub fn sort_records(records: &mut [CertificateRecord], key: SortKey) {
    records.sort_by(|a, b| compare_records(key, a, b));
}

/// Returns a sorted copy of `records`.
pub fn sorted(records: &[CertificateRecord], key: SortKey) -> Vec<CertificateRecord> {
    let mut out = records.to_vec();
    sort_records(&mut out, key);
    out
}
