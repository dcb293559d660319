use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ROOM_NO: &str = "Room No";
pub const TOWER: &str = "Tower";
pub const DAMAGES_FOUND: &str = "Damages Found";
pub const SEVERITY_SCORE: &str = "Severity Score";
pub const IMAGE_URL: &str = "Image URL";

/// Columns that are mapped onto dedicated [`Report`] fields.
pub const KNOWN_COLUMNS: [&str; 5] = [ROOM_NO, TOWER, DAMAGES_FOUND, SEVERITY_SCORE, IMAGE_URL];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column without a dedicated field
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fraction ("3.0"), so the value reads back as a float.
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Text form of the cell, `None` for nulls.
    pub fn into_text(self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Report – one row of the inspection table
// ---------------------------------------------------------------------------

/// A single damage inspection report (one row of the source table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub room_no: Option<String>,
    pub tower: Option<String>,
    /// Raw comma-separated damage descriptors as written by the inspector.
    pub damages_found: Option<String>,
    /// Descriptors parsed out of `damages_found`, in source order.
    pub damage_types: Vec<String>,
    pub severity_score: Option<f64>,
    pub image_url: Option<String>,
    /// Any further source columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Report {
    /// Build a report from already-typed fields, deriving `damage_types`.
    pub fn new(
        room_no: Option<String>,
        tower: Option<String>,
        damages_found: Option<String>,
        severity_score: Option<f64>,
        image_url: Option<String>,
    ) -> Self {
        let damage_types = parse_damage_types(damages_found.as_deref());
        Report {
            room_no,
            tower,
            damages_found,
            damage_types,
            severity_score,
            image_url,
            extra: BTreeMap::new(),
        }
    }

    /// Text value of a column for display and export. Missing values are `None`.
    pub fn cell_text(&self, column: &str) -> Option<String> {
        match column {
            ROOM_NO => self.room_no.clone(),
            TOWER => self.tower.clone(),
            DAMAGES_FOUND => self.damages_found.clone(),
            SEVERITY_SCORE => self.severity_score.map(|s| s.to_string()),
            IMAGE_URL => self.image_url.clone(),
            other => self.extra.get(other).cloned().and_then(CellValue::into_text),
        }
    }

    /// The image link, if present and non-empty.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Split a "damages found" string into trimmed, non-empty descriptors.
///
/// `"Water leak,  Cracked wall ,"` → `["Water leak", "Cracked wall"]`.
/// Duplicates are kept; a missing value yields an empty list.
pub fn parse_damage_types(damages_found: Option<&str>) -> Vec<String> {
    damages_found
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered, read-only collection of reports plus the source column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All reports (rows), in source order.
    pub reports: Vec<Report>,
    /// Column names present in the source, in source order.
    pub columns: Vec<String>,
}

impl Dataset {
    pub fn new(reports: Vec<Report>, columns: Vec<String>) -> Self {
        Dataset { reports, columns }
    }

    /// A dataset with no rows and no columns.
    pub fn empty() -> Self {
        Dataset::default()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Whether the source had a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Sorted set of tower labels present in the data (missing towers skipped).
    pub fn tower_values(&self) -> BTreeSet<String> {
        self.reports.iter().filter_map(|r| r.tower.clone()).collect()
    }

    /// Sorted set of every damage type that occurs in at least one report.
    pub fn damage_type_values(&self) -> BTreeSet<String> {
        self.reports
            .iter()
            .flat_map(|r| r.damage_types.iter().cloned())
            .collect()
    }

    /// `(min, max)` of the severity scores, `None` when no report has one.
    pub fn severity_bounds(&self) -> Option<(f64, f64)> {
        if !self.has_column(SEVERITY_SCORE) {
            return None;
        }
        self.reports
            .iter()
            .filter_map(|r| r.severity_score)
            .filter(|s| !s.is_nan())
            .fold(None, |acc, s| match acc {
                None => Some((s, s)),
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
            })
    }

    /// A new dataset holding the rows at `indices` (in the given order).
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            reports: indices
                .iter()
                .filter_map(|&i| self.reports.get(i).cloned())
                .collect(),
            columns: self.columns.clone(),
        }
    }
}
