use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::model::{Dataset, SEVERITY_SCORE};

/// How many damage types the overview chart shows.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Damage-type frequency
// ---------------------------------------------------------------------------

/// Count every damage type across the reports and return the `top_n` most
/// frequent as `(label, count)`, highest first.
///
/// Each report contributes once per listed type, so a label repeated within
/// one report is counted twice. Equal counts keep the order in which the
/// labels were first seen.
pub fn aggregate_damage_frequency(filtered: &Dataset, top_n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for label in filtered.reports.iter().flat_map(|r| r.damage_types.iter()) {
        match slot.get(label.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                slot.insert(label.as_str(), order.len());
                order.push((label.as_str(), 1));
            }
        }
    }

    // Stable sort: ties stay in first-seen order.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(top_n)
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

// ---------------------------------------------------------------------------
// Per-room and per-tower views
// ---------------------------------------------------------------------------

/// The `top_n` rooms with the highest severity score, as `(room, score)`.
///
/// A room reported more than once counts with its highest score. Reports
/// without a room number or a score are skipped; equal scores keep
/// first-seen order.
pub fn top_severity_rooms(filtered: &Dataset, top_n: usize) -> Vec<(String, f64)> {
    let mut order: Vec<(&str, f64)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for report in &filtered.reports {
        let (Some(room), Some(score)) = (report.room_no.as_deref(), report.severity_score) else {
            continue;
        };
        match slot.get(room) {
            Some(&i) => order[i].1 = order[i].1.max(score),
            None => {
                slot.insert(room, order.len());
                order.push((room, score));
            }
        }
    }

    order.sort_by(|a, b| b.1.total_cmp(&a.1));
    order
        .into_iter()
        .take(top_n)
        .map(|(room, score)| (room.to_string(), score))
        .collect()
}

/// Distinct rooms surveyed in each tower, sorted by tower label.
///
/// Reports without a tower or a room number are not counted.
pub fn rooms_per_tower(filtered: &Dataset) -> Vec<(String, usize)> {
    let mut rooms: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for report in &filtered.reports {
        if let (Some(tower), Some(room)) = (report.tower.as_deref(), report.room_no.as_deref()) {
            rooms.entry(tower).or_default().insert(room);
        }
    }
    rooms
        .into_iter()
        .map(|(tower, set)| (tower.to_string(), set.len()))
        .collect()
}

/// A room together with the distinct damage types found across its reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDamageVariety {
    pub room_no: String,
    /// Distinct labels in first-seen order.
    pub damage_types: Vec<String>,
}

impl RoomDamageVariety {
    pub fn count(&self) -> usize {
        self.damage_types.len()
    }
}

/// The `top_n` rooms with the most distinct damage types, most first.
///
/// Rooms without any damage type are left out; ties keep first-seen order.
pub fn rooms_by_damage_variety(filtered: &Dataset, top_n: usize) -> Vec<RoomDamageVariety> {
    let mut order: Vec<RoomDamageVariety> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for report in &filtered.reports {
        let Some(room) = report.room_no.as_deref() else {
            continue;
        };
        if report.damage_types.is_empty() {
            continue;
        }
        let i = *slot.entry(room).or_insert_with(|| {
            order.push(RoomDamageVariety {
                room_no: room.to_string(),
                damage_types: Vec::new(),
            });
            order.len() - 1
        });
        for label in &report.damage_types {
            if !order[i].damage_types.contains(label) {
                order[i].damage_types.push(label.clone());
            }
        }
    }

    order.sort_by(|a, b| b.count().cmp(&a.count()));
    order.truncate(top_n);
    order
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Overview numbers shown above the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_reports: usize,
    /// Mean of the present scores; `None` without a severity column or scores.
    pub avg_severity: Option<f64>,
    /// Distinct room numbers (missing ones not counted).
    pub unique_rooms: usize,
}

impl Summary {
    pub fn of(filtered: &Dataset) -> Self {
        let avg_severity = if filtered.has_column(SEVERITY_SCORE) {
            let scores: Vec<f64> = filtered
                .reports
                .iter()
                .filter_map(|r| r.severity_score)
                .collect();
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
        } else {
            None
        };

        let unique_rooms = filtered
            .reports
            .iter()
            .filter_map(|r| r.room_no.as_deref())
            .collect::<BTreeSet<_>>()
            .len();

        Summary {
            total_reports: filtered.len(),
            avg_severity,
            unique_rooms,
        }
    }
}
