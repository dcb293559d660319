use std::collections::BTreeSet;

use super::model::{Dataset, Report, SEVERITY_SCORE};

// ---------------------------------------------------------------------------
// Filter criteria: what the user selected for one evaluation
// ---------------------------------------------------------------------------

/// The user's filter selections. Built by the caller and passed explicitly;
/// nothing here is global.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against room number or damages.
    /// Empty means no text filter.
    pub query: String,
    /// `None` → no tower filter. `Some(empty)` → nothing selected → no rows.
    pub towers: Option<BTreeSet<String>>,
    /// Empty → no damage-type filter.
    pub damage_types: BTreeSet<String>,
    /// Inclusive `(min, max)` severity bounds.
    pub severity_range: Option<(f64, f64)>,
}

impl FilterCriteria {
    /// Criteria with every tower selected and the full severity range, i.e.
    /// the selection a freshly loaded dashboard starts from.
    ///
    /// Data without any tower label gets no tower filter at all.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let towers = dataset.tower_values();
        FilterCriteria {
            query: String::new(),
            towers: (!towers.is_empty()).then_some(towers),
            damage_types: BTreeSet::new(),
            severity_range: dataset.severity_bounds(),
        }
    }

    /// Does a single report pass every active predicate?
    ///
    /// `severity_active` is whether the dataset carries a severity column.
    fn matches(&self, report: &Report, severity_active: bool) -> bool {
        self.matches_query(report)
            && self.matches_tower(report)
            && self.matches_damage_type(report)
            && (!severity_active || self.matches_severity(report))
    }

    fn matches_query(&self, report: &Report) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        contains(&report.room_no) || contains(&report.damages_found)
    }

    fn matches_tower(&self, report: &Report) -> bool {
        match &self.towers {
            None => true,
            Some(selected) => report
                .tower
                .as_ref()
                .is_some_and(|t| selected.contains(t)),
        }
    }

    fn matches_damage_type(&self, report: &Report) -> bool {
        self.damage_types.is_empty()
            || report
                .damage_types
                .iter()
                .any(|d| self.damage_types.contains(d))
    }

    fn matches_severity(&self, report: &Report) -> bool {
        match self.severity_range {
            None => true,
            Some((min, max)) => report
                .severity_score
                .is_some_and(|s| min <= s && s <= max),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Return indices of reports that pass all active predicates, in row order.
///
/// Predicates combine with AND; each one only applies when active:
/// * text: `query` is non-empty
/// * tower: `towers` is `Some` (an empty set rejects every row)
/// * damage type: `damage_types` is non-empty
/// * severity: the dataset has a severity column and a range is given;
///   reports without a score are then rejected
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    let severity_active = dataset.has_column(SEVERITY_SCORE);
    dataset
        .reports
        .iter()
        .enumerate()
        .filter(|(_, report)| criteria.matches(report, severity_active))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered view of `dataset` as a new dataset. The input is untouched.
pub fn apply_filters(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    dataset.select(&filtered_indices(dataset, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DAMAGES_FOUND, ROOM_NO, TOWER};

    fn columns() -> Vec<String> {
        [ROOM_NO, TOWER, DAMAGES_FOUND, SEVERITY_SCORE]
            .map(String::from)
            .to_vec()
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Report::new(
                    Some("101".into()),
                    Some("A".into()),
                    Some("Water leak".into()),
                    Some(5.0),
                    None,
                ),
                Report::new(
                    Some("102".into()),
                    Some("B".into()),
                    Some("Cracked wall".into()),
                    Some(7.0),
                    None,
                ),
            ],
            columns(),
        )
    }

    fn rooms(ds: &Dataset) -> Vec<&str> {
        ds.reports
            .iter()
            .map(|r| r.room_no.as_deref().unwrap_or(""))
            .collect()
    }

    fn towers(names: &[&str]) -> Option<BTreeSet<String>> {
        Some(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn default_criteria_keep_every_row_in_order() {
        let ds = sample();
        let criteria = FilterCriteria::for_dataset(&ds);
        assert_eq!(criteria.towers, towers(&["A", "B"]));
        assert_eq!(criteria.severity_range, Some((5.0, 7.0)));
        assert_eq!(apply_filters(&ds, &criteria), ds);
    }

    #[test]
    fn default_criteria_keep_every_row_without_a_tower_column() {
        let mut ds = sample();
        ds.columns.retain(|c| c != TOWER);
        for r in &mut ds.reports {
            r.tower = None;
        }
        let criteria = FilterCriteria::for_dataset(&ds);
        assert_eq!(criteria.towers, None);
        assert_eq!(apply_filters(&ds, &criteria), ds);
    }

    #[test]
    fn default_criteria_keep_every_row_when_all_towers_are_missing() {
        let mut ds = sample();
        for r in &mut ds.reports {
            r.tower = None;
        }
        let criteria = FilterCriteria::for_dataset(&ds);
        assert_eq!(criteria.towers, None);
        assert_eq!(apply_filters(&ds, &criteria).len(), 2);
    }

    #[test]
    fn query_matches_room_number() {
        let criteria = FilterCriteria {
            query: "101".into(),
            ..Default::default()
        };
        assert_eq!(rooms(&apply_filters(&sample(), &criteria)), vec!["101"]);
    }

    #[test]
    fn query_matches_damages_case_insensitively() {
        for query in ["leak", "LEAK", "Water L"] {
            let criteria = FilterCriteria {
                query: query.into(),
                ..Default::default()
            };
            assert_eq!(rooms(&apply_filters(&sample(), &criteria)), vec!["101"]);
        }
    }

    #[test]
    fn query_never_matches_missing_fields() {
        let ds = Dataset::new(vec![Report::default()], vec![]);
        let criteria = FilterCriteria {
            query: "x".into(),
            ..Default::default()
        };
        assert!(apply_filters(&ds, &criteria).is_empty());
    }

    #[test]
    fn damage_type_selection_requires_an_overlap() {
        let criteria = FilterCriteria {
            damage_types: ["Water leak".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(rooms(&apply_filters(&sample(), &criteria)), vec!["101"]);
    }

    #[test]
    fn damage_type_filter_is_exact_per_label() {
        let ds = Dataset::new(
            vec![Report::new(
                Some("201".into()),
                None,
                Some("Water leak, Loose tile".into()),
                None,
                None,
            )],
            columns(),
        );
        let hit = FilterCriteria {
            damage_types: ["Loose tile".to_string(), "Pipes".to_string()].into(),
            ..Default::default()
        };
        let miss = FilterCriteria {
            damage_types: ["Water".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&ds, &hit).len(), 1);
        assert!(apply_filters(&ds, &miss).is_empty());
    }

    #[test]
    fn tower_selection_filters_and_empty_selection_hides_everything() {
        let only_b = FilterCriteria {
            towers: towers(&["B"]),
            ..Default::default()
        };
        assert_eq!(rooms(&apply_filters(&sample(), &only_b)), vec!["102"]);

        let none = FilterCriteria {
            towers: towers(&[]),
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &none).is_empty());
    }

    #[test]
    fn tower_filter_drops_reports_without_tower() {
        let mut ds = sample();
        ds.reports[1].tower = None;
        let criteria = FilterCriteria::for_dataset(&ds);
        assert_eq!(rooms(&apply_filters(&ds, &criteria)), vec!["101"]);
    }

    #[test]
    fn severity_range_is_inclusive() {
        let ds = sample();
        let run = |min, max| {
            let criteria = FilterCriteria {
                severity_range: Some((min, max)),
                ..Default::default()
            };
            rooms(&apply_filters(&ds, &criteria))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5.0, 7.0), vec!["101", "102"]);
        assert_eq!(run(6.0, 7.0), vec!["102"]);
        assert!(run(8.0, 9.0).is_empty());
        assert!(run(7.0, 5.0).is_empty());
    }

    #[test]
    fn severity_range_rejects_unscored_reports() {
        let mut ds = sample();
        ds.reports[0].severity_score = None;
        let criteria = FilterCriteria {
            severity_range: Some((0.0, 10.0)),
            ..Default::default()
        };
        assert_eq!(rooms(&apply_filters(&ds, &criteria)), vec!["102"]);
    }

    #[test]
    fn severity_range_is_ignored_without_the_column() {
        let mut ds = sample();
        ds.columns.retain(|c| c != SEVERITY_SCORE);
        for r in &mut ds.reports {
            r.severity_score = None;
        }
        let criteria = FilterCriteria {
            severity_range: Some((8.0, 9.0)),
            ..Default::default()
        };
        assert_eq!(apply_filters(&ds, &criteria).len(), 2);
    }

    #[test]
    fn predicates_combine_with_and() {
        let criteria = FilterCriteria {
            query: "10".into(),
            towers: towers(&["A", "B"]),
            damage_types: ["Cracked wall".to_string()].into(),
            severity_range: Some((0.0, 10.0)),
        };
        assert_eq!(rooms(&apply_filters(&sample(), &criteria)), vec!["102"]);
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_input_untouched() {
        let ds = sample();
        let before = ds.clone();
        let criteria = FilterCriteria {
            query: "1".into(),
            towers: towers(&["A"]),
            damage_types: BTreeSet::new(),
            severity_range: Some((4.0, 6.0)),
        };
        let once = apply_filters(&ds, &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
        assert_eq!(once.columns, ds.columns);
        assert_eq!(ds, before);
    }

    #[test]
    fn filtered_indices_preserve_row_order() {
        let criteria = FilterCriteria {
            query: "0".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&sample(), &criteria), vec![0, 1]);
    }
}
