use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use circle_damage::config::AppConfig;
use circle_damage::data::export::to_csv_bytes;
use circle_damage::data::filter::{apply_filters, FilterCriteria};
use circle_damage::data::model::Dataset;

use crate::color::ColorMap;

/// Slider bounds used when the data has no severity scores.
pub const DEFAULT_SEVERITY_BOUNDS: (f64, f64) = (0.0, 10.0);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// The loaded table. Never modified after start-up.
    pub dataset: Dataset,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Reports passing the current filters (cached until the criteria change).
    pub filtered: Dataset,

    /// Choices offered by the filter widgets.
    pub tower_options: BTreeSet<String>,
    pub damage_type_options: BTreeSet<String>,
    pub severity_bounds: (f64, f64),

    /// "Display room images" checkbox; only reachable when images are allowed.
    pub show_images: bool,

    /// Bar colours per damage type.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, dataset: Dataset) -> Self {
        let mut state = AppState {
            config,
            dataset: Dataset::empty(),
            criteria: FilterCriteria::default(),
            filtered: Dataset::empty(),
            tower_options: BTreeSet::new(),
            damage_type_options: BTreeSet::new(),
            severity_bounds: DEFAULT_SEVERITY_BOUNDS,
            show_images: false,
            color_map: ColorMap::default(),
            status_message: None,
        };
        state.set_dataset(dataset);
        state
    }

    /// Ingest the loaded dataset and reset the filters to "show everything".
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.criteria = FilterCriteria::for_dataset(&dataset);
        self.severity_bounds = dataset
            .severity_bounds()
            .unwrap_or(DEFAULT_SEVERITY_BOUNDS);
        if self.criteria.severity_range.is_none() {
            self.criteria.severity_range = Some(self.severity_bounds);
        }
        self.tower_options = dataset.tower_values();
        self.damage_type_options = dataset.damage_type_values();
        self.color_map = ColorMap::new(&self.damage_type_options);
        self.dataset = dataset;
        self.refilter();
    }

    /// Recompute `filtered` after a criteria change.
    pub fn refilter(&mut self) {
        self.filtered = apply_filters(&self.dataset, &self.criteria);
        log::debug!(
            "{} of {} reports match {:?}",
            self.filtered.len(),
            self.dataset.len(),
            self.criteria
        );
    }

    /// With no tower filter active every tower counts as selected.
    pub fn is_tower_selected(&self, tower: &str) -> bool {
        self.criteria
            .towers
            .as_ref()
            .map_or(true, |selected| selected.contains(tower))
    }

    /// Toggle a single tower in the selection.
    pub fn toggle_tower(&mut self, tower: &str) {
        let options = &self.tower_options;
        let selected = self.criteria.towers.get_or_insert_with(|| options.clone());
        if !selected.remove(tower) {
            selected.insert(tower.to_string());
        }
        self.refilter();
    }

    /// Select every known tower; data without towers drops the tower filter.
    pub fn select_all_towers(&mut self) {
        self.criteria.towers =
            (!self.tower_options.is_empty()).then(|| self.tower_options.clone());
        self.refilter();
    }

    /// Deselecting every tower hides every report.
    pub fn select_no_towers(&mut self) {
        self.criteria.towers = Some(BTreeSet::new());
        self.refilter();
    }

    /// Toggle a damage type. An empty selection means "any damage type".
    pub fn toggle_damage_type(&mut self, label: &str) {
        if !self.criteria.damage_types.remove(label) {
            self.criteria.damage_types.insert(label.to_string());
        }
        self.refilter();
    }

    pub fn clear_damage_types(&mut self) {
        self.criteria.damage_types.clear();
        self.refilter();
    }

    pub fn severity_range(&self) -> (f64, f64) {
        self.criteria.severity_range.unwrap_or(self.severity_bounds)
    }

    pub fn set_severity_range(&mut self, min: f64, max: f64) {
        self.criteria.severity_range = Some((min, max));
        self.refilter();
    }

    /// Write the whole table as CSV.
    pub fn export_full(&self, path: &Path) -> Result<()> {
        write_csv(&self.dataset, path)
    }

    /// Write the reports currently passing the filters as CSV.
    pub fn export_filtered(&self, path: &Path) -> Result<()> {
        write_csv(&self.filtered, path)
    }
}

fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(dataset).context("serializing CSV")?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} reports to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use circle_damage::data::model::{Report, DAMAGES_FOUND, ROOM_NO, SEVERITY_SCORE, TOWER};

    use super::*;

    fn state() -> AppState {
        let ds = Dataset::new(
            vec![
                report("101", Some("A"), "Water leak", Some(5.0)),
                report("102", Some("B"), "Cracked wall", Some(7.0)),
            ],
            [ROOM_NO, TOWER, SEVERITY_SCORE].map(String::from).to_vec(),
        );
        AppState::new(config(), ds)
    }

    fn report(room: &str, tower: Option<&str>, damages: &str, score: Option<f64>) -> Report {
        Report::new(
            Some(room.into()),
            tower.map(String::from),
            Some(damages.into()),
            score,
            None,
        )
    }

    fn config() -> AppConfig {
        AppConfig {
            data_dir: PathBuf::from("data"),
            allow_images: false,
        }
    }

    #[test]
    fn starts_with_everything_visible() {
        let s = state();
        assert_eq!(s.filtered.len(), 2);
        assert!(s.is_tower_selected("A") && s.is_tower_selected("B"));
        assert_eq!(s.severity_range(), (5.0, 7.0));
    }

    #[test]
    fn starts_with_everything_visible_without_towers() {
        let ds = Dataset::new(
            vec![
                report("101", None, "Water leak", Some(5.0)),
                report("102", None, "Cracked wall", Some(7.0)),
            ],
            [ROOM_NO, DAMAGES_FOUND, SEVERITY_SCORE]
                .map(String::from)
                .to_vec(),
        );
        let mut s = AppState::new(config(), ds);
        assert!(s.tower_options.is_empty());
        assert_eq!(s.criteria.towers, None);
        assert_eq!(s.filtered.len(), 2);

        s.select_all_towers();
        assert_eq!(s.filtered.len(), 2);
        s.select_no_towers();
        assert!(s.filtered.is_empty());
    }

    #[test]
    fn tower_toggles_and_none_hides_everything() {
        let mut s = state();
        s.toggle_tower("A");
        assert_eq!(s.filtered.len(), 1);
        s.select_no_towers();
        assert!(s.filtered.is_empty());
        s.select_all_towers();
        assert_eq!(s.filtered.len(), 2);
    }

    #[test]
    fn damage_type_selection_narrows_and_clears() {
        let mut s = state();
        s.toggle_damage_type("Cracked wall");
        assert_eq!(s.filtered.reports[0].room_no.as_deref(), Some("102"));
        s.clear_damage_types();
        assert_eq!(s.filtered.len(), 2);
    }

    #[test]
    fn severity_slider_updates_the_view() {
        let mut s = state();
        s.set_severity_range(6.0, 7.0);
        assert_eq!(s.filtered.len(), 1);
        assert_eq!(s.dataset.len(), 2);
    }

    #[test]
    fn empty_dataset_gets_default_slider_bounds() {
        let config = AppConfig {
            data_dir: PathBuf::from("data"),
            allow_images: true,
        };
        let s = AppState::new(config, Dataset::empty());
        assert_eq!(s.severity_range(), DEFAULT_SEVERITY_BOUNDS);
        assert!(s.filtered.is_empty());
    }

    #[test]
    fn export_writes_filtered_rows_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut s = state();
        s.toggle_tower("B");
        let path = dir.path().join("filtered.csv");
        s.export_filtered(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "\u{feff}Room No,Tower,Severity Score\n101,A,5\n");
    }
}
