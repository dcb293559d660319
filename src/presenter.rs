use chrono::{DateTime, Utc};

use crate::data::aggregate::{
    aggregate_damage_frequency, rooms_by_damage_variety, rooms_per_tower, top_severity_rooms,
    RoomDamageVariety, Summary, DEFAULT_TOP_N,
};
use crate::data::model::{Dataset, Report};

// ---------------------------------------------------------------------------
// Presenter – the rendering capability the dashboard drives
// ---------------------------------------------------------------------------

/// Something that can show the dashboard's pieces.
///
/// The GUI implements it on top of egui; [`NullPresenter`] drops everything.
pub trait Presenter {
    /// Headline numbers.
    fn metrics(&mut self, summary: &Summary);
    /// Ranked `(damage type, report count)` pairs, most frequent first.
    fn damage_chart(&mut self, tally: &[(String, usize)]);
    /// Rooms ranked by severity score, most urgent first.
    fn urgent_rooms(&mut self, ranking: &[(String, f64)]);
    /// Distinct rooms surveyed per tower.
    fn tower_distribution(&mut self, rooms: &[(String, usize)]);
    /// Rooms with the most distinct damage types.
    fn damage_variety(&mut self, rooms: &[RoomDamageVariety]);
    /// Shown in place of the charts when nothing matches the filters.
    fn no_data(&mut self);
    /// The detail table.
    fn records(&mut self, filtered: &Dataset);
    /// Reports that have an image link.
    fn images(&mut self, reports: &[&Report]);
    fn footer(&mut self, text: &str);
}

/// A presenter that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn metrics(&mut self, _summary: &Summary) {}
    fn damage_chart(&mut self, _tally: &[(String, usize)]) {}
    fn urgent_rooms(&mut self, _ranking: &[(String, f64)]) {}
    fn tower_distribution(&mut self, _rooms: &[(String, usize)]) {}
    fn damage_variety(&mut self, _rooms: &[RoomDamageVariety]) {}
    fn no_data(&mut self) {}
    fn records(&mut self, _filtered: &Dataset) {}
    fn images(&mut self, _reports: &[&Report]) {}
    fn footer(&mut self, _text: &str) {}
}

/// Lay out one dashboard frame for the filtered reports.
///
/// Order: metrics, then either the "no data" notice or the damage chart
/// followed by the urgent-room, tower and damage-variety views (each only
/// when it has something to show), the table, images (only when
/// `show_images` and something matched), then the timestamp footer.
pub fn render_dashboard(
    presenter: &mut dyn Presenter,
    filtered: &Dataset,
    show_images: bool,
    now: DateTime<Utc>,
) {
    presenter.metrics(&Summary::of(filtered));

    if filtered.is_empty() {
        presenter.no_data();
    } else {
        presenter.damage_chart(&aggregate_damage_frequency(filtered, DEFAULT_TOP_N));

        let urgent = top_severity_rooms(filtered, DEFAULT_TOP_N);
        if !urgent.is_empty() {
            presenter.urgent_rooms(&urgent);
        }
        let towers = rooms_per_tower(filtered);
        if !towers.is_empty() {
            presenter.tower_distribution(&towers);
        }
        let variety = rooms_by_damage_variety(filtered, DEFAULT_TOP_N);
        if !variety.is_empty() {
            presenter.damage_variety(&variety);
        }
    }

    presenter.records(filtered);

    if show_images && !filtered.is_empty() {
        let with_images: Vec<&Report> = filtered
            .reports
            .iter()
            .filter(|r| r.image().is_some())
            .collect();
        presenter.images(&with_images);
    }

    presenter.footer(&format!("Last updated: {}", now.format("%Y-%m-%d %H:%M UTC")));
}
