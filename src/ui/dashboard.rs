use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use circle_damage::data::aggregate::{RoomDamageVariety, Summary};
use circle_damage::data::model::{Dataset, Report};
use circle_damage::presenter::Presenter;

use crate::color::ColorMap;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// egui implementation of the dashboard presenter
// ---------------------------------------------------------------------------

/// Renders the dashboard into the central panel.
pub struct EguiPresenter<'a> {
    ui: &'a mut Ui,
    colors: &'a ColorMap,
}

impl<'a> EguiPresenter<'a> {
    pub fn new(ui: &'a mut Ui, colors: &'a ColorMap) -> Self {
        EguiPresenter { ui, colors }
    }
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

impl Presenter for EguiPresenter<'_> {
    fn metrics(&mut self, summary: &Summary) {
        self.ui.heading("📊 Overview");
        self.ui.columns(3, |cols: &mut [Ui]| {
            metric(&mut cols[0], "Total Reports", summary.total_reports.to_string());
            if let Some(avg) = summary.avg_severity {
                metric(&mut cols[1], "Avg. Severity", format!("{avg:.1}"));
            }
            metric(&mut cols[2], "Unique Rooms", summary.unique_rooms.to_string());
        });
        self.ui.add_space(8.0);
    }

    fn damage_chart(&mut self, tally: &[(String, usize)]) {
        plot::damage_chart(self.ui, tally, self.colors);
    }

    fn urgent_rooms(&mut self, ranking: &[(String, f64)]) {
        self.ui.add_space(8.0);
        self.ui.heading("🚨 Urgent Rooms by Severity");
        plot::severity_chart(self.ui, ranking);
    }

    fn tower_distribution(&mut self, rooms: &[(String, usize)]) {
        self.ui.add_space(8.0);
        self.ui.heading("🏢 Rooms Surveyed per Tower");
        plot::tower_pie(self.ui, rooms);
    }

    fn damage_variety(&mut self, rooms: &[RoomDamageVariety]) {
        self.ui.add_space(8.0);
        self.ui.heading("🧱 Rooms with the Most Damage Types");
        self.ui.push_id("damage_variety", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(90.0))
                .column(Column::auto().at_least(50.0))
                .column(Column::remainder().clip(true))
                .header(20.0, |mut header| {
                    for title in ["Room No", "Types", "Damage Types"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rooms.len(), |mut row| {
                        let room = &rooms[row.index()];
                        row.col(|ui: &mut Ui| {
                            ui.label(room.room_no.as_str());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(room.count().to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(room.damage_types.join(", "));
                        });
                    });
                });
        });
    }

    fn no_data(&mut self) {
        self.ui.label(
            RichText::new("No data matches the selected filters.")
                .color(Color32::LIGHT_BLUE),
        );
    }

    fn records(&mut self, filtered: &Dataset) {
        self.ui.add_space(8.0);
        self.ui.heading("🗂 Detailed Records");
        if filtered.columns.is_empty() {
            self.ui.label("No columns to show.");
            return;
        }

        let columns = &filtered.columns;
        self.ui.push_id("records", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(480.0)
                .columns(Column::auto().at_least(60.0).clip(true), columns.len())
                .header(20.0, |mut header| {
                    for col in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, filtered.len(), |mut row| {
                        let report = &filtered.reports[row.index()];
                        for col in columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(report.cell_text(col).unwrap_or_default());
                            });
                        }
                    });
                });
        });
    }

    fn images(&mut self, reports: &[&Report]) {
        self.ui.add_space(8.0);
        self.ui.heading("📸 Room Images");
        let width = self.ui.available_width();
        for report in reports {
            let Some(url) = report.image() else {
                continue;
            };
            self.ui.add(egui::Image::new(url).max_width(width).rounding(4.0));
            self.ui
                .label(RichText::new(report.room_no.as_deref().unwrap_or("")).weak());
        }
    }

    fn footer(&mut self, text: &str) {
        self.ui.add_space(8.0);
        self.ui.label(RichText::new(text).small().weak());
    }
}
