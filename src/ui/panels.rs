use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, TextEdit, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loops.
    let towers = state.tower_options.clone();
    let damage_types = state.damage_type_options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Free-text search ----
            ui.strong("Search by Room No. / keyword");
            let search = ui.add(
                TextEdit::singleline(&mut state.criteria.query)
                    .hint_text("e.g. 1674/1113 or water leak"),
            );
            if search.changed() {
                state.refilter();
            }
            ui.separator();

            // ---- Towers ----
            let n_selected = state.criteria.towers.as_ref().map_or(0, |t| t.len());
            egui::CollapsingHeader::new(
                RichText::new(format!("Tower  ({n_selected}/{})", towers.len())).strong(),
            )
            .id_salt("towers")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all_towers();
                    }
                    if ui.small_button("None").clicked() {
                        state.select_no_towers();
                    }
                });
                for tower in &towers {
                    let mut checked = state.is_tower_selected(tower);
                    if ui.checkbox(&mut checked, tower.as_str()).changed() {
                        state.toggle_tower(tower);
                    }
                }
            });

            // ---- Damage types ----
            let n_selected = state.criteria.damage_types.len();
            let header = if n_selected == 0 {
                "Damage Type  (any)".to_string()
            } else {
                format!("Damage Type  ({n_selected}/{})", damage_types.len())
            };
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("damage_types")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.clear_damage_types();
                    }
                    for label in &damage_types {
                        let mut checked = state.criteria.damage_types.contains(label);
                        let text = RichText::new(label).color(state.color_map.color_for(label));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_damage_type(label);
                        }
                    }
                });
            ui.separator();

            // ---- Severity range ----
            ui.strong("Severity Score range");
            let (lo, hi) = state.severity_bounds;
            let (mut min, mut max) = state.severity_range();
            let min_changed = ui
                .add(Slider::new(&mut min, lo..=hi).step_by(0.5).text("min"))
                .changed();
            let max_changed = ui
                .add(Slider::new(&mut max, lo..=hi).step_by(0.5).text("max"))
                .changed();
            if min_changed || max_changed {
                state.set_severity_range(min, max);
            }

            // ---- Images (only when enabled by config) ----
            if state.config.allow_images {
                ui.separator();
                ui.checkbox(&mut state.show_images, "Display room images");
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if !state.dataset.is_empty() && ui.button("📥 Download full data (CSV)").clicked() {
                save_csv_dialog(state, ExportScope::Full);
                ui.close_menu();
            }
            if ui.button("📥 Download filtered data (CSV)").clicked() {
                save_csv_dialog(state, ExportScope::Filtered);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} reports loaded, {} visible",
            state.dataset.len(),
            state.filtered.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum ExportScope {
    Full,
    Filtered,
}

fn save_csv_dialog(state: &mut AppState, scope: ExportScope) {
    let file_name = match scope {
        ExportScope::Full => "circle_damage_all.csv",
        ExportScope::Filtered => "circle_damage_filtered.csv",
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save reports as CSV")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let result = match scope {
        ExportScope::Full => state.export_full(&path),
        ExportScope::Filtered => state.export_filtered(&path),
    };
    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Failed to export CSV: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
