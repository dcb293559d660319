use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::color::{generate_palette, ColorMap};

/// Axis formatter that prints `labels[i]` at integer position `i`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Damage-type bar chart (central panel)
// ---------------------------------------------------------------------------

/// Horizontal bar chart of `(damage type, report count)`, most frequent on top.
pub fn damage_chart(ui: &mut Ui, tally: &[(String, usize)], colors: &ColorMap) {
    let n = tally.len();

    // Bar i sits at y = n-1-i so the first (largest) entry is drawn on top.
    let bars: Vec<Bar> = tally
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new((n - 1 - i) as f64, *count as f64)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.7)
        })
        .collect();

    let labels: Vec<String> = tally.iter().rev().map(|(l, _)| l.clone()).collect();

    Plot::new("damage_chart")
        .height(400.0)
        .x_axis_label("Reports")
        .y_axis_label("Damage Type")
        .y_axis_formatter(category_formatter(labels))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Urgent rooms: severity score per room
// ---------------------------------------------------------------------------

/// Vertical bars of `(room, severity score)`, highest score on the left.
pub fn severity_chart(ui: &mut Ui, ranking: &[(String, f64)]) {
    let bars: Vec<Bar> = ranking
        .iter()
        .enumerate()
        .map(|(i, (room, score))| {
            Bar::new(i as f64, *score)
                .name(format!("{room}: {score:.1}"))
                .fill(Color32::from_rgb(214, 69, 65))
                .width(0.6)
        })
        .collect();
    let labels: Vec<String> = ranking.iter().map(|(room, _)| room.clone()).collect();

    Plot::new("severity_chart")
        .height(300.0)
        .x_axis_label("Room No")
        .y_axis_label("Severity Score")
        .x_axis_formatter(category_formatter(labels))
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Rooms per tower: pie chart
// ---------------------------------------------------------------------------

/// Points along the arc are this far apart (radians).
const ARC_STEP: f64 = 0.05;

/// Convex pieces (at most a quarter turn each) of the slice from `start` to
/// `end`, so each one fills correctly as a polygon.
fn slice_pieces(start: f64, end: f64) -> Vec<Vec<[f64; 2]>> {
    let mut pieces = Vec::new();
    let mut from = start;
    while from < end {
        let to = (from + FRAC_PI_2).min(end);
        let steps = ((to - from) / ARC_STEP).ceil().max(1.0) as usize;
        let mut points = vec![[0.0, 0.0]];
        for k in 0..=steps {
            let angle = from + (to - from) * k as f64 / steps as f64;
            points.push([angle.cos(), angle.sin()]);
        }
        pieces.push(points);
        from = to;
    }
    pieces
}

/// Pie chart of distinct rooms per tower, labelled with count and share.
pub fn tower_pie(ui: &mut Ui, rooms: &[(String, usize)]) {
    let total: usize = rooms.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return;
    }
    let colors = generate_palette(rooms.len());

    Plot::new("tower_pie")
        .height(300.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            // Slices run clockwise from twelve o'clock.
            let mut start = FRAC_PI_2;
            for ((tower, count), color) in rooms.iter().zip(colors) {
                let sweep = TAU * *count as f64 / total as f64;
                for piece in slice_pieces(start - sweep, start) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(tower)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }
                let mid = start - sweep / 2.0;
                let share = 100.0 * *count as f64 / total as f64;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                    format!("{tower}\n{count} ({share:.0}%)"),
                ));
                start -= sweep;
            }
        });
}
