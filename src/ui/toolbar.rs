use egui::{RichText, Ui};

use gantt_timeline::model::AxisMode;

use crate::app::GanttApp;
use crate::ui::palette;

const MIN_CELL_WIDTH: f32 = 4.0;
const MAX_CELL_WIDTH: f32 = 120.0;

/// Render the top toolbar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Scale").size(11.0).color(palette::INK_FAINT));
        for mode in AxisMode::ALL {
            if ui.selectable_value(&mut app.options.mode, mode, mode.label()).clicked() {
                let cell_width = mode.default_cell_width();
                app.zoom_to(cell_width);
            }
        }

        ui.separator();
        if ui.button("－").on_hover_text("Zoom out").clicked() {
            app.zoom_by(1.0 / 1.25);
        }
        ui.label(
            RichText::new(format!("{:.0} px/day", app.controller.cell_width()))
                .size(11.0)
                .color(palette::INK_MUTED),
        );
        if ui.button("＋").on_hover_text("Zoom in").clicked() {
            app.zoom_by(1.25);
        }

        ui.separator();
        if ui.checkbox(&mut app.options.is_group_view, "Group by story").changed() {
            app.rows_changed();
        }
        if ui
            .checkbox(&mut app.options.is_infinite_horizontal, "Infinite scroll")
            .changed()
        {
            app.controller.configure(&app.options);
        }
        ui.checkbox(&mut app.defer_links, "Validate links async")
            .on_hover_text("New links stay dashed until a background check accepts them");

        ui.separator();
        ui.add(egui_extras::DatePickerButton::new(&mut app.jump_date).id_salt("jump_date"));
        if ui.button("Jump").clicked() {
            app.jump_to(app.jump_date);
        }
        if ui.button("Today").clicked() {
            app.jump_to(app.today);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let window = app.controller.window();
            ui.label(
                RichText::new(format!("{} → {}", window.range.start, window.range.end))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}

pub fn clamp_cell_width(cell_width: f32) -> f32 {
    cell_width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH)
}
