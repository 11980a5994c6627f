//! Colors, sizes and fonts for the timeline demo.

use egui::{Color32, FontId, Rounding, Stroke, Visuals};

pub const CANVAS: Color32 = Color32::from_rgb(22, 24, 31);
pub const PANEL: Color32 = Color32::from_rgb(28, 30, 39);
pub const HEADER_BAND: Color32 = Color32::from_rgb(35, 38, 50);
pub const STORY_ROW: Color32 = Color32::from_rgb(39, 42, 57);
pub const SELECTION: Color32 = Color32::from_rgba_premultiplied(72, 132, 214, 48);
pub const DAY_OFF: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 40);

pub const RULE: Color32 = Color32::from_rgb(51, 54, 68);
pub const DAY_RULE: Color32 = Color32::from_rgb(42, 45, 58);
pub const FOCUS_RING: Color32 = Color32::from_rgb(96, 146, 226);

pub const INK: Color32 = Color32::from_rgb(228, 231, 240);
pub const INK_MUTED: Color32 = Color32::from_rgb(150, 156, 176);
pub const INK_FAINT: Color32 = Color32::from_rgb(98, 104, 122);
pub const INK_ON_BAR: Color32 = Color32::WHITE;

pub const ACCENT: Color32 = Color32::from_rgb(72, 132, 214);
pub const TODAY: Color32 = Color32::from_rgb(236, 80, 72);
pub const GRIP: Color32 = Color32::WHITE;
pub const LINK: Color32 = Color32::from_rgb(150, 156, 176);
pub const STORY_BAR: Color32 = Color32::from_rgb(92, 98, 120);
/// Darkens the finished part of a bar.
pub const DONE_SHADE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 55);

pub const HEADER_HEIGHT: f32 = 44.0;
pub const GRIP_WIDTH: f32 = 7.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const TABLE_WIDTH: f32 = 300.0;
pub const STATUS_HEIGHT: f32 = 24.0;

pub fn heading_font() -> FontId {
    FontId::proportional(12.0)
}

pub fn label_font() -> FontId {
    FontId::proportional(10.5)
}

pub fn bar_font() -> FontId {
    FontId::proportional(11.5)
}

pub fn caption_font() -> FontId {
    FontId::proportional(9.5)
}

const SWATCHES: [Color32; 6] = [
    Color32::from_rgb(72, 132, 214),
    Color32::from_rgb(64, 168, 110),
    Color32::from_rgb(160, 92, 196),
    Color32::from_rgb(232, 146, 48),
    Color32::from_rgb(40, 176, 196),
    Color32::from_rgb(214, 84, 96),
];

/// Bar color for the `index`-th sample task.
pub fn swatch(index: usize) -> Color32 {
    SWATCHES[index % SWATCHES.len()]
}

/// Dark visuals tinted with the palette.
pub fn install(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(INK);
    visuals.panel_fill = PANEL;
    visuals.window_fill = PANEL;
    visuals.extreme_bg_color = CANVAS;
    visuals.selection.bg_fill = SELECTION;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.striped = false;

    let widgets = &mut visuals.widgets;
    for (state, fill) in [
        (&mut widgets.noninteractive, PANEL),
        (&mut widgets.inactive, STORY_ROW),
        (&mut widgets.hovered, Color32::from_rgb(50, 54, 70)),
        (&mut widgets.active, Color32::from_rgb(58, 62, 80)),
    ] {
        state.bg_fill = fill;
        state.weak_bg_fill = fill;
        state.rounding = Rounding::same(4.0);
    }
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, RULE);
    widgets.inactive.bg_stroke = Stroke::new(1.0, RULE);
    widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);
    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 4.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swatches_repeat_after_the_last_one() {
        assert_eq!(swatch(0), swatch(SWATCHES.len()));
        assert_ne!(swatch(0), swatch(1));
    }
}
