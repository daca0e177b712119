use egui::{Color32, Stroke, Visuals};

use codepad_settings::{Color, SchemeKind, StyleScheme};

pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Builds egui visuals from a style scheme's palette.
/// 依配色方案產生 egui 視覺樣式。
pub fn visuals_for(scheme: &StyleScheme) -> Visuals {
    let palette = &scheme.palette;
    let mut visuals = match scheme.kind {
        SchemeKind::Dark => Visuals::dark(),
        SchemeKind::Light => Visuals::light(),
    };
    visuals.override_text_color = Some(color32(palette.text));
    visuals.extreme_bg_color = color32(palette.background);
    visuals.code_bg_color = color32(palette.background);
    visuals.faint_bg_color = color32(palette.current_line);
    visuals.hyperlink_color = color32(palette.accent);
    visuals.selection.bg_fill = color32(palette.selection);
    visuals.selection.stroke = Stroke::new(1.0, color32(palette.text));
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, color32(palette.accent));
    visuals.widgets.active.bg_fill = color32(palette.accent);
    visuals
}
