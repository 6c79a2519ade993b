use egui::{Color32, RichText, Ui, Visuals, style::Widgets};

use crate::curves::Rgb;

mod dashboard;

pub use dashboard::DashboardApp;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

impl From<Rgb> for Color32 {
    fn from(value: Rgb) -> Self {
        Color32::from_rgb(value.0, value.1, value.2)
    }
}

pub(crate) fn dashboard_visuals() -> Visuals {
    Visuals {
        dark_mode: true,
        hyperlink_color: PALETTE_MAROON,
        faint_bg_color: PALETTE_BLACK,
        extreme_bg_color: PALETTE_BROWN,
        panel_fill: PALETTE_BLACK,
        button_frame: true,
        widgets: Widgets::dark(),
        striped: false,
        ..Default::default()
    }
}

pub(crate) fn warning_label(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text).color(PALETTE_ORANGE).strong());
}

pub(crate) fn error_label(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text).color(Color32::RED).strong());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::Colormap;

    #[test]
    fn test_colormap_to_color32() {
        let color: Color32 = Colormap::PLASMA.color_at(0.0).into();
        assert_eq!(color, Color32::from_rgb(13, 8, 135));
    }
}
