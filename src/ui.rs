//! egui overlay holding the XR toggle button.

use egui::{Color32, Context, FontFamily, FontId, Margin, Rounding, Stroke, Style, Visuals};

/// The "Enable XR" button.
///
/// `class` tags the control so hosts can find or style it; it doubles as the
/// egui id of the area the button lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton {
    pub class: String,
    pub label: String,
}

impl ToggleButton {
    pub fn new(class: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            label: label.into(),
        }
    }

    /// Draws the button; returns true on the frame it was clicked.
    pub fn show(&self, ctx: &Context) -> bool {
        let mut clicked = false;
        egui::Window::new(self.class.as_str())
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(
                egui::Frame::window(&ctx.style())
                    .inner_margin(Margin::same(8.0))
                    .rounding(Rounding::same(20.0))
                    .fill(Color32::from_black_alpha(220))
                    .stroke(Stroke::new(1.0, Color32::from_gray(60))),
            )
            .show(ctx, |ui| {
                let button = egui::Button::new(egui::RichText::new(&self.label).strong())
                    .min_size(egui::vec2(140.0, 44.0));
                if ui.add(button).clicked() {
                    clicked = true;
                }
            });
        clicked
    }
}

/// Dark pill-shaped theme for the overlay.
pub fn apply_theme(ctx: &Context) {
    let mut style = Style::default();
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);

    let mut visuals = Visuals::dark();
    visuals.widgets.inactive.rounding = Rounding::same(12.0);
    visuals.widgets.hovered.rounding = Rounding::same(12.0);
    visuals.widgets.active.rounding = Rounding::same(12.0);
    visuals.window_rounding = Rounding::same(16.0);

    let primary = Color32::from_rgb(100, 180, 255);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(45, 45, 50);
    visuals.widgets.active.bg_fill = primary;
    visuals.selection.bg_fill = primary;

    style.text_styles.insert(egui::TextStyle::Button, FontId::new(20.0, FontFamily::Proportional));

    ctx.set_style(style);
    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_without_input_is_not_clicked() {
        let ctx = Context::default();
        apply_theme(&ctx);
        let button = ToggleButton::new("xr-toggle", "Enable XR");

        let mut clicked = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            clicked = button.show(ctx);
        });
        assert!(!clicked);
    }

    #[test]
    fn theme_sets_button_font() {
        let ctx = Context::default();
        apply_theme(&ctx);
        let style = ctx.style();
        assert_eq!(style.text_styles[&egui::TextStyle::Button].size, 20.0);
    }
}
