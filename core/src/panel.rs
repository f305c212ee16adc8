//! Overlay panel UI
//!
//! Draws an [`OverlaySnapshot`] as an egui window: one collapsing header per
//! group and one `label: value` row per line.

use hashbrown::HashSet;

use crate::config::{OverlayConfig, parse_key_name};
use crate::types::{OverlayLine, OverlaySnapshot};

/// Color for lines whose last read failed
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 80, 80);

/// Overlay panel state
pub struct OverlayPanel {
    /// Whether the panel is visible
    pub visible: bool,
    /// Window title
    pub title: String,
    /// Color errored lines
    pub highlight_errors: bool,
    /// Key that shows and hides the panel
    toggle_key: Option<egui::Key>,
    /// Names of groups the user collapsed
    collapsed_groups: HashSet<String>,
}

impl Default for OverlayPanel {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

impl OverlayPanel {
    /// Create a visible panel with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a panel from overlay settings
    ///
    /// An unrecognized toggle key is logged and leaves the panel unbound.
    pub fn from_config(config: &OverlayConfig) -> Self {
        let toggle_key = parse_key_name(&config.toggle_key).and_then(egui::Key::from_name);
        if toggle_key.is_none() {
            tracing::warn!(
                "watch: overlay toggle key '{}' is not recognized",
                config.toggle_key
            );
        }
        Self {
            visible: config.visible,
            title: config.title.clone(),
            highlight_errors: config.highlight_errors,
            toggle_key,
            collapsed_groups: HashSet::new(),
        }
    }

    /// Key bound to [`Self::toggle`], if any
    pub fn toggle_key(&self) -> Option<egui::Key> {
        self.toggle_key
    }

    /// Toggle panel visibility
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Set panel visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether a group is currently collapsed
    pub fn is_collapsed(&self, group: &str) -> bool {
        self.collapsed_groups.contains(group)
    }

    /// Render the snapshot
    ///
    /// A press of the toggle key this frame flips visibility first.
    /// Returns the number of lines drawn (zero when hidden or empty).
    pub fn show(&mut self, ctx: &egui::Context, snapshot: &OverlaySnapshot) -> usize {
        if let Some(key) = self.toggle_key {
            if ctx.input(|i| i.key_pressed(key)) {
                self.toggle();
            }
        }

        if !self.visible || snapshot.is_empty() {
            return 0;
        }

        let mut drawn = 0;
        egui::Window::new(self.title.clone())
            .id(egui::Id::new("livewatch_overlay_window"))
            .default_pos([10.0, 10.0])
            .default_size([280.0, 360.0])
            .resizable(true)
            .collapsible(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for group in &snapshot.groups {
                            let is_collapsed = self.collapsed_groups.contains(&group.name);
                            let header = egui::CollapsingHeader::new(group.name.as_str())
                                .default_open(!is_collapsed)
                                .show(ui, |ui| {
                                    for line in &group.lines {
                                        self.render_line(ui, line);
                                    }
                                    group.lines.len()
                                });

                            drawn += header.body_returned.unwrap_or(0);

                            if header.header_response.clicked() {
                                if is_collapsed {
                                    self.collapsed_groups.remove(&group.name);
                                } else {
                                    self.collapsed_groups.insert(group.name.clone());
                                }
                            }
                        }
                    });
            });

        drawn
    }

    fn render_line(&self, ui: &mut egui::Ui, line: &OverlayLine) {
        let text = format!("{}: {}", line.label, line.value);
        if line.had_error && self.highlight_errors {
            ui.label(egui::RichText::new(text).color(ERROR_COLOR));
        } else {
            ui.label(text);
        }
    }
}
