//! egui overlay: erosion progress, simulation controls, camera panel.

use egui::Context;

use crate::renderer::camera::OrbitCamera;

/// Snapshot of simulation state shown in the panel.
#[derive(Debug, Clone, Copy)]
pub struct SimStats {
    pub completed_iterations: u32,
    pub max_iterations: u32,
    pub eroding: bool,
    pub paused: bool,
}

/// Actions requested through the panel, applied by the caller after the
/// frame is built.
#[derive(Default)]
pub struct UiResponse {
    pub reset_camera: bool,
    pub toggle_pause: bool,
    pub restart: bool,
}

/// UI state and rendering.
pub struct Ui {
    /// Whether the side panel is visible
    pub panel_visible: bool,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            panel_visible: true,
        }
    }

    pub fn render(
        &mut self,
        ctx: &Context,
        camera: &mut OrbitCamera,
        stats: SimStats,
        fps: f32,
    ) -> UiResponse {
        let mut response = UiResponse::default();

        // Toggle panel with Tab key
        if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
            self.panel_visible = !self.panel_visible;
        }

        if self.panel_visible {
            egui::SidePanel::left("controls")
                .default_width(210.0)
                .show(ctx, |ui| {
                    ui.heading("relief");
                    ui.separator();

                    ui.label(format!("FPS: {:.1}", fps));
                    ui.separator();

                    ui.collapsing("Erosion", |ui| {
                        let fraction = if stats.max_iterations > 0 {
                            stats.completed_iterations as f32 / stats.max_iterations as f32
                        } else {
                            1.0
                        };
                        ui.add(egui::ProgressBar::new(fraction).text(format!(
                            "{} / {} passes",
                            stats.completed_iterations, stats.max_iterations
                        )));

                        let status = if stats.paused {
                            "paused"
                        } else if stats.completed_iterations >= stats.max_iterations {
                            "settled"
                        } else if stats.eroding {
                            "eroding"
                        } else {
                            "idle"
                        };
                        ui.label(format!("Status: {}", status));

                        ui.horizontal(|ui| {
                            let pause_label = if stats.paused { "Resume" } else { "Pause" };
                            if ui.button(pause_label).clicked() {
                                response.toggle_pause = true;
                            }
                            if ui.button("Restart").clicked() {
                                response.restart = true;
                            }
                        });
                    });

                    ui.separator();

                    ui.collapsing("Camera", |ui| {
                        ui.horizontal(|ui| {
                            ui.label("Distance:");
                            ui.add(
                                egui::DragValue::new(&mut camera.distance)
                                    .speed(0.5)
                                    .range(1.0..=400.0),
                            );
                        });

                        ui.horizontal(|ui| {
                            ui.label("Azimuth:");
                            let mut degrees = camera.azimuth.to_degrees();
                            if ui
                                .add(egui::DragValue::new(&mut degrees).speed(1.0).suffix("°"))
                                .changed()
                            {
                                camera.azimuth = degrees.to_radians();
                            }
                        });

                        ui.horizontal(|ui| {
                            ui.label("Elevation:");
                            let mut degrees = camera.elevation.to_degrees();
                            if ui
                                .add(
                                    egui::DragValue::new(&mut degrees)
                                        .speed(1.0)
                                        .suffix("°")
                                        .range(-85.0..=85.0),
                                )
                                .changed()
                            {
                                camera.elevation = degrees.to_radians();
                            }
                        });

                        if ui.button("Reset Camera").clicked() {
                            response.reset_camera = true;
                        }
                    });

                    ui.separator();

                    ui.collapsing("Controls", |ui| {
                        ui.label("Left Drag: Rotate");
                        ui.label("Scroll: Zoom");
                        ui.label("Shift+Drag / Middle Drag: Pan");
                        ui.label("Space: Pause");
                        ui.label("R: Reset Camera");
                        ui.label("Tab: Toggle Panel");
                        ui.label("ESC: Quit");
                    });
                });
        }

        response
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
