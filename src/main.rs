use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use relief::input::CameraController;
use relief::renderer::Renderer;
use relief::terrain::{GridTopology, MapConfig, Phase, SeededRandom, Simulation};
use relief::ui::SimStats;

#[derive(Parser, Debug)]
#[command(name = "relief")]
#[command(about = "Procedural heightmap erosion viewer")]
struct Args {
    /// Vertices per grid side
    #[arg(long, default_value_t = 80)]
    grid_size: usize,

    /// Physical map extent in world units
    #[arg(long, default_value_t = 10.0)]
    map_size: f32,

    /// Total erosion passes before the terrain settles
    #[arg(long, default_value_t = 999)]
    max_iterations: u32,

    /// Passes applied per update step
    #[arg(long, default_value_t = 1)]
    iterations_per_step: u32,

    /// Seconds between update steps
    #[arg(long, default_value_t = 0.2)]
    interval: f32,

    /// Seed for the erosion RNG; omit for a fresh terrain every run
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the simulation paused
    #[arg(long)]
    paused: bool,
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    topology: GridTopology,
    simulation: Simulation,
    rng: SeededRandom,
    controller: CameraController,
    last_tick: Instant,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes().with_title("relief - Heightmap Viewer");
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("failed to initialize GPU renderer: {e:#}");
                event_loop.exit();
                return;
            }
        };
        renderer.upload_grid(&self.topology);
        window.request_redraw();

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let consumed = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                self.controller.modifier_key(key, state);
                if state == ElementState::Pressed && !consumed {
                    match key {
                        KeyCode::Escape => event_loop.exit(),
                        KeyCode::Space => {
                            let paused = !self.simulation.is_paused();
                            self.simulation.set_paused(paused);
                        }
                        KeyCode::KeyR => {
                            if let Some(renderer) = &mut self.renderer {
                                renderer.reset_camera();
                            }
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if !consumed {
                    self.controller.mouse_button(button, state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    self.controller.cursor_moved(
                        position.x as f32,
                        position.y as f32,
                        &mut renderer.camera,
                    );
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !consumed {
                    if let Some(renderer) = &mut self.renderer {
                        self.controller.scroll(delta, &mut renderer.camera);
                    }
                }
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_tick).as_secs_f32();
                self.last_tick = now;

                let applied = self.simulation.advance(dt, &mut self.rng);

                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    if applied > 0 {
                        self.simulation.sync_to(renderer);
                        if self.simulation.is_settled() {
                            log::info!(
                                "terrain settled after {} passes",
                                self.simulation.completed_iterations()
                            );
                        }
                    }

                    let stats = SimStats {
                        completed_iterations: self.simulation.completed_iterations(),
                        max_iterations: self.simulation.config().max_iterations,
                        eroding: self.simulation.phase() == Phase::Eroding,
                        paused: self.simulation.is_paused(),
                    };
                    match renderer.render(window, stats) {
                        Ok(response) => {
                            if response.toggle_pause {
                                let paused = !self.simulation.is_paused();
                                self.simulation.set_paused(paused);
                            }
                            if response.restart {
                                self.simulation.restart();
                                self.simulation.sync_to(renderer);
                            }
                        }
                        Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::error!("render error: {e:?}"),
                    }
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = MapConfig {
        side_count: args.grid_size,
        map_size: args.map_size,
        max_iterations: args.max_iterations,
        iterations_per_step: args.iterations_per_step,
        step_interval: args.interval,
        ..Default::default()
    };

    let topology = GridTopology::build(config.side_count, config.map_size)
        .context("invalid grid configuration")?;
    let mut simulation = Simulation::new(config).context("invalid simulation configuration")?;
    simulation.set_paused(args.paused);

    let rng = match args.seed {
        Some(seed) => {
            log::info!("seeding erosion rng with {seed}");
            SeededRandom::from_seed(seed)
        }
        None => SeededRandom::from_entropy(),
    };

    log::info!(
        "grid: {}x{} vertices, {} line segments, {} passes at {:.2}s intervals",
        config.side_count,
        config.side_count,
        topology.line_count(),
        config.max_iterations,
        config.step_interval
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        renderer: None,
        topology,
        simulation,
        rng,
        controller: CameraController::new(),
        last_tick: Instant::now(),
    };

    event_loop.run_app(&mut app)?;

    Ok(())
}
