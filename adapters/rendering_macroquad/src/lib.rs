#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Sandfall.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};
use sandfall_core::{Material, Tool};
use sandfall_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

const DISPLAY_CONFIG_PATH: &str = "sandfall-display.toml";

/// Digit keys bound to the hotbar, in hotbar order.
const HOTBAR_KEYS: [KeyCode; 10] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
    KeyCode::Key0,
];

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the window loop.
    quit_requested: bool,
    /// `]` or right arrow selects the next palette tool.
    next_tool: bool,
    /// `[` or left arrow selects the previous palette tool.
    previous_tool: bool,
    /// `C` clears the grid.
    clear_grid: bool,
    /// `=` raises the simulation speed.
    speed_up: bool,
    /// `-` lowers the simulation speed.
    speed_down: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let next_tool = is_key_pressed(KeyCode::RightBracket) || is_key_pressed(KeyCode::Right);
        let previous_tool = is_key_pressed(KeyCode::LeftBracket) || is_key_pressed(KeyCode::Left);
        let clear_grid = is_key_pressed(KeyCode::C);
        let speed_up = is_key_pressed(KeyCode::Equal);
        let speed_down = is_key_pressed(KeyCode::Minus);

        Self {
            quit_requested,
            next_tool,
            previous_tool,
            clear_grid,
            speed_up,
            speed_down,
        }
    }
}

/// Optional window and hotbar overrides read from `sandfall-display.toml`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
struct DisplayConfig {
    window_width: i32,
    window_height: i32,
    hotbar: Vec<Material>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 960,
            hotbar: vec![
                Material::Sand,
                Material::Water,
                Material::Oil,
                Material::Lava,
                Material::Fire,
                Material::Ice,
                Material::Steam,
                Material::Stone,
                Material::Wood,
                Material::Gas,
            ],
        }
    }
}

impl DisplayConfig {
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read display config at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse display config at {}", path.display()))
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Clone, Copy, Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    average: Option<f32>,
}

impl FpsCounter {
    fn record(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.frames = self.frames.saturating_add(1);
        if self.elapsed >= Duration::from_secs(1) {
            self.average = Some(self.frames as f32 / self.elapsed.as_secs_f32());
            self.elapsed = Duration::ZERO;
            self.frames = 0;
        }
    }

    fn average(&self) -> Option<f32> {
        self.average
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend draws a frames-per-second read-out.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let display = DisplayConfig::load_or_default(DISPLAY_CONFIG_PATH)
            .context("failed to load the display configuration")?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: display.window_width,
            window_height: display.window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let hotbar = display.hotbar;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&scene, screen, keyboard, &hotbar);

                update_scene(frame_dt, frame_input, &mut scene);

                draw_cells(&scene, screen);

                fps_counter.record(frame_dt);
                let fps = show_fps.then(|| fps_counter.average()).flatten();
                draw_hud(&scene, fps);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(
    scene: &Scene,
    screen: Vec2,
    keyboard: KeyboardShortcuts,
    hotbar: &[Material],
) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let cursor_cell = scene.grid.cell_at(Vec2::new(cursor_x, cursor_y), screen);

    FrameInput {
        cursor_cell,
        paint_held: is_mouse_button_down(MouseButton::Left),
        tool_next: keyboard.next_tool,
        tool_previous: keyboard.previous_tool,
        tool_hotkey: poll_hotbar(hotbar),
        clear_requested: keyboard.clear_grid,
        speed_up: keyboard.speed_up,
        speed_down: keyboard.speed_down,
    }
}

fn poll_hotbar(hotbar: &[Material]) -> Option<Tool> {
    HOTBAR_KEYS
        .iter()
        .position(|key| is_key_pressed(*key))
        .and_then(|index| hotbar.get(index))
        .copied()
        .map(Tool::Material)
}

fn draw_cells(scene: &Scene, screen: Vec2) {
    let cell = scene.grid.cell_length(screen);
    let origin = scene.grid.origin(screen);
    let columns = scene.grid.columns as usize;

    for (index, color) in scene.cells.iter().enumerate() {
        let row = index / columns;
        let column = index % columns;
        let x = origin.x + column as f32 * cell;
        let y = origin.y + row as f32 * cell;
        macroquad::shapes::draw_rectangle(x, y, cell, cell, to_macroquad_color(*color));
    }

    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        cell * scene.grid.columns as f32,
        cell * scene.grid.rows as f32,
        2.0,
        macroquad::color::DARKGRAY,
    );
}

fn draw_hud(scene: &Scene, fps: Option<f32>) {
    let hud = &scene.hud;
    let status = format!(
        "tool: {}   speed: {}x   cells: {}/{}",
        hud.selected_tool.name(),
        hud.steps_per_frame,
        hud.occupied_cells,
        hud.total_cells,
    );
    macroquad::text::draw_text(&status, 8.0, 20.0, 22.0, macroquad::color::WHITE);
    macroquad::text::draw_text(
        "paint: left mouse   tool: [ ] or 1-0   speed: - =   clear: C   quit: Q",
        8.0,
        40.0,
        18.0,
        macroquad::color::GRAY,
    );

    if let Some(fps) = fps {
        let read_out = format!("fps: {fps:.0}");
        macroquad::text::draw_text(&read_out, 8.0, 60.0, 18.0, macroquad::color::GRAY);
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::{DisplayConfig, Material};

    #[test]
    fn display_config_parses_window_and_hotbar_overrides() {
        let parsed: DisplayConfig = toml::from_str(
            r#"
                window_width = 640
                window_height = 480
                hotbar = ["Virus", "Tnt"]
            "#,
        )
        .expect("override config must parse");

        assert_eq!(parsed.window_width, 640);
        assert_eq!(parsed.window_height, 480);
        assert_eq!(parsed.hotbar, vec![Material::Virus, Material::Tnt]);
    }

    #[test]
    fn display_config_defaults_fill_missing_fields() {
        let parsed: DisplayConfig =
            toml::from_str("window_width = 1280").expect("partial config must parse");

        assert_eq!(parsed.window_width, 1280);
        assert_eq!(parsed.window_height, DisplayConfig::default().window_height);
        assert_eq!(parsed.hotbar, DisplayConfig::default().hotbar);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let loaded = DisplayConfig::load_or_default("definitely-not-a-real-config.toml")
            .expect("missing file must not be an error");
        assert_eq!(loaded, DisplayConfig::default());
    }
}
