#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Sandfall adapters.
//!
//! The simulation core never names a color or a pixel; this crate is where
//! materials meet presentation. Backends receive a [`Presentation`] and a
//! scene-update callback, poll their platform for [`FrameInput`], and draw
//! whatever the driver wrote into the [`Scene`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use sandfall_core::{CellCoord, Material, Tool};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Base fill color for each material.
#[must_use]
pub const fn material_color(material: Material) -> Color {
    match material {
        Material::Empty => Color::from_rgb_u8(10, 10, 10),
        Material::Sand => Color::from_rgb_u8(255, 200, 0),
        Material::Water => Color::from_rgb_u8(30, 128, 255),
        Material::Oil => Color::from_rgb_u8(40, 30, 5),
        Material::Lava => Color::from_rgb_u8(215, 50, 30),
        Material::Fire => Color::from_rgb_u8(215, 100, 0),
        Material::Ice => Color::from_rgb_u8(170, 220, 255),
        Material::Steam => Color::from_rgb_u8(120, 210, 255),
        Material::Stone => Color::from_rgb_u8(150, 150, 150),
        Material::Metal => Color::from_rgb_u8(40, 40, 40),
        Material::Obsidian => Color::from_rgb_u8(110, 0, 180),
        Material::Glass => Color::from_rgb_u8(230, 230, 230),
        Material::Wood => Color::from_rgb_u8(120, 60, 0),
        Material::Leaf => Color::from_rgb_u8(70, 160, 0),
        Material::Tnt => Color::from_rgb_u8(170, 0, 0),
        Material::Gas => Color::from_rgb_u8(230, 160, 190),
        Material::Virus => Color::from_rgb_u8(100, 225, 30),
    }
}

/// Whether a material's fill flickers in brightness from frame to frame.
///
/// The shimmer is pure presentation: drivers derive it from the frame
/// counter, never from the simulation's random source, so identical seeds
/// still replay identically whatever the display does.
#[must_use]
pub const fn material_shimmers(material: Material) -> bool {
    matches!(
        material,
        Material::Water
            | Material::Oil
            | Material::Lava
            | Material::Fire
            | Material::Steam
            | Material::Gas
            | Material::Virus
    )
}

const SHIMMER_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const SHIMMER_INCREMENT: u64 = 1_442_695_040_888_963_407;

/// Fill color actually presented for a cell on a given frame.
///
/// Restless materials get a brightness wobble keyed on the cell index and
/// frame counter; everything else renders its base color. Two drivers
/// presenting the same grid on the same frame produce identical pixels.
#[must_use]
pub fn presented_color(material: Material, cell_index: usize, frame: u64) -> Color {
    let base = material_color(material);
    if !material_shimmers(material) {
        return base;
    }

    let mixed = (cell_index as u64 ^ frame)
        .wrapping_mul(SHIMMER_MULTIPLIER)
        .wrapping_add(SHIMMER_INCREMENT);
    let amount = (mixed >> 56) as f32 / 255.0 * 0.16;
    base.lighten(amount)
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Grid cell under the cursor, when the cursor is over the grid.
    pub cursor_cell: Option<CellCoord>,
    /// Whether the primary pointer button is held down this frame.
    pub paint_held: bool,
    /// Whether the adapter detected a select-next-tool press on this frame.
    pub tool_next: bool,
    /// Whether the adapter detected a select-previous-tool press on this frame.
    pub tool_previous: bool,
    /// Tool bound to a hotkey the adapter saw pressed on this frame.
    pub tool_hotkey: Option<Tool>,
    /// Whether the adapter detected a clear-grid request on this frame.
    pub clear_requested: bool,
    /// Whether the adapter detected a speed-up request on this frame.
    pub speed_up: bool,
    /// Whether the adapter detected a speed-down request on this frame.
    pub speed_down: bool,
}

/// Describes the cell grid that backends lay out on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPresentation {
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Number of columns contained in the grid.
    pub columns: u32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when either dimension is zero.
    pub fn new(rows: u32, columns: u32) -> Result<Self, RenderingError> {
        if rows == 0 || columns == 0 {
            return Err(RenderingError::EmptyGrid { rows, columns });
        }

        Ok(Self { rows, columns })
    }

    /// Total number of cells the scene must provide colors for.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Side length of a square cell filling as much of the screen as
    /// possible.
    #[must_use]
    pub fn cell_length(&self, screen: Vec2) -> f32 {
        (screen.x / self.columns as f32).min(screen.y / self.rows as f32)
    }

    /// Top-left corner of the grid, centered within the screen.
    #[must_use]
    pub fn origin(&self, screen: Vec2) -> Vec2 {
        let cell = self.cell_length(screen);
        Vec2::new(
            (screen.x - cell * self.columns as f32) * 0.5,
            (screen.y - cell * self.rows as f32) * 0.5,
        )
    }

    /// Maps a screen-space position to the cell underneath it, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec2, screen: Vec2) -> Option<CellCoord> {
        let cell = self.cell_length(screen);
        if cell <= f32::EPSILON {
            return None;
        }

        let local = (position - self.origin(screen)) / cell;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }

        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        (row < self.rows && column < self.columns).then(|| CellCoord::new(row, column))
    }
}

/// Read-outs displayed alongside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudModel {
    /// Tool currently selected in the palette.
    pub selected_tool: Tool,
    /// Simulation steps executed per rendered frame.
    pub steps_per_frame: u32,
    /// Number of cells holding a non-empty material.
    pub occupied_cells: u64,
    /// Total number of cells in the grid.
    pub total_cells: u64,
}

/// Scene description combining the grid geometry, cell fills and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid geometry the backend lays out on screen.
    pub grid: GridPresentation,
    /// Fill color for every cell in row-major order.
    pub cells: Vec<Color>,
    /// Read-outs displayed alongside the grid.
    pub hud: HudModel,
}

impl Scene {
    /// Creates a new scene descriptor.
    ///
    /// Returns an error when the cell colors do not cover the grid exactly.
    pub fn new(
        grid: GridPresentation,
        cells: Vec<Color>,
        hud: HudModel,
    ) -> Result<Self, RenderingError> {
        if cells.len() != grid.cell_count() {
            return Err(RenderingError::CellCountMismatch {
                expected: grid.cell_count(),
                actual: cells.len(),
            });
        }

        Ok(Self { grid, cells, hud })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Sandfall scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered. Drivers run the simulation inside the closure
    /// and rewrite the cell colors from the post-tick grid, so each rendered
    /// frame observes a fully consistent world.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Both grid dimensions must be positive to produce a visible scene.
    EmptyGrid {
        /// Rows provided by the caller.
        rows: u32,
        /// Columns provided by the caller.
        columns: u32,
    },
    /// The scene must provide exactly one color per cell.
    CellCountMismatch {
        /// Number of cells the grid requires.
        expected: usize,
        /// Number of colors the caller provided.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { rows, columns } => {
                write!(
                    f,
                    "grid dimensions must be positive (received {rows}x{columns})"
                )
            }
            Self::CellCountMismatch { expected, actual } => {
                write!(
                    f,
                    "scene must provide {expected} cell colors (received {actual})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::{
        material_color, material_shimmers, presented_color, Color, GridPresentation, HudModel,
        RenderingError, Scene,
    };
    use glam::Vec2;
    use sandfall_core::{CellCoord, Material, Tool};

    #[test]
    fn grid_creation_rejects_zero_dimensions_without_panicking() {
        let error = GridPresentation::new(0, 10).expect_err("zero rows must be rejected");
        assert!(matches!(
            error,
            RenderingError::EmptyGrid {
                rows: 0,
                columns: 10
            }
        ));
    }

    #[test]
    fn scene_creation_requires_one_color_per_cell() {
        let grid = GridPresentation::new(2, 2).expect("positive dimensions should succeed");
        let hud = HudModel {
            selected_tool: Tool::Material(Material::Sand),
            steps_per_frame: 1,
            occupied_cells: 0,
            total_cells: 4,
        };

        let error = Scene::new(grid, vec![material_color(Material::Empty); 3], hud)
            .expect_err("three colors cannot cover four cells");
        assert!(matches!(
            error,
            RenderingError::CellCountMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn cursor_mapping_round_trips_the_cell_centers() {
        let grid = GridPresentation::new(4, 8).expect("positive dimensions should succeed");
        let screen = Vec2::new(800.0, 400.0);
        let cell = grid.cell_length(screen);
        let origin = grid.origin(screen);

        let center = origin + Vec2::new(cell * 2.5, cell * 1.5);
        assert_eq!(grid.cell_at(center, screen), Some(CellCoord::new(1, 2)));

        let outside = origin - Vec2::new(1.0, 1.0);
        assert_eq!(grid.cell_at(outside, screen), None);
    }

    #[test]
    fn material_palette_separates_background_from_substances() {
        let background = material_color(Material::Empty);
        for material in Material::ALL {
            if material == Material::Empty {
                continue;
            }
            assert_ne!(
                material_color(material),
                background,
                "{} blends into the background",
                material.name()
            );
        }
    }

    #[test]
    fn shimmer_is_reserved_for_the_restless_phases() {
        assert!(material_shimmers(Material::Fire));
        assert!(material_shimmers(Material::Water));
        assert!(!material_shimmers(Material::Metal));
        assert!(!material_shimmers(Material::Sand));
    }

    #[test]
    fn presented_colors_are_deterministic_per_frame() {
        assert_eq!(
            presented_color(Material::Fire, 42, 7),
            presented_color(Material::Fire, 42, 7)
        );
        assert_eq!(
            presented_color(Material::Metal, 42, 7),
            material_color(Material::Metal),
            "steady materials must render their base color"
        );
    }

    #[test]
    fn lighten_moves_channels_toward_white() {
        let color = Color::from_rgb_u8(100, 0, 200).lighten(0.5);
        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 0.0);
        assert!(color.blue > 200.0 / 255.0);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }
}
