#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sandfall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and read the
//! grid through borrowed [`GridView`] snapshots, responding exclusively with
//! new command batches.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the simulator boots.
pub const WELCOME_BANNER: &str = "Welcome to Sandfall.";

/// The substance occupying a single grid cell.
///
/// The enumeration is closed: every transition rule in the physics system
/// matches on it exhaustively, so adding a variant fails compilation until
/// each rule has decided how to treat it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    /// Vacant cell; the background everything else moves through.
    Empty,
    /// Granular solid that falls and settles into slopes.
    Sand,
    /// Liquid that pools by seeking the nearest lateral opening.
    Water,
    /// Lighter liquid that floats on water and burns readily.
    Oil,
    /// Slow heavy liquid that ignites neighbors and reacts with water.
    Lava,
    /// Short-lived flame that spreads upward and ignites fuel around it.
    Fire,
    /// Frozen solid that freezes adjacent water and condenses steam.
    Ice,
    /// Hot vapor that behaves as water inverted, rising instead of falling.
    Steam,
    /// Dense solid that falls straight down without forming slopes.
    Stone,
    /// Immovable solid; never changes spontaneously.
    Metal,
    /// Immovable solid formed when water meets lava from above.
    Obsidian,
    /// Immovable solid formed when fire or lava vitrifies sand.
    Glass,
    /// Immovable fuel that burns slowly.
    Wood,
    /// Immovable fuel that burns faster than wood.
    Leaf,
    /// Immovable fuel that burns as fast as gas.
    Tnt,
    /// Buoyant vapor that diffuses orthogonally and burns fast.
    Gas,
    /// Infectious material that converts neighbors and decays away.
    Virus,
}

impl Material {
    /// Every material in declaration order, used for palettes and censuses.
    pub const ALL: [Material; 17] = [
        Material::Empty,
        Material::Sand,
        Material::Water,
        Material::Oil,
        Material::Lava,
        Material::Fire,
        Material::Ice,
        Material::Steam,
        Material::Stone,
        Material::Metal,
        Material::Obsidian,
        Material::Glass,
        Material::Wood,
        Material::Leaf,
        Material::Tnt,
        Material::Gas,
        Material::Virus,
    ];

    /// Human-readable name shown by tool palettes and censuses.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Material::Empty => "Empty",
            Material::Sand => "Sand",
            Material::Water => "Water",
            Material::Oil => "Oil",
            Material::Lava => "Lava",
            Material::Fire => "Fire",
            Material::Ice => "Ice",
            Material::Steam => "Steam",
            Material::Stone => "Stone",
            Material::Metal => "Metal",
            Material::Obsidian => "Obsidian",
            Material::Glass => "Glass",
            Material::Wood => "Wood",
            Material::Leaf => "Leaf",
            Material::Tnt => "TNT",
            Material::Gas => "Gas",
            Material::Virus => "Virus",
        }
    }
}

/// Paintable selection offered to input adapters.
///
/// `Clear` is a command, not a substance: it is never stored in a cell, and
/// painting with it resets the whole grid instead of touching one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Paints the wrapped material into the targeted cell.
    Material(Material),
    /// Resets every cell to [`Material::Empty`].
    Clear,
}

impl Tool {
    /// Every tool in palette order: the materials, then the clear command.
    pub const ALL: [Tool; 18] = [
        Tool::Material(Material::Empty),
        Tool::Material(Material::Sand),
        Tool::Material(Material::Water),
        Tool::Material(Material::Oil),
        Tool::Material(Material::Lava),
        Tool::Material(Material::Fire),
        Tool::Material(Material::Ice),
        Tool::Material(Material::Steam),
        Tool::Material(Material::Stone),
        Tool::Material(Material::Metal),
        Tool::Material(Material::Obsidian),
        Tool::Material(Material::Glass),
        Tool::Material(Material::Wood),
        Tool::Material(Material::Leaf),
        Tool::Material(Material::Tnt),
        Tool::Material(Material::Gas),
        Tool::Material(Material::Virus),
        Tool::Clear,
    ];

    /// Human-readable name shown by tool palettes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tool::Material(material) => material.name(),
            Tool::Clear => "Clear",
        }
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell, increasing downward.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the grid with a fresh all-empty grid of the given shape.
    ConfigureGrid {
        /// Number of rows laid out in the new grid.
        rows: u32,
        /// Number of columns laid out in the new grid.
        columns: u32,
    },
    /// Applies the selected tool at the targeted cell on behalf of input
    /// adapters. Out-of-range cells are ignored.
    Paint {
        /// Cell targeted by the pointer.
        cell: CellCoord,
        /// Tool selected in the palette.
        tool: Tool,
    },
    /// Writes one material into one cell. Emitted by transition rules for
    /// local changes such as combustion and decay.
    SetCell {
        /// Cell whose content is replaced.
        cell: CellCoord,
        /// Material written into the cell.
        material: Material,
    },
    /// Exchanges the contents of two cells. Emitted by transition rules for
    /// spatial moves so the material multiset is preserved.
    SwapCells {
        /// First cell of the exchanged pair.
        a: CellCoord,
        /// Second cell of the exchanged pair.
        b: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the grid was replaced with a fresh all-empty grid.
    GridConfigured {
        /// Number of rows in the new grid.
        rows: u32,
        /// Number of columns in the new grid.
        columns: u32,
    },
    /// Indicates that every cell was reset to empty in place.
    GridCleared,
    /// Confirms that a paint command changed a cell.
    CellPainted {
        /// Cell that was painted.
        cell: CellCoord,
        /// Material now occupying the cell.
        material: Material,
        /// Material that occupied the cell before the paint.
        previous: Material,
    },
    /// Confirms that a transition rule rewrote a cell in place.
    CellSet {
        /// Cell that was rewritten.
        cell: CellCoord,
        /// Material now occupying the cell.
        material: Material,
        /// Material that occupied the cell before the rewrite.
        previous: Material,
    },
    /// Confirms that a transition rule exchanged two cells.
    CellsSwapped {
        /// First cell of the exchanged pair.
        a: CellCoord,
        /// Second cell of the exchanged pair.
        b: CellCoord,
    },
}

/// Read-only view into the dense material grid.
///
/// The view is the only way systems observe cells, and it is handed out
/// between command batches, so readers always see a fully consistent grid
/// and never a partially-applied swap.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Material],
    rows: u32,
    columns: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided cell slice in row-major
    /// order.
    #[must_use]
    pub fn new(cells: &'a [Material], rows: u32, columns: u32) -> Self {
        Self {
            cells,
            rows,
            columns,
        }
    }

    /// Returns the material occupying the provided cell, or
    /// [`Material::Empty`] when the cell lies outside the grid.
    #[must_use]
    pub fn material(&self, cell: CellCoord) -> Material {
        self.index(cell).map_or(Material::Empty, |index| {
            self.cells.get(index).copied().unwrap_or(Material::Empty)
        })
    }

    /// Reports whether the provided cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Material> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, GridView, Material, Tool};

    #[test]
    fn material_roster_is_complete_and_uniquely_named() {
        assert_eq!(Material::ALL.len(), 17);

        for (index, material) in Material::ALL.iter().enumerate() {
            for other in &Material::ALL[index + 1..] {
                assert_ne!(material.name(), other.name());
            }
        }
    }

    #[test]
    fn tool_palette_ends_with_clear() {
        assert_eq!(Tool::ALL.len(), Material::ALL.len() + 1);
        assert_eq!(Tool::ALL[Tool::ALL.len() - 1], Tool::Clear);
        assert_eq!(Tool::Clear.name(), "Clear");
    }

    #[test]
    fn cell_coord_exposes_row_and_column() {
        let cell = CellCoord::new(3, 7);
        assert_eq!(cell.row(), 3);
        assert_eq!(cell.column(), 7);
    }

    #[test]
    fn grid_view_reads_row_major_cells() {
        let cells = [
            Material::Empty,
            Material::Sand,
            Material::Water,
            Material::Stone,
        ];
        let view = GridView::new(&cells, 2, 2);

        assert_eq!(view.material(CellCoord::new(0, 1)), Material::Sand);
        assert_eq!(view.material(CellCoord::new(1, 0)), Material::Water);
        assert_eq!(view.dimensions(), (2, 2));
    }

    #[test]
    fn grid_view_treats_out_of_range_cells_as_empty() {
        let cells = [Material::Sand];
        let view = GridView::new(&cells, 1, 1);

        assert!(!view.contains(CellCoord::new(1, 0)));
        assert_eq!(view.material(CellCoord::new(5, 5)), Material::Empty);
    }
}
