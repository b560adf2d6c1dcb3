#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Sandfall.

use sandfall_core::{CellCoord, Command, Event, Material, Tool, WELCOME_BANNER};

const DEFAULT_GRID_ROWS: u32 = 150;
const DEFAULT_GRID_COLUMNS: u32 = 100;

/// Represents the authoritative Sandfall world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: MaterialGrid,
}

impl World {
    /// Creates a new Sandfall world with the default all-empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: MaterialGrid::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLUMNS),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands targeting cells outside the grid are ignored without emitting
/// events: bounds safety is structural, never an error surfaced to callers.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { rows, columns } => {
            world.grid = MaterialGrid::new(rows, columns);
            out_events.push(Event::GridConfigured { rows, columns });
        }
        Command::Paint { cell, tool } => match tool {
            Tool::Clear => {
                world.grid.reset();
                out_events.push(Event::GridCleared);
            }
            Tool::Material(material) => {
                if let Some(previous) = world.grid.replace(cell, material) {
                    out_events.push(Event::CellPainted {
                        cell,
                        material,
                        previous,
                    });
                }
            }
        },
        Command::SetCell { cell, material } => {
            if let Some(previous) = world.grid.replace(cell, material) {
                out_events.push(Event::CellSet {
                    cell,
                    material,
                    previous,
                });
            }
        }
        Command::SwapCells { a, b } => {
            if world.grid.swap(a, b) {
                out_events.push(Event::CellsSwapped { a, b });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use sandfall_core::{CellCoord, GridView, Material};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of the material grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        let (rows, columns) = world.grid.dimensions();
        GridView::new(world.grid.cells(), rows, columns)
    }

    /// Provides the dimensions of the material grid as `(rows, columns)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Returns the material occupying the provided cell, if it is in range.
    #[must_use]
    pub fn material_at(world: &World, cell: CellCoord) -> Option<Material> {
        world.grid.material(cell)
    }
}

#[derive(Clone, Debug)]
struct MaterialGrid {
    rows: u32,
    columns: u32,
    cells: Vec<Material>,
}

impl MaterialGrid {
    fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![Material::Empty; capacity],
        }
    }

    fn reset(&mut self) {
        self.cells.fill(Material::Empty);
    }

    fn material(&self, cell: CellCoord) -> Option<Material> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Writes `material` into `cell`, returning the previous occupant, or
    /// `None` when the cell lies outside the grid.
    fn replace(&mut self, cell: CellCoord, material: Material) -> Option<Material> {
        let index = self.index(cell)?;
        let slot = self.cells.get_mut(index)?;
        let previous = *slot;
        *slot = material;
        Some(previous)
    }

    /// Exchanges the contents of two distinct in-range cells. Returns whether
    /// the exchange happened.
    fn swap(&mut self, a: CellCoord, b: CellCoord) -> bool {
        if a == b {
            return false;
        }
        let (Some(index_a), Some(index_b)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(index_a, index_b);
        true
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.rows && cell.column() < self.columns {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn cells(&self) -> &[Material] {
        &self.cells
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use sandfall_core::{CellCoord, Command, Event, Material, Tool};

    fn configure(world: &mut World, rows: u32, columns: u32) {
        let mut events = Vec::new();
        apply(
            world,
            Command::ConfigureGrid { rows, columns },
            &mut events,
        );
        assert_eq!(events, vec![Event::GridConfigured { rows, columns }]);
    }

    #[test]
    fn new_world_starts_all_empty() {
        let world = World::new();
        let view = query::grid_view(&world);

        assert_eq!(view.dimensions(), (150, 100));
        assert!(view.iter().all(|material| material == Material::Empty));
    }

    #[test]
    fn painting_a_material_rewrites_one_cell() {
        let mut world = World::new();
        configure(&mut world, 4, 4);

        let cell = CellCoord::new(2, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Paint {
                cell,
                tool: Tool::Material(Material::Sand),
            },
            &mut events,
        );

        assert_eq!(query::material_at(&world, cell), Some(Material::Sand));
        assert_eq!(
            events,
            vec![Event::CellPainted {
                cell,
                material: Material::Sand,
                previous: Material::Empty,
            }]
        );
    }

    #[test]
    fn painting_clear_resets_the_whole_grid() {
        let mut world = World::new();
        configure(&mut world, 3, 3);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Paint {
                cell: CellCoord::new(0, 0),
                tool: Tool::Material(Material::Lava),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Paint {
                cell: CellCoord::new(2, 2),
                tool: Tool::Clear,
            },
            &mut events,
        );

        let view = query::grid_view(&world);
        assert!(view.iter().all(|material| material == Material::Empty));
        assert!(events.contains(&Event::GridCleared));
    }

    #[test]
    fn out_of_range_commands_are_ignored() {
        let mut world = World::new();
        configure(&mut world, 2, 2);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Paint {
                cell: CellCoord::new(9, 9),
                tool: Tool::Material(Material::Stone),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetCell {
                cell: CellCoord::new(2, 0),
                material: Material::Stone,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SwapCells {
                a: CellCoord::new(0, 0),
                b: CellCoord::new(0, 5),
            },
            &mut events,
        );

        assert!(events.is_empty());
        let view = query::grid_view(&world);
        assert!(view.iter().all(|material| material == Material::Empty));
    }

    #[test]
    fn swapping_cells_exchanges_their_contents() {
        let mut world = World::new();
        configure(&mut world, 2, 1);

        let top = CellCoord::new(0, 0);
        let bottom = CellCoord::new(1, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetCell {
                cell: top,
                material: Material::Sand,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetCell {
                cell: bottom,
                material: Material::Water,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::SwapCells { a: top, b: bottom },
            &mut events,
        );

        assert_eq!(query::material_at(&world, top), Some(Material::Water));
        assert_eq!(query::material_at(&world, bottom), Some(Material::Sand));
        assert_eq!(events, vec![Event::CellsSwapped { a: top, b: bottom }]);
    }

    #[test]
    fn swapping_a_cell_with_itself_is_a_no_op() {
        let mut world = World::new();
        configure(&mut world, 1, 1);

        let cell = CellCoord::new(0, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SwapCells { a: cell, b: cell },
            &mut events,
        );

        assert!(events.is_empty());
    }
}
