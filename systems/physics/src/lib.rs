#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized single-cell rule engine that drives the falling-sand physics.
//!
//! Each [`Physics::step`] call is one tick: select one random cell, look up
//! its material, and apply that material's transition rule. Rules never touch
//! the grid directly; they read a [`GridView`] and emit `SetCell`/`SwapCells`
//! commands for the world to apply, so a render pass between ticks always
//! observes a fully consistent grid. All randomness flows through the single
//! injected generator, which makes a whole run reproducible from one seed.

mod tables;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sandfall_core::{CellCoord, Command, GridView, Material};
use tables::{gates, ignition_interval, lists};

const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHOGONAL_OFFSETS: [(i64, i64); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Vertical direction a flowing material is drawn toward.
///
/// Steam is water upside down: the same fall-then-spread rule runs for both,
/// parameterized on this direction.
#[derive(Clone, Copy, Debug)]
enum Pull {
    /// Toward larger row indices, for the liquids and granular solids.
    Down,
    /// Toward smaller row indices, for steam.
    Up,
}

impl Pull {
    /// Row the pulled material is trying to enter, or `None` at the edge of
    /// the grid.
    fn target_row(self, row: u32, rows: u32) -> Option<u32> {
        match self {
            Pull::Down => {
                let next = row.checked_add(1)?;
                (next < rows).then_some(next)
            }
            Pull::Up => row.checked_sub(1),
        }
    }
}

/// Pure rule engine that evolves the grid one randomly chosen cell at a time.
#[derive(Clone, Debug)]
pub struct Physics<R> {
    rng: R,
}

impl Physics<ChaCha8Rng> {
    /// Creates an engine whose whole run is reproducible from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R> Physics<R>
where
    R: Rng,
{
    /// Creates an engine backed by the provided random source.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Executes one simulation tick against the provided grid view.
    ///
    /// At most a handful of commands are emitted per tick: zero when the
    /// selected cell is inert or its gate did not fire, one or two for
    /// movement and combustion, three for the steam-producing ignitions.
    pub fn step(&mut self, grid: GridView<'_>, out: &mut Vec<Command>) {
        let (rows, columns) = grid.dimensions();
        if rows == 0 || columns == 0 {
            return;
        }

        let cell = CellCoord::new(
            self.rng.gen_range(0..rows),
            self.rng.gen_range(0..columns),
        );
        match grid.material(cell) {
            Material::Empty
            | Material::Metal
            | Material::Obsidian
            | Material::Glass
            | Material::Wood
            | Material::Leaf
            | Material::Tnt => {}
            Material::Sand => self.sand(cell, grid, out),
            Material::Water => self.flow_gated(
                cell,
                Material::Water,
                &lists::WATER_FLOWS_THROUGH,
                gates::WATER_FALL,
                Pull::Down,
                grid,
                out,
            ),
            Material::Oil => self.flow_gated(
                cell,
                Material::Oil,
                &lists::OIL_FLOWS_THROUGH,
                gates::OIL_FALL,
                Pull::Down,
                grid,
                out,
            ),
            Material::Lava => self.lava(cell, grid, out),
            Material::Fire => self.fire(cell, grid, out),
            Material::Ice => self.ice(cell, grid, out),
            Material::Steam => self.flow_gated(
                cell,
                Material::Steam,
                &lists::STEAM_RISES_THROUGH,
                gates::STEAM_RISE,
                Pull::Up,
                grid,
                out,
            ),
            Material::Stone => self.stone(cell, grid, out),
            Material::Gas => self.gas(cell, grid, out),
            Material::Virus => self.virus(cell, grid, out),
        }
    }

    /// Bernoulli gate: true with probability `1 / interval`.
    ///
    /// Each call is an independent trial; rules that gate several behaviors
    /// of the same cell in one tick draw separately for each.
    fn trial(&mut self, interval: u32) -> bool {
        self.rng.gen_range(0..interval) == 0
    }

    /// Sand falls through anything lighter, and once it lands on more sand it
    /// slides into a free diagonal, which is what piles the familiar
    /// angle-of-repose triangles.
    fn sand(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        let (rows, columns) = grid.dimensions();
        let Some(next_row) = Pull::Down.target_row(cell.row(), rows) else {
            return;
        };
        if !self.trial(gates::SAND_FALL) {
            return;
        }

        let below = CellCoord::new(next_row, cell.column());
        let below_material = grid.material(below);
        if lists::SAND_SINKS_THROUGH.contains(&below_material) {
            out.push(Command::SwapCells { a: cell, b: below });
            return;
        }
        if below_material != Material::Sand {
            return;
        }

        let left = cell
            .column()
            .checked_sub(1)
            .map(|column| CellCoord::new(next_row, column))
            .filter(|diagonal| lists::SAND_SINKS_THROUGH.contains(&grid.material(*diagonal)));
        let right = cell
            .column()
            .checked_add(1)
            .filter(|column| *column < columns)
            .map(|column| CellCoord::new(next_row, column))
            .filter(|diagonal| lists::SAND_SINKS_THROUGH.contains(&grid.material(*diagonal)));

        let destination = match (left, right) {
            (Some(left), Some(right)) => {
                if self.rng.gen_bool(0.5) {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            (Some(left), None) => Some(left),
            (None, Some(right)) => Some(right),
            (None, None) => None,
        };
        if let Some(destination) = destination {
            out.push(Command::SwapCells {
                a: cell,
                b: destination,
            });
        }
    }

    /// Gate wrapper around [`Physics::flow`] for the materials whose whole
    /// turn is a single gated flow attempt.
    #[allow(clippy::too_many_arguments)] // One call site per flowing material keeps the table readable.
    fn flow_gated(
        &mut self,
        cell: CellCoord,
        material: Material,
        allow: &[Material],
        gate: u32,
        toward: Pull,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let (rows, _) = grid.dimensions();
        if toward.target_row(cell.row(), rows).is_none() {
            return;
        }
        if !self.trial(gate) {
            return;
        }
        self.flow(cell, material, allow, toward, grid, out);
    }

    /// The shared liquid rule: fall one row if the cell ahead is allowed,
    /// otherwise spread toward the nearest lateral opening in the target row.
    ///
    /// The opening search scans left and right independently and stops each
    /// side at the first cell that is neither `material` nor allowed. A
    /// strictly closer side wins; equal non-zero distances are settled by a
    /// fair coin; when neither side found anything the material nudges at
    /// most one column within its own row. Pooling rather than random
    /// walking falls out of always preferring the nearest opening.
    fn flow(
        &mut self,
        cell: CellCoord,
        material: Material,
        allow: &[Material],
        toward: Pull,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let (rows, _) = grid.dimensions();
        let Some(next_row) = toward.target_row(cell.row(), rows) else {
            return;
        };

        let ahead = CellCoord::new(next_row, cell.column());
        let ahead_material = grid.material(ahead);
        if allow.contains(&ahead_material) {
            out.push(Command::SwapCells { a: cell, b: ahead });
            return;
        }
        if ahead_material != material {
            return;
        }

        let left = nearest_opening(grid, next_row, cell.column(), -1, material, allow);
        let right = nearest_opening(grid, next_row, cell.column(), 1, material, allow);
        let destination = match (left, right) {
            (None, None) => {
                self.lateral_nudge(cell, allow, grid, out);
                return;
            }
            (Some(distance), None) => CellCoord::new(next_row, cell.column() - distance),
            (None, Some(distance)) => CellCoord::new(next_row, cell.column() + distance),
            (Some(left_distance), Some(right_distance)) => {
                if left_distance < right_distance
                    || (left_distance == right_distance && self.rng.gen_bool(0.5))
                {
                    CellCoord::new(next_row, cell.column() - left_distance)
                } else {
                    CellCoord::new(next_row, cell.column() + right_distance)
                }
            }
        };
        out.push(Command::SwapCells {
            a: cell,
            b: destination,
        });
    }

    /// No opening on either side: drift at most one column sideways within
    /// the current row, and only into an allowed cell.
    fn lateral_nudge(
        &mut self,
        cell: CellCoord,
        allow: &[Material],
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let offset = self.rng.gen_range(-1i64..=1);
        let column = i64::from(cell.column()) + offset;
        let Ok(column) = u32::try_from(column) else {
            return;
        };
        let target = CellCoord::new(cell.row(), column);
        if target == cell || !grid.contains(target) {
            return;
        }
        if allow.contains(&grid.material(target)) {
            out.push(Command::SwapCells { a: cell, b: target });
        }
    }

    /// Lava flows like a slow liquid, but water contact outranks movement:
    /// water below freezes into stone, water above quenches the lava into
    /// obsidian one row down, and either way the lava boils off as steam.
    /// Lava also ignites its surroundings every tick, gate or not.
    fn lava(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        let (rows, _) = grid.dimensions();
        if let Some(next_row) = Pull::Down.target_row(cell.row(), rows) {
            if self.trial(gates::LAVA_FLOW) {
                let below = CellCoord::new(next_row, cell.column());
                if grid.material(below) == Material::Water {
                    out.push(Command::SetCell {
                        cell,
                        material: Material::Steam,
                    });
                    out.push(Command::SetCell {
                        cell: below,
                        material: Material::Stone,
                    });
                    return;
                }

                let above = cell
                    .row()
                    .checked_sub(1)
                    .map(|row| CellCoord::new(row, cell.column()));
                if let Some(above) = above {
                    if grid.material(above) == Material::Water {
                        out.push(Command::SetCell {
                            cell,
                            material: Material::Steam,
                        });
                        out.push(Command::SetCell {
                            cell: below,
                            material: Material::Obsidian,
                        });
                        return;
                    }
                }

                self.flow(
                    cell,
                    Material::Lava,
                    &lists::LAVA_FLOWS_THROUGH,
                    Pull::Down,
                    grid,
                    out,
                );
            }
        }

        self.ignite_neighbor(cell, &lists::LAVA_BURNABLE, grid, out);
    }

    /// Fire dies down, licks upward into empty space, and ignites one sampled
    /// neighbor. Each of the three behaviors rolls its own gate every tick.
    fn fire(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        if self.trial(gates::FIRE_EXTINGUISH) {
            out.push(Command::SetCell {
                cell,
                material: Material::Empty,
            });
        }

        if let Some(above_row) = cell.row().checked_sub(1) {
            if self.trial(gates::FIRE_RISE) {
                let above = CellCoord::new(above_row, cell.column());
                if grid.material(above) == Material::Empty {
                    out.push(Command::SetCell {
                        cell: above,
                        material: Material::Fire,
                    });
                }
            }
        }

        self.ignite_neighbor(cell, &lists::FIRE_BURNABLE, grid, out);
    }

    /// Samples one Moore neighbor and, if it is fuel for this flame, burns it
    /// per the ignition table. Igniting water or ice spends the flame itself:
    /// the igniting cell empties, the target converts, and steam is written
    /// one row above the target, but only when that row exists; otherwise the
    /// whole rule holds off. Sand vitrifies both cells into glass.
    fn ignite_neighbor(
        &mut self,
        origin: CellCoord,
        burnable: &[Material],
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let target = self.moore_neighbor(origin, grid);
        if target == origin {
            return;
        }
        let material = grid.material(target);
        if !burnable.contains(&material) {
            return;
        }
        let Some(interval) = ignition_interval(material) else {
            return;
        };
        if !self.trial(interval) {
            return;
        }

        match material {
            Material::Tnt
            | Material::Gas
            | Material::Oil
            | Material::Leaf
            | Material::Wood
            | Material::Virus => {
                out.push(Command::SetCell {
                    cell: target,
                    material: Material::Fire,
                });
            }
            Material::Water => {
                let Some(above_row) = target.row().checked_sub(1) else {
                    return;
                };
                out.push(Command::SetCell {
                    cell: origin,
                    material: Material::Empty,
                });
                out.push(Command::SetCell {
                    cell: target,
                    material: Material::Fire,
                });
                out.push(Command::SetCell {
                    cell: CellCoord::new(above_row, target.column()),
                    material: Material::Steam,
                });
            }
            Material::Ice => {
                let Some(above_row) = target.row().checked_sub(1) else {
                    return;
                };
                out.push(Command::SetCell {
                    cell: origin,
                    material: Material::Empty,
                });
                out.push(Command::SetCell {
                    cell: target,
                    material: Material::Water,
                });
                out.push(Command::SetCell {
                    cell: CellCoord::new(above_row, target.column()),
                    material: Material::Steam,
                });
            }
            Material::Sand => {
                out.push(Command::SetCell {
                    cell: origin,
                    material: Material::Glass,
                });
                out.push(Command::SetCell {
                    cell: target,
                    material: Material::Glass,
                });
            }
            _ => {}
        }
    }

    /// Ice conducts cold into one sampled neighbor: water freezes, steam
    /// condenses back to water.
    fn ice(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        if !self.trial(gates::ICE_ACT) {
            return;
        }
        let target = self.moore_neighbor(cell, grid);
        if target == cell {
            return;
        }
        match grid.material(target) {
            Material::Water => out.push(Command::SetCell {
                cell: target,
                material: Material::Ice,
            }),
            Material::Steam => out.push(Command::SetCell {
                cell: target,
                material: Material::Water,
            }),
            _ => {}
        }
    }

    /// Stone drops straight down through the fluid phases; it never spreads
    /// sideways, so it stacks into columns instead of slopes.
    fn stone(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        let (rows, _) = grid.dimensions();
        let Some(next_row) = Pull::Down.target_row(cell.row(), rows) else {
            return;
        };
        if !self.trial(gates::STONE_FALL) {
            return;
        }
        let below = CellCoord::new(next_row, cell.column());
        if lists::STONE_SINKS_THROUGH.contains(&grid.material(below)) {
            out.push(Command::SwapCells { a: cell, b: below });
        }
    }

    /// Gas wanders into one sampled orthogonal neighbor when it is empty.
    /// Diagonals are deliberately excluded so gas cannot slip through the
    /// corner of a one-cell-thick container wall.
    fn gas(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        if self.trial(gates::GAS_HOLD) {
            return;
        }
        let target = self.orthogonal_neighbor(cell, grid);
        if target == cell {
            return;
        }
        if grid.material(target) == Material::Empty {
            out.push(Command::SwapCells { a: cell, b: target });
        }
    }

    /// Virus spreads into any sampled non-empty neighbor and independently
    /// rots away to nothing, each on its own slow gate.
    fn virus(&mut self, cell: CellCoord, grid: GridView<'_>, out: &mut Vec<Command>) {
        if self.trial(gates::VIRUS_HOLD) {
            return;
        }
        if self.trial(gates::VIRUS_INFECT) {
            let target = self.moore_neighbor(cell, grid);
            if target != cell && grid.material(target) != Material::Empty {
                out.push(Command::SetCell {
                    cell: target,
                    material: Material::Virus,
                });
            }
        }
        if self.trial(gates::VIRUS_DECAY) {
            out.push(Command::SetCell {
                cell,
                material: Material::Empty,
            });
        }
    }

    /// Picks uniformly among the 8 Moore neighbors; an out-of-range pick
    /// degenerates to the origin cell, which callers treat as a no-op.
    fn moore_neighbor(&mut self, origin: CellCoord, grid: GridView<'_>) -> CellCoord {
        let (row_offset, column_offset) = MOORE_OFFSETS[self.rng.gen_range(0..MOORE_OFFSETS.len())];
        offset_or_self(origin, row_offset, column_offset, grid)
    }

    /// Picks uniformly among the 4 orthogonal neighbors with the same
    /// clamp-to-self policy as [`Physics::moore_neighbor`].
    fn orthogonal_neighbor(&mut self, origin: CellCoord, grid: GridView<'_>) -> CellCoord {
        let (row_offset, column_offset) =
            ORTHOGONAL_OFFSETS[self.rng.gen_range(0..ORTHOGONAL_OFFSETS.len())];
        offset_or_self(origin, row_offset, column_offset, grid)
    }
}

/// Applies an offset to `origin`, clamping out-of-range results back to
/// `origin` itself.
fn offset_or_self(
    origin: CellCoord,
    row_offset: i64,
    column_offset: i64,
    grid: GridView<'_>,
) -> CellCoord {
    let row = i64::from(origin.row()) + row_offset;
    let column = i64::from(origin.column()) + column_offset;
    let (Ok(row), Ok(column)) = (u32::try_from(row), u32::try_from(column)) else {
        return origin;
    };
    let candidate = CellCoord::new(row, column);
    if grid.contains(candidate) {
        candidate
    } else {
        origin
    }
}

/// Scans outward along `row` from `column` in `direction` for the nearest
/// allowed cell. Returns the distance to the first allowed material, or
/// `None` if the scan left the grid or hit a cell that is neither allowed nor
/// more of `material`. The center column is known to hold `material`, so the
/// scan starts one cell out.
fn nearest_opening(
    grid: GridView<'_>,
    row: u32,
    column: u32,
    direction: i64,
    material: Material,
    allow: &[Material],
) -> Option<u32> {
    let (_, columns) = grid.dimensions();
    let mut distance = 1u32;
    loop {
        let probe_column = i64::from(column) + direction * i64::from(distance);
        let probe_column = u32::try_from(probe_column).ok()?;
        if probe_column >= columns {
            return None;
        }
        let probed = grid.material(CellCoord::new(row, probe_column));
        if allow.contains(&probed) {
            return Some(distance);
        }
        if probed != material {
            return None;
        }
        distance = distance.checked_add(1)?;
    }
}
