#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that maintains the material census.
//!
//! The census is kept incrementally from world events: paints and rule
//! rewrites move one cell between two material buckets, swaps move nothing,
//! and grid resets collapse everything back into the empty bucket. Keeping
//! the bookkeeping event-driven means the HUD can show live counts without
//! ever rescanning the grid.

use sandfall_core::{Event, GridView, Material};

/// Pure system that folds world events into a running material census.
#[derive(Clone, Debug, Default)]
pub struct Analytics {
    census: MaterialCensus,
}

impl Analytics {
    /// Creates a new analytics system describing an empty zero-cell grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the census from a full grid scan.
    ///
    /// Used once at startup; afterwards the event stream keeps the census
    /// current on its own.
    pub fn reset_from_view(&mut self, view: GridView<'_>) {
        let (rows, columns) = view.dimensions();
        self.census = MaterialCensus::all_empty(u64::from(rows) * u64::from(columns));
        for material in view.iter() {
            self.census.move_cell(Material::Empty, material);
        }
    }

    /// Folds a batch of world events into the census.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::GridConfigured { rows, columns } => {
                    self.census =
                        MaterialCensus::all_empty(u64::from(*rows) * u64::from(*columns));
                }
                Event::GridCleared => {
                    self.census = MaterialCensus::all_empty(self.census.total_cells());
                }
                Event::CellPainted {
                    material, previous, ..
                }
                | Event::CellSet {
                    material, previous, ..
                } => {
                    self.census.move_cell(*previous, *material);
                }
                Event::CellsSwapped { .. } => {}
            }
        }
    }

    /// Returns the census as of the last handled event batch.
    #[must_use]
    pub fn census(&self) -> &MaterialCensus {
        &self.census
    }
}

/// Per-material cell counts for the whole grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialCensus {
    counts: [u64; Material::ALL.len()],
    total: u64,
}

impl MaterialCensus {
    fn all_empty(total: u64) -> Self {
        let mut counts = [0; Material::ALL.len()];
        counts[slot(Material::Empty)] = total;
        Self { counts, total }
    }

    fn move_cell(&mut self, from: Material, to: Material) {
        self.counts[slot(from)] = self.counts[slot(from)].saturating_sub(1);
        self.counts[slot(to)] = self.counts[slot(to)].saturating_add(1);
    }

    /// Number of cells currently holding the provided material.
    #[must_use]
    pub fn count(&self, material: Material) -> u64 {
        self.counts[slot(material)]
    }

    /// Total number of cells in the tracked grid.
    #[must_use]
    pub const fn total_cells(&self) -> u64 {
        self.total
    }

    /// Number of cells holding anything other than [`Material::Empty`].
    #[must_use]
    pub fn occupied(&self) -> u64 {
        self.total.saturating_sub(self.count(Material::Empty))
    }
}

impl Default for MaterialCensus {
    fn default() -> Self {
        Self::all_empty(0)
    }
}

fn slot(material: Material) -> usize {
    match material {
        Material::Empty => 0,
        Material::Sand => 1,
        Material::Water => 2,
        Material::Oil => 3,
        Material::Lava => 4,
        Material::Fire => 5,
        Material::Ice => 6,
        Material::Steam => 7,
        Material::Stone => 8,
        Material::Metal => 9,
        Material::Obsidian => 10,
        Material::Glass => 11,
        Material::Wood => 12,
        Material::Leaf => 13,
        Material::Tnt => 14,
        Material::Gas => 15,
        Material::Virus => 16,
    }
}
