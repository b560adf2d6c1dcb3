use sandfall_core::{CellCoord, Command, Event, Material, Tool};
use sandfall_system_physics::Physics;
use sandfall_world::{self as world, query, World};

const TICKS: u32 = 20_000;

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    cells: Vec<Material>,
    events: Vec<Event>,
}

/// Builds the same busy little scene every time: a sand heap over a water
/// pool, an oil slick, burning wood, lava dripping toward ice, and a pocket
/// of gas and virus to keep the decay rules honest.
fn painted_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            rows: 12,
            columns: 12,
        },
        &mut events,
    );

    let strokes: [(u32, u32, Material); 22] = [
        (0, 3, Material::Sand),
        (0, 4, Material::Sand),
        (1, 4, Material::Sand),
        (10, 2, Material::Water),
        (10, 3, Material::Water),
        (10, 4, Material::Water),
        (11, 2, Material::Water),
        (11, 3, Material::Water),
        (9, 3, Material::Oil),
        (2, 8, Material::Lava),
        (5, 8, Material::Ice),
        (6, 8, Material::Ice),
        (4, 1, Material::Wood),
        (5, 1, Material::Wood),
        (3, 1, Material::Fire),
        (4, 2, Material::Leaf),
        (7, 6, Material::Gas),
        (8, 10, Material::Virus),
        (8, 9, Material::Tnt),
        (11, 7, Material::Stone),
        (6, 5, Material::Metal),
        (7, 5, Material::Metal),
    ];
    for (row, column, material) in strokes {
        world::apply(
            &mut world,
            Command::Paint {
                cell: CellCoord::new(row, column),
                tool: Tool::Material(material),
            },
            &mut events,
        );
    }
    world
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = painted_world();
    let mut physics = Physics::seeded(seed);
    let mut log = Vec::new();

    let mut commands = Vec::new();
    for _ in 0..TICKS {
        physics.step(query::grid_view(&world), &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut log);
        }
    }

    ReplayOutcome {
        cells: query::grid_view(&world).iter().collect(),
        events: log,
    }
}

#[test]
fn identical_seeds_reproduce_the_run_exactly() {
    let first = replay(0xD1CE_5EED);
    let second = replay(0xD1CE_5EED);

    assert!(
        !first.events.is_empty(),
        "the scene must produce at least one transition in {TICKS} ticks"
    );
    assert_eq!(first, second, "replay with the same seed diverged");
}

#[test]
fn replayed_transitions_never_leave_the_grid() {
    let outcome = replay(0x0123_4567_89AB_CDEF);
    let in_range = |cell: &CellCoord| cell.row() < 12 && cell.column() < 12;

    assert_eq!(outcome.cells.len(), 12 * 12);
    for event in &outcome.events {
        match event {
            Event::CellPainted { cell, .. } | Event::CellSet { cell, .. } => {
                assert!(in_range(cell), "out-of-range write in {event:?}");
            }
            Event::CellsSwapped { a, b } => {
                assert!(in_range(a) && in_range(b), "out-of-range swap in {event:?}");
            }
            Event::GridConfigured { .. } | Event::GridCleared => {}
        }
    }
}
