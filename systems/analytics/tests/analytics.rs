use sandfall_core::{CellCoord, Command, Material, Tool};
use sandfall_system_analytics::Analytics;
use sandfall_world::{self as world, query, World};

fn apply_tracked(world: &mut World, analytics: &mut Analytics, command: Command) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    analytics.handle(&events);
}

fn census_by_scan(world: &World, material: Material) -> u64 {
    query::grid_view(world)
        .iter()
        .filter(|occupant| *occupant == material)
        .count() as u64
}

#[test]
fn incremental_census_matches_a_full_grid_scan() {
    let mut world = World::new();
    let mut analytics = Analytics::new();
    analytics.reset_from_view(query::grid_view(&world));

    apply_tracked(
        &mut world,
        &mut analytics,
        Command::ConfigureGrid {
            rows: 6,
            columns: 6,
        },
    );

    let strokes = [
        (0, 0, Material::Sand),
        (0, 1, Material::Sand),
        (1, 0, Material::Water),
        (2, 2, Material::Lava),
        (3, 3, Material::Wood),
        (3, 3, Material::Fire),
        (5, 5, Material::Metal),
    ];
    for (row, column, material) in strokes {
        apply_tracked(
            &mut world,
            &mut analytics,
            Command::Paint {
                cell: CellCoord::new(row, column),
                tool: Tool::Material(material),
            },
        );
    }
    apply_tracked(
        &mut world,
        &mut analytics,
        Command::SetCell {
            cell: CellCoord::new(1, 0),
            material: Material::Ice,
        },
    );
    apply_tracked(
        &mut world,
        &mut analytics,
        Command::SwapCells {
            a: CellCoord::new(0, 0),
            b: CellCoord::new(1, 1),
        },
    );

    for material in Material::ALL {
        assert_eq!(
            analytics.census().count(material),
            census_by_scan(&world, material),
            "census drifted for {}",
            material.name()
        );
    }
    assert_eq!(analytics.census().total_cells(), 36);
}

#[test]
fn clearing_the_grid_returns_every_cell_to_the_empty_bucket() {
    let mut world = World::new();
    let mut analytics = Analytics::new();

    apply_tracked(
        &mut world,
        &mut analytics,
        Command::ConfigureGrid {
            rows: 3,
            columns: 3,
        },
    );
    apply_tracked(
        &mut world,
        &mut analytics,
        Command::Paint {
            cell: CellCoord::new(1, 1),
            tool: Tool::Material(Material::Virus),
        },
    );
    apply_tracked(
        &mut world,
        &mut analytics,
        Command::Paint {
            cell: CellCoord::new(0, 0),
            tool: Tool::Clear,
        },
    );

    assert_eq!(analytics.census().count(Material::Virus), 0);
    assert_eq!(analytics.census().count(Material::Empty), 9);
    assert_eq!(analytics.census().occupied(), 0);
}

#[test]
fn out_of_range_paints_do_not_disturb_the_census() {
    let mut world = World::new();
    let mut analytics = Analytics::new();

    apply_tracked(
        &mut world,
        &mut analytics,
        Command::ConfigureGrid {
            rows: 2,
            columns: 2,
        },
    );
    apply_tracked(
        &mut world,
        &mut analytics,
        Command::Paint {
            cell: CellCoord::new(7, 7),
            tool: Tool::Material(Material::Stone),
        },
    );

    assert_eq!(analytics.census().count(Material::Stone), 0);
    assert_eq!(analytics.census().count(Material::Empty), 4);
}

#[test]
fn reset_from_view_agrees_with_the_event_stream() {
    let mut world = World::new();
    let mut incremental = Analytics::new();

    apply_tracked(
        &mut world,
        &mut incremental,
        Command::ConfigureGrid {
            rows: 4,
            columns: 4,
        },
    );
    for column in 0..4 {
        apply_tracked(
            &mut world,
            &mut incremental,
            Command::Paint {
                cell: CellCoord::new(3, column),
                tool: Tool::Material(Material::Water),
            },
        );
    }

    let mut scanned = Analytics::new();
    scanned.reset_from_view(query::grid_view(&world));

    assert_eq!(scanned.census(), incremental.census());
}
