#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Sandfall experience.
//!
//! The binary owns the driver loop the core deliberately leaves outside its
//! scope: step the physics `speed` times, apply the resulting commands,
//! refresh the census from the emitted events, translate pointer input into
//! paint commands, and hand the post-tick grid to the rendering backend.

use anyhow::Result;
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use sandfall_core::{CellCoord, Command, Event, Material, Tool};
use sandfall_rendering::{
    material_color, presented_color, FrameInput, GridPresentation, HudModel, Presentation,
    RenderingBackend, Scene,
};
use sandfall_rendering_macroquad::MacroquadBackend;
use sandfall_system_analytics::{Analytics, MaterialCensus};
use sandfall_system_physics::Physics;
use sandfall_world::{self as world, query, World};

const WINDOW_TITLE: &str = "Sandfall";
const MAX_STEPS_PER_FRAME: u32 = 20_000;

/// Command-line options for the Sandfall sandbox.
#[derive(Debug, Parser)]
#[command(name = "sandfall", about = "Falling-sand cellular automaton sandbox")]
struct Args {
    /// Number of grid rows.
    #[arg(long, default_value_t = 150)]
    rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = 100)]
    columns: u32,

    /// Seed for the simulation's random source; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation steps executed per rendered frame.
    #[arg(long, default_value_t = 2_000)]
    speed: u32,

    /// Run the given number of steps without a window and print the census.
    #[arg(long)]
    headless: Option<u64>,

    /// Render frames as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,

    /// Draw a frames-per-second read-out in the window.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Sandfall command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let mut world = World::new();
    let mut startup_events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            rows: args.rows,
            columns: args.columns,
        },
        &mut startup_events,
    );

    let mut analytics = Analytics::new();
    analytics.handle(&startup_events);

    let seed = args.seed.unwrap_or_else(rand::random);
    let physics = Physics::seeded(seed);

    println!("{}", query::welcome_banner(&world));
    println!("seed: {seed:#018x}");

    match args.headless {
        Some(steps) => run_headless(world, physics, analytics, steps),
        None => run_windowed(world, physics, analytics, &args),
    }
}

fn run_headless(
    mut world: World,
    mut physics: Physics<ChaCha8Rng>,
    mut analytics: Analytics,
    steps: u64,
) -> Result<()> {
    let mut commands = Vec::new();
    let mut events = Vec::new();
    for _ in 0..steps {
        physics.step(query::grid_view(&world), &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        analytics.handle(&events);
        events.clear();
    }

    println!("ran {steps} steps");
    print_census(analytics.census());
    Ok(())
}

fn print_census(census: &MaterialCensus) {
    println!(
        "occupied {} of {} cells",
        census.occupied(),
        census.total_cells()
    );
    for material in Material::ALL {
        if material == Material::Empty {
            continue;
        }
        let count = census.count(material);
        if count > 0 {
            println!("{:>10} {count}", material.name());
        }
    }
}

fn run_windowed(
    world: World,
    physics: Physics<ChaCha8Rng>,
    analytics: Analytics,
    args: &Args,
) -> Result<()> {
    let grid = GridPresentation::new(args.rows, args.columns)?;
    let hud = HudModel {
        selected_tool: Tool::Material(Material::Sand),
        steps_per_frame: args.speed,
        occupied_cells: analytics.census().occupied(),
        total_cells: analytics.census().total_cells(),
    };
    let scene = Scene::new(
        grid,
        vec![material_color(Material::Empty); grid.cell_count()],
        hud,
    )?;
    let presentation = Presentation::new(WINDOW_TITLE, material_color(Material::Empty), scene);

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    let mut driver = Driver::new(world, physics, analytics, args.speed);
    backend.run(presentation, move |_dt, input, scene| {
        driver.run_frame(input, scene);
    })
}

/// Owns the per-frame loop: input first, then the simulation burst, then the
/// scene rewrite from the post-tick grid.
struct Driver {
    world: World,
    physics: Physics<ChaCha8Rng>,
    analytics: Analytics,
    tool_index: usize,
    steps_per_frame: u32,
    frame: u64,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Driver {
    fn new(
        world: World,
        physics: Physics<ChaCha8Rng>,
        analytics: Analytics,
        steps_per_frame: u32,
    ) -> Self {
        let tool_index = Tool::ALL
            .iter()
            .position(|tool| *tool == Tool::Material(Material::Sand))
            .unwrap_or(0);

        Self {
            world,
            physics,
            analytics,
            tool_index,
            steps_per_frame: steps_per_frame.clamp(1, MAX_STEPS_PER_FRAME),
            frame: 0,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    fn run_frame(&mut self, input: FrameInput, scene: &mut Scene) {
        self.frame = self.frame.wrapping_add(1);
        self.apply_input(input);
        self.step_simulation();
        self.populate_scene(scene);
    }

    fn apply_input(&mut self, input: FrameInput) {
        let palette = Tool::ALL.len();
        if input.tool_next {
            self.tool_index = (self.tool_index + 1) % palette;
        }
        if input.tool_previous {
            self.tool_index = (self.tool_index + palette - 1) % palette;
        }
        if let Some(tool) = input.tool_hotkey {
            if let Some(position) = Tool::ALL.iter().position(|candidate| *candidate == tool) {
                self.tool_index = position;
            }
        }

        if input.speed_up {
            self.steps_per_frame = self
                .steps_per_frame
                .saturating_mul(2)
                .min(MAX_STEPS_PER_FRAME);
        }
        if input.speed_down {
            self.steps_per_frame = (self.steps_per_frame / 2).max(1);
        }

        if input.clear_requested {
            self.commands.push(Command::Paint {
                cell: CellCoord::new(0, 0),
                tool: Tool::Clear,
            });
        }
        if input.paint_held {
            if let Some(cell) = input.cursor_cell {
                self.commands.push(Command::Paint {
                    cell,
                    tool: self.selected_tool(),
                });
            }
        }

        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        self.analytics.handle(&self.events);
        self.events.clear();
    }

    fn step_simulation(&mut self) {
        for _ in 0..self.steps_per_frame {
            self.physics.step(query::grid_view(&self.world), &mut self.commands);
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }
        self.analytics.handle(&self.events);
        self.events.clear();
    }

    fn populate_scene(&mut self, scene: &mut Scene) {
        let view = query::grid_view(&self.world);
        scene.cells.clear();
        scene.cells.extend(
            view.iter()
                .enumerate()
                .map(|(index, material)| presented_color(material, index, self.frame)),
        );
        scene.hud = HudModel {
            selected_tool: self.selected_tool(),
            steps_per_frame: self.steps_per_frame,
            occupied_cells: self.analytics.census().occupied(),
            total_cells: self.analytics.census().total_cells(),
        };
    }

    fn selected_tool(&self) -> Tool {
        Tool::ALL[self.tool_index % Tool::ALL.len()]
    }
}
