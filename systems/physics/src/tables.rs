//! Timing gates, movement allow-lists, and the ignition table.
//!
//! Every probabilistic rule is gated on a named interval from this module: a
//! rule gated on `n` fires with probability `1/n` per qualifying tick. The
//! intervals stagger the materials at different effective speeds without any
//! per-cell clocks.

use sandfall_core::Material;

/// Bernoulli gate intervals for the per-material transition rules.
pub(crate) mod gates {
    /// Sand falls or settles on one tick in three.
    pub(crate) const SAND_FALL: u32 = 3;
    /// Water flows on one tick in three.
    pub(crate) const WATER_FALL: u32 = 3;
    /// Oil flows at the same cadence as water.
    pub(crate) const OIL_FALL: u32 = 3;
    /// Lava flows far more sluggishly than the lighter liquids.
    pub(crate) const LAVA_FLOW: u32 = 20;
    /// Stone drops slightly slower than sand.
    pub(crate) const STONE_FALL: u32 = 5;
    /// Steam drifts upward at a third of water's cadence.
    pub(crate) const STEAM_RISE: u32 = 10;
    /// Ice samples a neighbor to freeze or condense.
    pub(crate) const ICE_ACT: u32 = 15;
    /// Fire burns out on its own.
    pub(crate) const FIRE_EXTINGUISH: u32 = 80;
    /// Fire licks upward into empty space.
    pub(crate) const FIRE_RISE: u32 = 85;
    /// Gas skips its diffusion move one tick in five.
    pub(crate) const GAS_HOLD: u32 = 5;
    /// Virus skips its whole turn one tick in five.
    pub(crate) const VIRUS_HOLD: u32 = 5;
    /// Virus attempts to infect a sampled neighbor.
    pub(crate) const VIRUS_INFECT: u32 = 100;
    /// Virus destroys itself.
    pub(crate) const VIRUS_DECAY: u32 = 400;
}

/// Movement allow-lists: the materials a moving material may swap into.
pub(crate) mod lists {
    use super::Material;

    /// Sand sinks through anything lighter than itself.
    pub(crate) const SAND_SINKS_THROUGH: [Material; 6] = [
        Material::Empty,
        Material::Water,
        Material::Oil,
        Material::Lava,
        Material::Steam,
        Material::Gas,
    ];

    /// Water displaces the lighter phases. Fire is included so water smothers
    /// flames by flowing into them.
    pub(crate) const WATER_FLOWS_THROUGH: [Material; 5] = [
        Material::Empty,
        Material::Oil,
        Material::Steam,
        Material::Gas,
        Material::Fire,
    ];

    /// Oil only moves into vacancies, which keeps it layered above water.
    pub(crate) const OIL_FLOWS_THROUGH: [Material; 1] = [Material::Empty];

    /// Lava displaces the hot light phases; water is handled by lava's own
    /// phase-change rule rather than by movement.
    pub(crate) const LAVA_FLOWS_THROUGH: [Material; 4] = [
        Material::Empty,
        Material::Steam,
        Material::Gas,
        Material::Fire,
    ];

    /// Steam is the lightest phase and rises through nearly everything mobile.
    pub(crate) const STEAM_RISES_THROUGH: [Material; 7] = [
        Material::Empty,
        Material::Sand,
        Material::Gas,
        Material::Oil,
        Material::Water,
        Material::Lava,
        Material::Fire,
    ];

    /// Stone sinks through every fluid phase.
    pub(crate) const STONE_SINKS_THROUGH: [Material; 7] = [
        Material::Empty,
        Material::Water,
        Material::Oil,
        Material::Lava,
        Material::Gas,
        Material::Fire,
        Material::Steam,
    ];

    /// Everything fire can ignite, evaporate, melt, or vitrify.
    pub(crate) const FIRE_BURNABLE: [Material; 9] = [
        Material::Tnt,
        Material::Gas,
        Material::Oil,
        Material::Leaf,
        Material::Wood,
        Material::Water,
        Material::Ice,
        Material::Sand,
        Material::Virus,
    ];

    /// Lava's fuel set: fire's minus water, which lava converts through its
    /// stone/obsidian phase changes instead.
    pub(crate) const LAVA_BURNABLE: [Material; 8] = [
        Material::Tnt,
        Material::Gas,
        Material::Oil,
        Material::Leaf,
        Material::Wood,
        Material::Ice,
        Material::Sand,
        Material::Virus,
    ];
}

/// Ignition gate interval for a sampled burnable neighbor, or `None` for
/// materials no flame can touch. TNT and gas catch fastest, wood slowest;
/// water and ice resist the longest because igniting them is really
/// evaporation.
pub(crate) const fn ignition_interval(material: Material) -> Option<u32> {
    match material {
        Material::Tnt | Material::Gas => Some(3),
        Material::Oil => Some(7),
        Material::Virus => Some(15),
        Material::Leaf => Some(20),
        Material::Sand => Some(20),
        Material::Wood => Some(30),
        Material::Water => Some(100),
        Material::Ice => Some(200),
        Material::Empty
        | Material::Lava
        | Material::Fire
        | Material::Steam
        | Material::Stone
        | Material::Metal
        | Material::Obsidian
        | Material::Glass => None,
    }
}
