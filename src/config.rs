// --- File: config.rs ---
use crate::constants::*;
use crate::population::Species;
use glam::IVec2;

/// Requested population size per species. Doubles as each species' cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationSizes {
    pub plants: usize,
    pub herbivores: usize,
    pub predators: usize,
}

impl Default for PopulationSizes {
    fn default() -> Self {
        Self {
            plants: DEFAULT_PLANT_COUNT,
            herbivores: DEFAULT_HERBIVORE_COUNT,
            predators: DEFAULT_PREDATOR_COUNT,
        }
    }
}

impl PopulationSizes {
    pub fn new(plants: usize, herbivores: usize, predators: usize) -> Self {
        Self {
            plants,
            herbivores,
            predators,
        }
    }

    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Plant => self.plants,
            Species::Herbivore => self.herbivores,
            Species::Predator => self.predators,
        }
    }

    pub fn set(&mut self, species: Species, count: usize) {
        match species {
            Species::Plant => self.plants = count,
            Species::Herbivore => self.herbivores = count,
            Species::Predator => self.predators = count,
        }
    }

    pub fn total(&self) -> usize {
        self.plants + self.herbivores + self.predators
    }
}

/// Display area in integer world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Lowest coordinate an organism may occupy on each axis.
    #[inline]
    pub fn min(&self) -> IVec2 {
        IVec2::splat(BOUNDARY_MARGIN)
    }

    /// Highest coordinate an organism may occupy on each axis.
    #[inline]
    pub fn max(&self) -> IVec2 {
        IVec2::new(self.width - BOUNDARY_INSET, self.height - BOUNDARY_INSET)
    }
}

/// Feeding and breeding parameters for species that eat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metabolism {
    pub metabolic_cost: i32,
    pub feed_multiplier: i32,
    pub starvation_threshold: i32,
    pub reproduction_threshold: i32,
}

impl Default for Metabolism {
    fn default() -> Self {
        Self {
            metabolic_cost: METABOLIC_COST,
            feed_multiplier: 1,
            starvation_threshold: 0,
            reproduction_threshold: REPRODUCTION_THRESHOLD,
        }
    }
}

impl Metabolism {
    pub fn herbivore() -> Self {
        Self {
            feed_multiplier: HERBIVORE_FEED_MULTIPLIER,
            starvation_threshold: HERBIVORE_STARVATION_THRESHOLD,
            ..Self::default()
        }
    }

    pub fn predator() -> Self {
        Self {
            feed_multiplier: PREDATOR_FEED_MULTIPLIER,
            starvation_threshold: PREDATOR_STARVATION_THRESHOLD,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub populations: PopulationSizes,
    pub bounds: Bounds,
    pub herbivore: Metabolism,
    pub predator: Metabolism,
    pub plant_herbivore_reach: i32,
    pub herbivore_predator_reach: i32,
    pub plant_regrowth_stride: usize,
    // Extra roles that only drain continue signals
    pub idle_nodes: usize,
    // None seeds every worker from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            populations: PopulationSizes::default(),
            bounds: Bounds::default(),
            herbivore: Metabolism::default(),
            predator: Metabolism::default(),
            plant_herbivore_reach: 0,
            herbivore_predator_reach: 0,
            plant_regrowth_stride: 1,
            idle_nodes: 0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        let mut config = Self::default();

        // --- Herbivore Config ---
        config.herbivore = Metabolism::herbivore();
        config.plant_herbivore_reach = PLANT_HERBIVORE_REACH;

        // --- Predator Config ---
        config.predator = Metabolism::predator();
        config.herbivore_predator_reach = HERBIVORE_PREDATOR_REACH;

        // --- Plant Config ---
        config.plant_regrowth_stride = PLANT_REGROWTH_STRIDE;

        config
    }

    pub fn with_populations(mut self, populations: PopulationSizes) -> Self {
        self.populations = populations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Metabolism of a species that eats; plants have none.
    pub fn metabolism(&self, species: Species) -> Option<Metabolism> {
        match species {
            Species::Plant => None,
            Species::Herbivore => Some(self.herbivore),
            Species::Predator => Some(self.predator),
        }
    }
}
