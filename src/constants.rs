// --- File: constants.rs ---
// --- Display Geometry ---
pub const WINDOW_WIDTH: i32 = 800;
pub const WINDOW_HEIGHT: i32 = 600;
// Organisms move inside [BOUNDARY_MARGIN, dimension - BOUNDARY_INSET] on each axis
pub const BOUNDARY_MARGIN: i32 = 15;
pub const BOUNDARY_INSET: i32 = 30;
// Per-axis speed of movers is drawn from 1..=MAX_AXIS_SPEED with a random sign
pub const MAX_AXIS_SPEED: i32 = 10;

// --- Default Populations ---
pub const DEFAULT_PLANT_COUNT: usize = 100_000;
pub const DEFAULT_HERBIVORE_COUNT: usize = 2_000;
pub const DEFAULT_PREDATOR_COUNT: usize = 450;

// --- Collision Reach (half-width of the proximity box) ---
pub const PLANT_HERBIVORE_REACH: i32 = 2;
pub const HERBIVORE_PREDATOR_REACH: i32 = 1;

// --- Metabolism ---
pub const METABOLIC_COST: i32 = 1;
pub const HERBIVORE_FEED_MULTIPLIER: i32 = 10;
pub const PREDATOR_FEED_MULTIPLIER: i32 = 20;
// Starvation is strict: an accumulator equal to the threshold survives
pub const HERBIVORE_STARVATION_THRESHOLD: i32 = -100;
pub const PREDATOR_STARVATION_THRESHOLD: i32 = -1000;
// Reproduction is inclusive: an accumulator equal to the threshold reproduces
pub const REPRODUCTION_THRESHOLD: i32 = 10;

// --- Plant Regrowth ---
pub const PLANT_REGROWTH_STRIDE: usize = 30;

// --- Reporting ---
pub const HEADLESS_REPORT_INTERVAL: u64 = 100;
// --- End of File: constants.rs ---
