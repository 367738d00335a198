// File: species.rs
use crate::collision::CollisionPair;
use crate::config::{Bounds, Metabolism, SimulationConfig};
use crate::error::SimError;
use crate::lifecycle::{WorkerStats, apply_deaths, apply_feeding, regrow_plants};
use crate::population::{Population, Species};
use crate::protocol::{Link, Message, Role};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub type SimRng = StdRng;

const PLANT_HERBIVORE: Role = Role::Collision(CollisionPair::PlantHerbivore);
const HERBIVORE_PREDATOR: Role = Role::Collision(CollisionPair::HerbivorePredator);

/// Owns and evolves the population of one species.
pub struct SpeciesWorker {
    species: Species,
    link: Link,
    bounds: Bounds,
    metabolism: Option<Metabolism>,
    regrowth_stride: usize,
    rng: SimRng,
    stats: WorkerStats,
    ticks: u64,
}

impl SpeciesWorker {
    pub fn new(species: Species, link: Link, config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            // Distinct, reproducible stream per species
            Some(seed) => SimRng::seed_from_u64(seed.wrapping_add(species.index() as u64 + 1)),
            None => SimRng::from_entropy(),
        };
        Self {
            species,
            link,
            bounds: config.bounds,
            metabolism: config.metabolism(species),
            regrowth_stride: config.plant_regrowth_stride,
            rng,
            stats: WorkerStats::default(),
            ticks: 0,
        }
    }

    pub fn run(mut self) -> Result<WorkerStats, SimError> {
        let sizes = self.link.recv_status(Role::Coordinator)?;
        let capacity = sizes.get(self.species);
        let mut population = Population::seeded(self.species, capacity, self.bounds, &mut self.rng);
        log::debug!("{} started with {} organisms", self.link.node(), population.len());

        // A worker that starts empty still runs one tick so the first round completes
        loop {
            population.advance(self.bounds);
            self.exchange(&mut population)?;
            self.ticks += 1;

            let display = population.normalized_positions(self.bounds);
            self.link.send(Role::Coordinator, Message::Display(display))?;

            let go = self.link.recv_continue(Role::Coordinator)?;
            if !go || population.is_empty() {
                break;
            }
        }

        if population.is_empty() {
            log::info!("{} went extinct after {} ticks", self.species, self.ticks);
        }
        self.print_statistics();
        Ok(self.stats)
    }

    /// Receives last tick's outcome, applies it and sends the new positions.
    fn exchange(&mut self, population: &mut Population) -> Result<(), SimError> {
        match self.species {
            Species::Plant => {
                let mut deaths = self.link.recv_deaths(PLANT_HERBIVORE, population.len())?;
                apply_deaths(population, &mut deaths, &mut self.stats);
                regrow_plants(
                    population,
                    self.regrowth_stride,
                    self.bounds,
                    &mut self.rng,
                    &mut self.stats,
                );
                self.link
                    .send(PLANT_HERBIVORE, Message::Positions(population.positions()))?;
            }
            Species::Herbivore => {
                let feeds = self.link.recv_feeds(PLANT_HERBIVORE, population.len())?;
                let mut deaths = self.link.recv_deaths(HERBIVORE_PREDATOR, population.len())?;
                self.feed(population, &feeds, &mut deaths);
                apply_deaths(population, &mut deaths, &mut self.stats);
                let positions = population.positions();
                self.link
                    .send(PLANT_HERBIVORE, Message::Positions(positions.clone()))?;
                self.link
                    .send(HERBIVORE_PREDATOR, Message::Positions(positions))?;
            }
            Species::Predator => {
                let feeds = self.link.recv_feeds(HERBIVORE_PREDATOR, population.len())?;
                // Nothing hunts predators
                let mut deaths = vec![false; population.len()];
                self.feed(population, &feeds, &mut deaths);
                self.link
                    .send(HERBIVORE_PREDATOR, Message::Positions(population.positions()))?;
            }
        }
        Ok(())
    }

    fn feed(&mut self, population: &mut Population, feeds: &[u32], deaths: &mut Vec<bool>) {
        let Some(metabolism) = self.metabolism else {
            log::warn!("{} has no metabolism, skipping feeding", self.species);
            return;
        };
        apply_feeding(
            population,
            feeds,
            deaths,
            &metabolism,
            self.bounds,
            &mut self.rng,
            &mut self.stats,
        );
    }

    fn print_statistics(&self) {
        let node = self.link.node();
        println!("{} is done after {} ticks.", node, self.ticks);
        println!("({}) ### STATISTICS:", node);
        println!("({}) #### Got eaten: {}", node, self.stats.eaten);
        println!("({}) #### Starved to death: {}", node, self.stats.starved);
        println!("({}) #### Times reproduced: {}", node, self.stats.reproduced);
    }
}
