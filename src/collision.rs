// File: collision.rs
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::population::Species;
use crate::protocol::{Link, Message, Role};
use glam::IVec2;
use rayon::prelude::*;
use std::fmt;

/// The two predation relationships, each watched by its own collision role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionPair {
    PlantHerbivore,
    HerbivorePredator,
}

impl CollisionPair {
    pub const ALL: [CollisionPair; 2] = [
        CollisionPair::PlantHerbivore,
        CollisionPair::HerbivorePredator,
    ];

    /// The species that gets eaten.
    pub fn prey(self) -> Species {
        match self {
            CollisionPair::PlantHerbivore => Species::Plant,
            CollisionPair::HerbivorePredator => Species::Herbivore,
        }
    }

    /// The species that eats.
    pub fn hunter(self) -> Species {
        match self {
            CollisionPair::PlantHerbivore => Species::Herbivore,
            CollisionPair::HerbivorePredator => Species::Predator,
        }
    }

    /// Half-width of the proximity box on both axes.
    pub fn reach(self, config: &SimulationConfig) -> i32 {
        match self {
            CollisionPair::PlantHerbivore => config.plant_herbivore_reach,
            CollisionPair::HerbivorePredator => config.herbivore_predator_reach,
        }
    }
}

impl fmt::Display for CollisionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prey(), self.hunter())
    }
}

/// Deaths of the prey and feeds of the hunters for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub deaths: Vec<bool>,
    pub feeds: Vec<u32>,
}

impl CollisionOutcome {
    /// Nobody dead, nobody fed.
    pub fn empty(prey_count: usize, hunter_count: usize) -> Self {
        Self {
            deaths: vec![false; prey_count],
            feeds: vec![0; hunter_count],
        }
    }

    pub fn deaths_count(&self) -> usize {
        self.deaths.iter().filter(|&&dead| dead).count()
    }
}

#[inline]
fn within_reach(prey: IVec2, hunter: IVec2, reach: i32) -> bool {
    (prey - hunter).abs().cmple(IVec2::splat(reach)).all()
}

/// Finds which prey are caught this tick and who caught them.
///
/// Each prey is caught by the lowest-index hunter whose proximity box contains
/// it, and only that hunter is credited. Prey rows are independent, so they
/// are scanned in parallel and the feeds tallied afterwards; the result is the
/// same as the plain nested scan.
pub fn detect_collisions(prey: &[IVec2], hunters: &[IVec2], reach: i32) -> CollisionOutcome {
    let catchers: Vec<Option<usize>> = prey
        .par_iter()
        .map(|&p| hunters.iter().position(|&h| within_reach(p, h, reach)))
        .collect();

    let mut outcome = CollisionOutcome::empty(prey.len(), hunters.len());
    for (i, catcher) in catchers.into_iter().enumerate() {
        if let Some(j) = catcher {
            outcome.deaths[i] = true;
            outcome.feeds[j] += 1;
        }
    }
    outcome
}

pub struct CollisionWorker {
    pair: CollisionPair,
    link: Link,
    reach: i32,
    prey_capacity: usize,
    hunter_capacity: usize,
    ticks: u64,
}

impl CollisionWorker {
    pub fn new(pair: CollisionPair, link: Link, config: &SimulationConfig) -> Self {
        Self {
            pair,
            link,
            reach: pair.reach(config),
            prey_capacity: config.populations.get(pair.prey()),
            hunter_capacity: config.populations.get(pair.hunter()),
            ticks: 0,
        }
    }

    /// Runs until the coordinator says stop; returns the number of ticks served.
    pub fn run(mut self) -> Result<u64, SimError> {
        let prey = Role::Species(self.pair.prey());
        let hunter = Role::Species(self.pair.hunter());
        let mut outcome = CollisionOutcome::empty(self.prey_capacity, self.hunter_capacity);
        log::debug!("{} started (reach {})", self.link.node(), self.reach);

        loop {
            // Last tick's results go out before this tick's positions come in
            self.link.send(prey, Message::Deaths(outcome.deaths))?;
            self.link.send(hunter, Message::Feeds(outcome.feeds))?;

            let prey_positions = self.receive_positions(prey, self.prey_capacity)?;
            let hunter_positions = self.receive_positions(hunter, self.hunter_capacity)?;

            outcome = detect_collisions(&prey_positions, &hunter_positions, self.reach);
            self.ticks += 1;
            log::trace!(
                "{} tick {}: {} of {} prey caught",
                self.link.node(),
                self.ticks,
                outcome.deaths_count(),
                prey_positions.len()
            );

            if !self.link.recv_continue(Role::Coordinator)? {
                break;
            }
        }

        println!("{} done after {} ticks.", self.link.node(), self.ticks);
        Ok(self.ticks)
    }

    fn receive_positions(&self, from: Role, capacity: usize) -> Result<Vec<IVec2>, SimError> {
        let positions = self.link.recv_positions(from)?;
        if positions.len() > capacity {
            return Err(SimError::ReportOverflow {
                node: self.link.node().to_string(),
                from: from.to_string(),
                capacity,
                actual: positions.len(),
            });
        }
        Ok(positions)
    }
}
