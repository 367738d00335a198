// File: population.rs
use crate::config::Bounds;
use crate::utils::{normalize_position, random_position, random_velocity};
use glam::{IVec2, Vec2};
use rand::Rng;
use std::fmt;

// --- Core Data Structures ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Plant,
    Herbivore,
    Predator,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Plant, Species::Herbivore, Species::Predator];

    pub fn index(self) -> usize {
        match self {
            Species::Plant => 0,
            Species::Herbivore => 1,
            Species::Predator => 2,
        }
    }

    pub fn is_mobile(self) -> bool {
        self != Species::Plant
    }

    pub fn plural(self) -> &'static str {
        match self {
            Species::Plant => "Plants",
            Species::Herbivore => "Herbivores",
            Species::Predator => "Predators",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::Plant => "Plant",
            Species::Herbivore => "Herbivore",
            Species::Predator => "Predator",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Organism {
    pub position: IVec2,
    pub velocity: IVec2,
    pub feed: i32,
}

impl Organism {
    pub fn new(position: IVec2, velocity: IVec2) -> Self {
        Self {
            position,
            velocity,
            feed: 0,
        }
    }

    /// A fresh organism at a random spot. Plants never move.
    pub fn spawn<R: Rng + ?Sized>(species: Species, bounds: Bounds, rng: &mut R) -> Self {
        let position = random_position(rng, bounds);
        let velocity = if species.is_mobile() {
            random_velocity(rng)
        } else {
            IVec2::ZERO
        };
        Self::new(position, velocity)
    }

    /// One movement step with a single reflect-and-correct per axis.
    pub fn advance(&mut self, bounds: Bounds) {
        let min = bounds.min();
        let max = bounds.max();
        step_axis(&mut self.position.x, &mut self.velocity.x, min.x, max.x);
        step_axis(&mut self.position.y, &mut self.velocity.y, min.y, max.y);
    }
}

#[inline]
fn step_axis(position: &mut i32, velocity: &mut i32, min: i32, max: i32) {
    *position += *velocity;
    if *position < min || *position > max {
        *velocity = -*velocity;
        *position += *velocity;
    }
}

/// Densely packed organisms of one species with a hard capacity.
///
/// Indices are stable until a removal: `remove` moves the last organism into
/// the freed slot, so every attribute of an organism always travels together.
#[derive(Debug, Clone)]
pub struct Population {
    species: Species,
    organisms: Vec<Organism>,
    capacity: usize,
}

impl Population {
    pub fn new(species: Species, capacity: usize) -> Self {
        Self {
            species,
            organisms: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// A full population with a random layout.
    pub fn seeded<R: Rng + ?Sized>(
        species: Species,
        capacity: usize,
        bounds: Bounds,
        rng: &mut R,
    ) -> Self {
        let mut population = Self::new(species, capacity);
        for _ in 0..capacity {
            population
                .organisms
                .push(Organism::spawn(species, bounds, rng));
        }
        population
    }

    /// Builds a population from explicit organisms, dropping any beyond `capacity`.
    pub fn from_organisms(species: Species, capacity: usize, mut organisms: Vec<Organism>) -> Self {
        if organisms.len() > capacity {
            log::warn!(
                "{} population given {} organisms for capacity {}, truncating",
                species,
                organisms.len(),
                capacity
            );
            organisms.truncate(capacity);
        }
        Self {
            species,
            organisms,
            capacity,
        }
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.organisms.len() >= self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&Organism> {
        self.organisms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Organism> {
        self.organisms.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Organism> {
        self.organisms.iter()
    }

    /// Appends an organism unless the population is at capacity.
    pub fn push(&mut self, organism: Organism) -> bool {
        if self.is_full() {
            return false;
        }
        self.organisms.push(organism);
        true
    }

    /// Removes the organism at `index` in O(1) by moving the last one into its slot.
    pub fn remove(&mut self, index: usize) -> Organism {
        self.organisms.swap_remove(index)
    }

    pub fn advance(&mut self, bounds: Bounds) {
        for organism in &mut self.organisms {
            organism.advance(bounds);
        }
    }

    pub fn positions(&self) -> Vec<IVec2> {
        self.organisms.iter().map(|o| o.position).collect()
    }

    pub fn normalized_positions(&self, bounds: Bounds) -> Vec<Vec2> {
        self.organisms
            .iter()
            .map(|o| normalize_position(o.position, bounds))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn organism_at(x: i32, y: i32, feed: i32) -> Organism {
        Organism {
            position: IVec2::new(x, y),
            velocity: IVec2::new(1, -1),
            feed,
        }
    }

    #[test]
    fn test_advance_moves_inside_bounds() {
        let bounds = Bounds::default();
        let mut organism = Organism::new(IVec2::new(100, 100), IVec2::new(3, -4));
        organism.advance(bounds);
        assert_eq!(organism.position, IVec2::new(103, 96));
        assert_eq!(organism.velocity, IVec2::new(3, -4));
    }

    #[test]
    fn test_advance_reflects_each_axis_once() {
        let bounds = Bounds::default();
        // x would go below 15, y would go above 570
        let mut organism = Organism::new(IVec2::new(17, 565), IVec2::new(-5, 8));
        organism.advance(bounds);
        assert_eq!(organism.velocity, IVec2::new(5, -8));
        assert_eq!(organism.position, IVec2::new(17, 565));
    }

    #[test]
    fn test_advance_accepts_exact_boundary() {
        let bounds = Bounds::default();
        let mut organism = Organism::new(IVec2::new(20, 560), IVec2::new(-5, 10));
        organism.advance(bounds);
        assert_eq!(organism.position, IVec2::new(15, 570));
        assert_eq!(organism.velocity, IVec2::new(-5, 10));
    }

    #[test]
    fn test_plants_do_not_move() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = Bounds::default();
        let mut plants = Population::seeded(Species::Plant, 50, bounds, &mut rng);
        let before = plants.positions();
        plants.advance(bounds);
        assert_eq!(plants.positions(), before);
        assert!(plants.iter().all(|p| p.velocity == IVec2::ZERO));
    }

    #[test]
    fn test_remove_swaps_last_into_slot() {
        let organisms = (0..5).map(|i| organism_at(100 + i, 100, i)).collect();
        let mut population = Population::from_organisms(Species::Herbivore, 5, organisms);

        let removed = population.remove(1);
        assert_eq!(removed.feed, 1);
        assert_eq!(population.len(), 4);
        // The last organism, with all of its attributes, now lives at index 1
        assert_eq!(population.get(1), Some(&organism_at(104, 100, 4)));

        let mut survivors: Vec<i32> = population.iter().map(|o| o.feed).collect();
        survivors.sort();
        assert_eq!(survivors, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_remove_last_index() {
        let organisms = (0..3).map(|i| organism_at(50, 50, i)).collect();
        let mut population = Population::from_organisms(Species::Predator, 3, organisms);
        population.remove(2);
        let feeds: Vec<i32> = population.iter().map(|o| o.feed).collect();
        assert_eq!(feeds, vec![0, 1]);
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut population = Population::new(Species::Herbivore, 2);
        assert!(population.push(organism_at(20, 20, 0)));
        assert!(population.push(organism_at(21, 20, 0)));
        assert!(population.is_full());
        assert!(!population.push(organism_at(22, 20, 0)));
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn test_from_organisms_truncates_to_capacity() {
        let organisms = (0..4).map(|i| organism_at(50, 50, i)).collect();
        let population = Population::from_organisms(Species::Plant, 2, organisms);
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn test_normalized_positions() {
        let bounds = Bounds::new(800, 600);
        let population =
            Population::from_organisms(Species::Plant, 1, vec![organism_at(400, 150, 0)]);
        assert_eq!(population.normalized_positions(bounds), vec![Vec2::new(0.0, -0.5)]);
    }
}
