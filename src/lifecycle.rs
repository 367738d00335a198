//! Per-tick population bookkeeping: feeding, starvation, breeding, deaths and
//! plant regrowth. Reports are indexed by the organism order the collision
//! role saw; removals keep them aligned by swapping report entries together
//! with the organisms.

use crate::config::{Bounds, Metabolism};
use crate::population::{Organism, Population};
use rand::Rng;
use std::fmt;

/// Tallies a species worker prints when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub eaten: u64,
    pub starved: u64,
    pub reproduced: u64,
}

impl fmt::Display for WorkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eaten: {}, starved: {}, reproduced: {}",
            self.eaten, self.starved, self.reproduced
        )
    }
}

/// Applies metabolism, feeding, starvation and breeding to every organism.
///
/// `feeds` and `deaths` must hold one entry per organism. Starved organisms
/// are swap-removed together with their report entries. Offspring are queued
/// during the pass and appended at the end, marked alive in `deaths`.
pub fn apply_feeding<R: Rng + ?Sized>(
    population: &mut Population,
    feeds: &[u32],
    deaths: &mut Vec<bool>,
    metabolism: &Metabolism,
    bounds: Bounds,
    rng: &mut R,
    stats: &mut WorkerStats,
) {
    debug_assert_eq!(feeds.len(), population.len());
    debug_assert_eq!(deaths.len(), population.len());

    let species = population.species();
    let mut feeds = feeds.to_vec();
    let mut births: Vec<Organism> = Vec::new();

    let mut i = 0;
    while i < population.len() {
        let fed = i32::try_from(feeds[i]).unwrap_or(i32::MAX);
        let Some(organism) = population.get_mut(i) else {
            break;
        };
        organism.feed = organism
            .feed
            .saturating_sub(metabolism.metabolic_cost)
            .saturating_add(metabolism.feed_multiplier.saturating_mul(fed));
        let feed = organism.feed;

        if feed < metabolism.starvation_threshold {
            population.remove(i);
            feeds.swap_remove(i);
            deaths.swap_remove(i);
            stats.starved += 1;
            // Slot i now holds the former last organism; look at it next
            continue;
        }

        if feed >= metabolism.reproduction_threshold
            && population.len() + births.len() < population.capacity()
        {
            births.push(Organism::spawn(species, bounds, rng));
            stats.reproduced += 1;
        }
        i += 1;
    }

    for offspring in births {
        if population.push(offspring) {
            deaths.push(false);
        }
    }
}

/// Swap-removes every organism flagged in `deaths`.
pub fn apply_deaths(population: &mut Population, deaths: &mut Vec<bool>, stats: &mut WorkerStats) {
    debug_assert_eq!(deaths.len(), population.len());

    let mut i = 0;
    while i < population.len() && i < deaths.len() {
        if deaths[i] {
            population.remove(i);
            deaths.swap_remove(i);
            stats.eaten += 1;
        } else {
            i += 1;
        }
    }
}

/// Regrows plants on a fixed cadence: one attempt for every `stride` survivors,
/// stopping at capacity. Returns how many plants were added.
pub fn regrow_plants<R: Rng + ?Sized>(
    population: &mut Population,
    stride: usize,
    bounds: Bounds,
    rng: &mut R,
    stats: &mut WorkerStats,
) -> usize {
    let live = population.len();
    if live == 0 {
        return 0;
    }

    let species = population.species();
    let mut added = 0;
    let mut cursor = 0;
    while !population.is_full() && cursor < live {
        population.push(Organism::spawn(species, bounds, rng));
        added += 1;
        cursor += stride.max(1);
    }
    stats.reproduced += added as u64;
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Species;
    use glam::IVec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn herd(species: Species, capacity: usize, feeds: &[i32]) -> Population {
        let organisms = feeds
            .iter()
            .enumerate()
            .map(|(i, &feed)| Organism {
                position: IVec2::new(20 + i as i32, 40),
                velocity: IVec2::new(1, 1),
                feed,
            })
            .collect();
        Population::from_organisms(species, capacity, organisms)
    }

    fn feeds_of(population: &Population) -> Vec<i32> {
        population.iter().map(|o| o.feed).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_herbivore_starvation_boundary() {
        // After the metabolic cost: -100 survives, -101 starves
        let mut population = herd(Species::Herbivore, 10, &[-99, -100]);
        let mut deaths = vec![false; 2];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0, 0],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(feeds_of(&population), vec![-100]);
        assert_eq!(stats.starved, 1);
        assert_eq!(deaths.len(), 1);
    }

    #[test]
    fn test_predator_starvation_boundary() {
        let mut population = herd(Species::Predator, 10, &[-999, -1000]);
        let mut deaths = vec![false; 2];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0, 0],
            &mut deaths,
            &Metabolism::predator(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(feeds_of(&population), vec![-1000]);
        assert_eq!(stats.starved, 1);
    }

    #[test]
    fn test_fed_twice_reproduces_under_cap() {
        let mut population = herd(Species::Herbivore, 5, &[0]);
        let mut deaths = vec![false];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[2],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(population.len(), 2);
        assert_eq!(population.get(0).unwrap().feed, 19);
        assert_eq!(population.get(1).unwrap().feed, 0);
        assert_eq!(stats.reproduced, 1);
        assert_eq!(deaths, vec![false, false]);
    }

    #[test]
    fn test_reproduction_threshold_is_inclusive() {
        let mut population = herd(Species::Predator, 5, &[10, 9]);
        let mut deaths = vec![false; 2];
        let mut stats = WorkerStats::default();
        // 10 - 1 + 0 = 9 does not breed; 9 - 1 + 20 = 28 does
        apply_feeding(
            &mut population,
            &[0, 1],
            &mut deaths,
            &Metabolism::predator(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(stats.reproduced, 1);
        assert_eq!(population.len(), 3);

        let mut population = herd(Species::Herbivore, 5, &[11]);
        let mut deaths = vec![false];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(population.get(0).unwrap().feed, 10);
        assert_eq!(stats.reproduced, 1);
    }

    #[test]
    fn test_full_population_does_not_grow() {
        let mut population = herd(Species::Herbivore, 3, &[50, 50, 50]);
        let mut deaths = vec![false; 3];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[1, 1, 1],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(population.len(), 3);
        assert_eq!(stats.reproduced, 0);
    }

    #[test]
    fn test_births_fill_only_free_slots() {
        let mut population = herd(Species::Herbivore, 4, &[20, 20, 20]);
        let mut deaths = vec![false; 3];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0, 0, 0],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(population.len(), 4);
        assert_eq!(stats.reproduced, 1);
        assert_eq!(deaths.len(), 4);
    }

    #[test]
    fn test_starvation_keeps_death_flags_aligned() {
        // Organism 0 starves; organism 2 (flagged dead) moves into slot 0
        let mut population = herd(Species::Herbivore, 10, &[-100, 0, 5]);
        let mut deaths = vec![false, false, true];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0, 0, 0],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(stats.starved, 1);
        assert_eq!(feeds_of(&population), vec![4, -1]);
        assert_eq!(deaths, vec![true, false]);

        apply_deaths(&mut population, &mut deaths, &mut stats);
        assert_eq!(feeds_of(&population), vec![-1]);
        assert_eq!(stats.eaten, 1);
    }

    #[test]
    fn test_starved_slot_refilled_by_unprocessed_organism() {
        // The organism swapped into a starved slot is still charged its cost once
        let mut population = herd(Species::Herbivore, 10, &[-100, -100, 7]);
        let mut deaths = vec![false; 3];
        let mut stats = WorkerStats::default();
        apply_feeding(
            &mut population,
            &[0, 0, 0],
            &mut deaths,
            &Metabolism::herbivore(),
            Bounds::default(),
            &mut rng(),
            &mut stats,
        );
        assert_eq!(stats.starved, 2);
        assert_eq!(feeds_of(&population), vec![6]);
    }

    #[test]
    fn test_apply_deaths_removes_exactly_flagged() {
        let mut population = herd(Species::Plant, 6, &[0, 1, 2, 3, 4, 5]);
        let mut deaths = vec![true, false, true, false, false, true];
        let mut stats = WorkerStats::default();
        apply_deaths(&mut population, &mut deaths, &mut stats);

        let mut survivors = feeds_of(&population);
        survivors.sort();
        assert_eq!(survivors, vec![1, 3, 4]);
        assert_eq!(stats.eaten, 3);
        assert!(deaths.iter().all(|&d| !d));
    }

    #[test]
    fn test_apply_deaths_everyone() {
        let mut population = herd(Species::Plant, 3, &[0, 1, 2]);
        let mut deaths = vec![true; 3];
        let mut stats = WorkerStats::default();
        apply_deaths(&mut population, &mut deaths, &mut stats);
        assert!(population.is_empty());
        assert_eq!(stats.eaten, 3);
    }

    #[test]
    fn test_regrowth_cadence() {
        let bounds = Bounds::default();
        let mut stats = WorkerStats::default();

        // 61 survivors: cursor visits 0, 30, 60
        let mut plants = herd(Species::Plant, 100, &[0; 61]);
        assert_eq!(regrow_plants(&mut plants, 30, bounds, &mut rng(), &mut stats), 3);
        assert_eq!(plants.len(), 64);

        // Capacity wins over the cadence
        let mut plants = herd(Species::Plant, 62, &[0; 61]);
        assert_eq!(regrow_plants(&mut plants, 30, bounds, &mut rng(), &mut stats), 1);
        assert_eq!(plants.len(), 62);

        // A single survivor still regrows one
        let mut plants = herd(Species::Plant, 10, &[0]);
        assert_eq!(regrow_plants(&mut plants, 30, bounds, &mut rng(), &mut stats), 1);

        assert_eq!(stats.reproduced, 5);
    }

    #[test]
    fn test_regrowth_skips_full_and_empty() {
        let bounds = Bounds::default();
        let mut stats = WorkerStats::default();
        let mut plants = herd(Species::Plant, 3, &[0, 0, 0]);
        assert_eq!(regrow_plants(&mut plants, 30, bounds, &mut rng(), &mut stats), 0);
        let mut plants = Population::new(Species::Plant, 3);
        assert_eq!(regrow_plants(&mut plants, 30, bounds, &mut rng(), &mut stats), 0);
        assert_eq!(stats.reproduced, 0);
    }

    #[test]
    fn test_regrown_plants_are_stationary() {
        let mut plants = herd(Species::Plant, 10, &[0]);
        let mut stats = WorkerStats::default();
        regrow_plants(&mut plants, 30, Bounds::default(), &mut rng(), &mut stats);
        let added = plants.get(1).unwrap();
        assert_eq!(added.velocity, IVec2::ZERO);
        assert_eq!(added.feed, 0);
    }

    #[test]
    fn test_huge_feed_report_saturates() {
        let mut population = herd(Species::Predator, 1, &[0]);
        let mut deaths = vec![false];
        let mut stats = WorkerStats::default();
        for _ in 0..2 {
            apply_feeding(
                &mut population,
                &[u32::MAX],
                &mut deaths,
                &Metabolism::predator(),
                Bounds::default(),
                &mut rng(),
                &mut stats,
            );
        }
        assert_eq!(feeds_of(&population), vec![i32::MAX]);
        assert_eq!(stats.starved, 0);
        // At capacity, so no offspring despite the surplus
        assert_eq!(population.len(), 1);
        assert_eq!(stats.reproduced, 0);
    }
}
