// File: coordinator.rs
use crate::config::PopulationSizes;
use crate::display::{Frame, RenderControl, Renderer};
use crate::error::SimError;
use crate::population::Species;
use crate::protocol::{Link, Message, Role};
use glam::Vec2;
use std::fmt;
use std::time::{Duration, Instant};

/// Why a run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    Extinction(Species),
    Quit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Extinction(species) => write!(f, "{} extinction", species),
            Termination::Quit => write!(f, "stop requested"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub termination: Termination,
    /// Live counts from the last reports.
    pub final_counts: PopulationSizes,
    pub runtime: Duration,
}

/// Starts the run, paces it one tick at a time and decides when it stops.
pub struct Coordinator<R> {
    link: Link,
    sizes: PopulationSizes,
    workers: Vec<Role>,
    renderer: R,
    // Display buffers, capacity fixed at the requested maxima
    buffers: [Vec<Vec2>; 3],
}

impl<R: Renderer> Coordinator<R> {
    /// `workers` is every role that listens for continue signals.
    pub fn new(link: Link, sizes: PopulationSizes, workers: Vec<Role>, renderer: R) -> Self {
        let buffers = Species::ALL.map(|species| Vec::with_capacity(sizes.get(species)));
        Self {
            link,
            sizes,
            workers,
            renderer,
            buffers,
        }
    }

    pub fn run(mut self) -> Result<RunSummary, SimError> {
        let started = Instant::now();
        println!(
            "Coordinator started... plants={}, herbivores={}, predators={}.",
            self.sizes.plants, self.sizes.herbivores, self.sizes.predators
        );
        println!("Simulating a total of {} organisms.", self.sizes.total());

        for species in Species::ALL {
            self.link
                .send(Role::Species(species), Message::StatusInit(self.sizes))?;
        }

        let mut ticks = 0;
        let termination = loop {
            self.collect_reports()?;
            ticks += 1;

            let control = self.renderer.present(&Frame {
                tick: ticks,
                plants: &self.buffers[Species::Plant.index()],
                herbivores: &self.buffers[Species::Herbivore.index()],
                predators: &self.buffers[Species::Predator.index()],
            });

            if let Some(extinct) = self.extinct_species() {
                self.print_extinction(extinct);
                break Termination::Extinction(extinct);
            }
            if control == RenderControl::Quit {
                log::info!("renderer requested stop at tick {}", ticks);
                break Termination::Quit;
            }
            self.link
                .broadcast(&self.workers, &Message::Continue(true))?;
        };

        self.link
            .broadcast(&self.workers, &Message::Continue(false))?;

        let runtime = started.elapsed();
        println!("----------------------------------------");
        println!("Coordinator terminated all operations.");
        println!("----------------------------------------");
        println!("Simulation runtime (in seconds): {:.6}", runtime.as_secs_f64());

        Ok(RunSummary {
            ticks,
            termination,
            final_counts: self.live_counts(),
            runtime,
        })
    }

    /// Copies one display report per species into the buffers.
    fn collect_reports(&mut self) -> Result<(), SimError> {
        for species in Species::ALL {
            let from = Role::Species(species);
            let report = self.link.recv_display(from)?;
            let capacity = self.sizes.get(species);
            if report.len() > capacity {
                return Err(SimError::ReportOverflow {
                    node: self.link.node().to_string(),
                    from: from.to_string(),
                    capacity,
                    actual: report.len(),
                });
            }
            let buffer = &mut self.buffers[species.index()];
            buffer.clear();
            buffer.extend_from_slice(&report);
        }
        Ok(())
    }

    fn live_counts(&self) -> PopulationSizes {
        let mut counts = PopulationSizes::new(0, 0, 0);
        for species in Species::ALL {
            counts.set(species, self.buffers[species.index()].len());
        }
        counts
    }

    // Plants are checked first, then herbivores, then predators
    fn extinct_species(&self) -> Option<Species> {
        Species::ALL
            .into_iter()
            .find(|species| self.buffers[species.index()].is_empty())
    }

    fn print_extinction(&self, extinct: Species) {
        let counts = self.live_counts();
        let survivors: Vec<String> = Species::ALL
            .into_iter()
            .filter(|&s| s != extinct)
            .map(|s| format!("{}: {}", s.plural(), counts.get(s)))
            .collect();
        let headline = format!("::::: Simulation over: {} extinction. :::::", extinct);
        let rule = "-".repeat(headline.len());
        println!("{}", rule);
        println!("{}", headline);
        println!("::::: {}", survivors.join("     "));
        println!("{}", rule);
        log::info!("{} went extinct; survivors {}", extinct, survivors.join(", "));
    }
}
