// File: simulation.rs
use crate::collision::CollisionWorker;
use crate::config::SimulationConfig;
use crate::coordinator::{Coordinator, RunSummary};
use crate::display::Renderer;
use crate::error::{SimError, TransportError};
use crate::lifecycle::WorkerStats;
use crate::population::Species;
use crate::protocol::{Link, Role};
use crate::transport::mesh;
use std::collections::HashMap;
use std::thread::{self, JoinHandle};

/// What a finished worker hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerReport {
    Species(Species, WorkerStats),
    Collision { ticks: u64 },
    Idle { signals: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub summary: RunSummary,
    pub workers: Vec<(Role, WorkerReport)>,
}

impl SimulationReport {
    pub fn species_stats(&self, species: Species) -> Option<WorkerStats> {
        self.workers.iter().find_map(|(_, report)| match report {
            WorkerReport::Species(s, stats) if *s == species => Some(*stats),
            _ => None,
        })
    }
}

/// Runs one non-coordinator role to completion on the current thread.
pub fn run_worker(role: Role, link: Link, config: &SimulationConfig) -> Result<WorkerReport, SimError> {
    match role {
        Role::Species(species) => {
            let stats = crate::species::SpeciesWorker::new(species, link, config).run()?;
            Ok(WorkerReport::Species(species, stats))
        }
        Role::Collision(pair) => {
            let ticks = CollisionWorker::new(pair, link, config).run()?;
            Ok(WorkerReport::Collision { ticks })
        }
        Role::Idle(_) => {
            let signals = run_idle(&link)?;
            Ok(WorkerReport::Idle { signals })
        }
        Role::Coordinator => Err(SimError::Transport(TransportError::UnknownPeer {
            node: "bootstrap".to_string(),
            peer: role.to_string(),
        })),
    }
}

/// Surplus roles only drain continue signals until told to stop.
fn run_idle(link: &Link) -> Result<u64, SimError> {
    let mut signals = 1;
    while link.recv_continue(Role::Coordinator)? {
        signals += 1;
    }
    println!("Unused {} is done.", link.node());
    Ok(signals)
}

/// Wires every role, runs the workers on their own threads and the coordinator
/// on the calling one, then joins everything.
pub fn run_simulation<R: Renderer>(
    config: &SimulationConfig,
    renderer: R,
) -> Result<SimulationReport, SimError> {
    let roles = Role::roster(config.idle_nodes);
    let mut endpoints: HashMap<Role, Link> = mesh(&roles);
    let coordinator_link = take_link(&mut endpoints, Role::Coordinator)?;

    let workers: Vec<Role> = roles
        .iter()
        .copied()
        .filter(|&role| role != Role::Coordinator)
        .collect();

    let mut handles: Vec<(Role, JoinHandle<Result<WorkerReport, SimError>>)> =
        Vec::with_capacity(workers.len());
    for &role in &workers {
        let link = take_link(&mut endpoints, role)?;
        let worker_config = config.clone();
        let handle = thread::Builder::new()
            .name(role.to_string())
            .spawn(move || run_worker(role, link, &worker_config))
            .map_err(|source| SimError::Spawn {
                node: role.to_string(),
                source,
            })?;
        handles.push((role, handle));
    }
    log::info!("launched {} worker roles", handles.len());

    let outcome = Coordinator::new(coordinator_link, config.populations, workers, renderer).run();

    let mut reports = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for (role, handle) in handles {
        match handle.join() {
            Ok(Ok(report)) => reports.push((role, report)),
            Ok(Err(err)) => {
                log::error!("{} failed: {}", role, err);
                failures.push(err);
            }
            Err(_) => failures.push(SimError::Panicked {
                node: role.to_string(),
            }),
        }
    }

    let summary = match outcome {
        Ok(summary) if failures.is_empty() => summary,
        Ok(_) => return Err(root_cause(failures)),
        Err(err) => {
            failures.insert(0, err);
            return Err(root_cause(failures));
        }
    };

    Ok(SimulationReport {
        summary,
        workers: reports,
    })
}

fn take_link(endpoints: &mut HashMap<Role, Link>, role: Role) -> Result<Link, SimError> {
    endpoints.remove(&role).ok_or_else(|| {
        SimError::Transport(TransportError::UnknownPeer {
            node: "bootstrap".to_string(),
            peer: role.to_string(),
        })
    })
}

// A failing role makes its peers fail with disconnects; report the one that started it
fn root_cause(mut failures: Vec<SimError>) -> SimError {
    match failures.iter().position(|err| !err.is_disconnect()) {
        Some(index) => failures.swap_remove(index),
        None => failures.swap_remove(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Message;

    #[test]
    fn test_idle_worker_drains_until_stop() {
        let idle = Role::Idle(0);
        let mut endpoints = mesh::<Role, Message>(&[Role::Coordinator, idle]);
        let head = endpoints.remove(&Role::Coordinator).unwrap();
        let link = endpoints.remove(&idle).unwrap();
        for go in [true, true, false] {
            head.send(idle, Message::Continue(go)).unwrap();
        }
        assert_eq!(run_idle(&link).unwrap(), 3);
    }

    #[test]
    fn test_coordinator_role_is_not_a_worker() {
        let mut endpoints = mesh::<Role, Message>(&[Role::Coordinator]);
        let link = endpoints.remove(&Role::Coordinator).unwrap();
        let config = SimulationConfig::new();
        assert!(run_worker(Role::Coordinator, link, &config).is_err());
    }

    #[test]
    fn test_root_cause_prefers_non_disconnect() {
        let failures = vec![
            SimError::Transport(TransportError::Disconnected {
                node: "a".into(),
                peer: "b".into(),
            }),
            SimError::Panicked { node: "b".into() },
        ];
        assert!(matches!(root_cause(failures), SimError::Panicked { .. }));
    }
}
