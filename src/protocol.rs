//! Roles, message kinds and the per-tick exchange order.
//!
//! The roles never share memory; everything they learn about each other
//! arrives as a [`Message`] over a [`Link`]. Nothing in the transport enforces
//! ordering across peers, so the order below is the contract that keeps the
//! system from deadlocking. `PH` is the plant/herbivore collision role and
//! `HP` the herbivore/predator one.
//!
//! ```text
//! Coordinator  StatusInit -> each species
//!              loop: Display <- Plant, Herbivore, Predator
//!                    render; stop?  -> break
//!                    Continue(true) -> every worker
//!              Continue(false) -> every worker
//!
//! Plant        StatusInit <- Coordinator
//!              loop: move
//!                    Deaths <- PH
//!                    Positions -> PH
//!                    Display -> Coordinator; Continue <- Coordinator
//!
//! Herbivore    StatusInit <- Coordinator
//!              loop: move
//!                    Feeds <- PH; Deaths <- HP
//!                    Positions -> PH; Positions -> HP
//!                    Display -> Coordinator; Continue <- Coordinator
//!
//! Predator     StatusInit <- Coordinator
//!              loop: move
//!                    Feeds <- HP
//!                    Positions -> HP
//!                    Display -> Coordinator; Continue <- Coordinator
//!
//! Collision    loop: Deaths -> prey; Feeds -> hunter
//!                    Positions <- prey; Positions <- hunter
//!                    detect
//!                    Continue <- Coordinator
//!
//! Idle         loop: Continue <- Coordinator
//! ```
//!
//! Every report a collision role sends describes the positions it received on
//! the previous tick, so its length always equals the receiver's live count at
//! the time it is read. The very first reports are all-alive and all-unfed.

use crate::collision::CollisionPair;
use crate::config::PopulationSizes;
use crate::error::SimError;
use crate::population::Species;
use crate::transport::Endpoint;
use glam::{IVec2, Vec2};
use std::fmt;

/// Identity of one participant; also its address on the mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Coordinator,
    Species(Species),
    Collision(CollisionPair),
    Idle(usize),
}

impl Role {
    /// Every role of a run with `idle_nodes` surplus participants, coordinator first.
    pub fn roster(idle_nodes: usize) -> Vec<Role> {
        let mut roles = vec![Role::Coordinator];
        roles.extend(Species::ALL.iter().map(|&s| Role::Species(s)));
        roles.extend(CollisionPair::ALL.iter().map(|&p| Role::Collision(p)));
        roles.extend((0..idle_nodes).map(Role::Idle));
        roles
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => write!(f, "coordinator"),
            Role::Species(species) => write!(f, "{} worker", species),
            Role::Collision(pair) => write!(f, "{} collision worker", pair),
            Role::Idle(n) => write!(f, "idle worker {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    StatusInit(PopulationSizes),
    Continue(bool),
    /// World positions, species to collision role.
    Positions(Vec<IVec2>),
    /// Positions normalized to `[-1, 1]`, species to coordinator.
    Display(Vec<Vec2>),
    /// One flag per organism index of the previous `Positions`.
    Deaths(Vec<bool>),
    /// Prey eaten per organism index of the previous `Positions`.
    Feeds(Vec<u32>),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::StatusInit(_) => "status init",
            Message::Continue(_) => "continue signal",
            Message::Positions(_) => "position report",
            Message::Display(_) => "display report",
            Message::Deaths(_) => "death report",
            Message::Feeds(_) => "feed report",
        }
    }
}

pub type Link = Endpoint<Role, Message>;

// Typed receives: anything but the expected kind is a protocol violation
impl Endpoint<Role, Message> {
    pub fn recv_status(&self, from: Role) -> Result<PopulationSizes, SimError> {
        match self.recv(from)? {
            Message::StatusInit(sizes) => Ok(sizes),
            other => Err(self.unexpected(from, "status init", &other)),
        }
    }

    pub fn recv_continue(&self, from: Role) -> Result<bool, SimError> {
        match self.recv(from)? {
            Message::Continue(go) => Ok(go),
            other => Err(self.unexpected(from, "continue signal", &other)),
        }
    }

    pub fn recv_positions(&self, from: Role) -> Result<Vec<IVec2>, SimError> {
        match self.recv(from)? {
            Message::Positions(positions) => Ok(positions),
            other => Err(self.unexpected(from, "position report", &other)),
        }
    }

    pub fn recv_display(&self, from: Role) -> Result<Vec<Vec2>, SimError> {
        match self.recv(from)? {
            Message::Display(positions) => Ok(positions),
            other => Err(self.unexpected(from, "display report", &other)),
        }
    }

    /// Receives a death report that must cover exactly `expected` organisms.
    pub fn recv_deaths(&self, from: Role, expected: usize) -> Result<Vec<bool>, SimError> {
        match self.recv(from)? {
            Message::Deaths(deaths) => {
                self.check_length(from, "death report", expected, deaths.len())?;
                Ok(deaths)
            }
            other => Err(self.unexpected(from, "death report", &other)),
        }
    }

    /// Receives a feed report that must cover exactly `expected` organisms.
    pub fn recv_feeds(&self, from: Role, expected: usize) -> Result<Vec<u32>, SimError> {
        match self.recv(from)? {
            Message::Feeds(feeds) => {
                self.check_length(from, "feed report", expected, feeds.len())?;
                Ok(feeds)
            }
            other => Err(self.unexpected(from, "feed report", &other)),
        }
    }

    fn check_length(
        &self,
        from: Role,
        report: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), SimError> {
        if expected == actual {
            return Ok(());
        }
        Err(SimError::ReportLength {
            node: self.node().to_string(),
            from: from.to_string(),
            report,
            expected,
            actual,
        })
    }

    fn unexpected(&self, from: Role, expected: &'static str, got: &Message) -> SimError {
        SimError::UnexpectedMessage {
            node: self.node().to_string(),
            from: from.to_string(),
            expected,
            got: got.kind(),
        }
    }
}
