//! Ordered, blocking point-to-point links between named nodes.
//!
//! Every ordered pair of nodes gets its own channel, so a receive names the
//! peer it expects to hear from and messages from one peer never overtake each
//! other. Sends are buffered and never block; receives block until the peer
//! sends or hangs up.

use crate::error::TransportError;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::mpsc::{self, Receiver, Sender};

/// One node's view of the mesh: a sender to and a receiver from every peer.
pub struct Endpoint<A, M> {
    node: A,
    outbox: HashMap<A, Sender<M>>,
    inbox: HashMap<A, Receiver<M>>,
}

impl<A, M> Endpoint<A, M>
where
    A: Copy + Eq + Hash + Display,
{
    pub fn node(&self) -> A {
        self.node
    }

    pub fn send(&self, to: A, message: M) -> Result<(), TransportError> {
        let sender = self
            .outbox
            .get(&to)
            .ok_or_else(|| self.unknown_peer(to))?;
        sender
            .send(message)
            .map_err(|_| self.disconnected(to))
    }

    pub fn recv(&self, from: A) -> Result<M, TransportError> {
        let receiver = self
            .inbox
            .get(&from)
            .ok_or_else(|| self.unknown_peer(from))?;
        receiver.recv().map_err(|_| self.disconnected(from))
    }

    /// Sends a copy of `message` to each peer in order.
    pub fn broadcast<'a, I>(&self, peers: I, message: &M) -> Result<(), TransportError>
    where
        I: IntoIterator<Item = &'a A>,
        A: 'a,
        M: Clone,
    {
        for &peer in peers {
            self.send(peer, message.clone())?;
        }
        Ok(())
    }

    fn unknown_peer(&self, peer: A) -> TransportError {
        TransportError::UnknownPeer {
            node: self.node.to_string(),
            peer: peer.to_string(),
        }
    }

    fn disconnected(&self, peer: A) -> TransportError {
        TransportError::Disconnected {
            node: self.node.to_string(),
            peer: peer.to_string(),
        }
    }
}

/// Wires a full mesh between `nodes` and hands back one endpoint per node.
pub fn mesh<A, M>(nodes: &[A]) -> HashMap<A, Endpoint<A, M>>
where
    A: Copy + Eq + Hash,
{
    let mut endpoints: HashMap<A, Endpoint<A, M>> = nodes
        .iter()
        .map(|&node| {
            (
                node,
                Endpoint {
                    node,
                    outbox: HashMap::with_capacity(nodes.len()),
                    inbox: HashMap::with_capacity(nodes.len()),
                },
            )
        })
        .collect();

    for &from in nodes {
        for &to in nodes {
            if from == to {
                continue;
            }
            let (tx, rx) = mpsc::channel();
            if let Some(sender_side) = endpoints.get_mut(&from) {
                sender_side.outbox.insert(to, tx);
            }
            if let Some(receiver_side) = endpoints.get_mut(&to) {
                receiver_side.inbox.insert(from, rx);
            }
        }
    }
    endpoints
}
