//! Radio loss model.
//!
//! Every frame on the air is lost independently with the configured
//! probability.  Individual directed links can be given their own loss,
//! which is how tests knock out one peer.  All draws come from one seeded
//! [`ChaCha8Rng`], so a run is fully determined by its seed and inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::LinkConfig;
use crate::mesh::NodeAddr;
use crate::scheduler::Millis;

/// Fate of one reliable unicast, relative to when it was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicastFate {
    /// Arrives `after` ms later, on retry number `retransmissions`.
    Delivered { after: Millis, retransmissions: u8 },
    /// Every attempt was lost; the sender learns `after` ms later.
    TimedOut { after: Millis },
}

pub struct LinkModel {
    cfg: LinkConfig,
    overrides: Vec<(NodeAddr, NodeAddr, f64)>,
    rng: ChaCha8Rng,
}

impl LinkModel {
    pub fn new(cfg: &LinkConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            overrides: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(cfg.seed),
        }
    }

    /// Loss probability for frames from `from` to `to`, clamped to [0, 1].
    pub fn set_loss(&mut self, from: NodeAddr, to: NodeAddr, loss: f64) {
        let loss = loss.clamp(0.0, 1.0);
        match self.overrides.iter_mut().find(|(f, t, _)| *f == from && *t == to) {
            Some(entry) => entry.2 = loss,
            None => self.overrides.push((from, to, loss)),
        }
    }

    pub fn loss(&self, from: NodeAddr, to: NodeAddr) -> f64 {
        self.overrides
            .iter()
            .find(|(f, t, _)| *f == from && *t == to)
            .map_or(self.cfg.loss, |(_, _, p)| *p)
    }

    fn lost(&mut self, from: NodeAddr, to: NodeAddr) -> bool {
        let p = self.loss(from, to);
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        self.rng.gen_bool(p.min(1.0))
    }

    /// Delay until a broadcast frame reaches `to`, or `None` if it is lost.
    pub fn broadcast(&mut self, from: NodeAddr, to: NodeAddr) -> Option<Millis> {
        (!self.lost(from, to)).then_some(self.cfg.latency_ms)
    }

    /// Play out the first attempt plus up to `max_retransmissions` retries.
    pub fn unicast(&mut self, from: NodeAddr, to: NodeAddr, max_retransmissions: u8) -> UnicastFate {
        let interval = self.cfg.retransmit_interval_ms;
        for attempt in 0..=max_retransmissions {
            if !self.lost(from, to) {
                return UnicastFate::Delivered {
                    after: u64::from(attempt) * interval + self.cfg.latency_ms,
                    retransmissions: attempt,
                };
            }
        }
        UnicastFate::TimedOut {
            after: (u64::from(max_retransmissions) + 1) * interval,
        }
    }
}
