//! Deciding when the epoch loop stops.
//!
//! A [`ConvergencePolicy`] is a pure function of the epoch number, the latest
//! [`EpochStats`], the run [`History`] and, for the interactive policy, the reply
//! of a [`ContinuationOracle`]. The oracle is the only place where the driver
//! blocks on the outside world, and it is only consulted between epochs.

use crate::stats::EpochStats;
use log::warn;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConvergencePolicy {
    /// Run `pause_every` epochs, then ask an oracle how many more to run.
    Interactive { pause_every: usize },
    /// Stop once the largest cluster shrinks by no more than `threshold` pixels
    /// from one epoch to the next.
    Threshold { threshold: usize },
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        ConvergencePolicy::Interactive { pause_every: 1 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    /// Keep going and consult the oracle again after this many epochs.
    ContinueAfter(usize),
    Stop,
}

/// An answer to "pause again after how many epochs?".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Pause again after the next epoch.
    Next,
    /// Pause again after this many epochs, `0` stops the run.
    Runs(usize),
    Malformed,
}

impl Reply {
    pub fn parse(input: &str) -> Reply {
        let input = input.trim();
        if input.is_empty() {
            return Reply::Next;
        }
        input.parse().map_or(Reply::Malformed, Reply::Runs)
    }
}

/// What the policy needs to remember between epochs.
#[derive(Debug, Clone, Default)]
pub struct History {
    max_occupancy: Vec<usize>,
    checkpoint: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest cluster occupancy of every finished epoch.
    pub fn max_occupancy(&self) -> &[usize] {
        &self.max_occupancy
    }

    pub fn record(&mut self, stats: &EpochStats, decision: Decision) {
        self.max_occupancy.push(stats.max_occupancy());
        if let Decision::ContinueAfter(n) = decision {
            self.checkpoint = Some(stats.epoch.saturating_add(n));
        }
    }
}

impl ConvergencePolicy {
    /// Whether the oracle must be consulted after `epoch`.
    pub fn is_checkpoint(&self, epoch: usize, history: &History) -> bool {
        match *self {
            ConvergencePolicy::Interactive { pause_every } => {
                epoch >= history.checkpoint.unwrap_or(pause_every)
            }
            ConvergencePolicy::Threshold { .. } => false,
        }
    }

    pub fn decide(
        &self,
        stats: &EpochStats,
        history: &History,
        reply: Option<Reply>,
    ) -> Decision {
        match *self {
            ConvergencePolicy::Interactive { .. } => {
                if !self.is_checkpoint(stats.epoch, history) {
                    return Decision::Continue;
                }
                match reply {
                    Some(Reply::Next) => Decision::ContinueAfter(1),
                    Some(Reply::Runs(0)) => Decision::Stop,
                    Some(Reply::Runs(n)) => Decision::ContinueAfter(n),
                    Some(Reply::Malformed) => {
                        warn!("malformed continuation reply, stopping");
                        Decision::Stop
                    }
                    None => Decision::Stop,
                }
            }
            ConvergencePolicy::Threshold { threshold } => {
                let Some(&previous) = history.max_occupancy.last() else {
                    return Decision::Continue;
                };
                let reduction = previous as i128 - stats.max_occupancy() as i128;
                if reduction <= threshold as i128 {
                    Decision::Stop
                } else {
                    Decision::Continue
                }
            }
        }
    }
}

/// Asked at checkpoints of the interactive policy whether to keep going.
pub trait ContinuationOracle {
    fn ask(&mut self, stats: &EpochStats) -> Reply;
}

impl<F> ContinuationOracle for F
where
    F: FnMut(&EpochStats) -> Reply,
{
    fn ask(&mut self, stats: &EpochStats) -> Reply {
        self(stats)
    }
}

/// Always declines, stopping the run at the first checkpoint.
#[derive(Debug, Default, Copy, Clone)]
pub struct Decline;

impl ContinuationOracle for Decline {
    fn ask(&mut self, _stats: &EpochStats) -> Reply {
        Reply::Runs(0)
    }
}

/// Replays a fixed list of replies, declining once it runs out.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    replies: VecDeque<Reply>,
}

impl Scripted {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }
}

impl ContinuationOracle for Scripted {
    fn ask(&mut self, _stats: &EpochStats) -> Reply {
        self.replies.pop_front().unwrap_or(Reply::Runs(0))
    }
}

/// Prompts on a writer and reads one line per checkpoint from a reader.
///
/// I/O failures and end of input count as a malformed reply.
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ContinuationOracle for Prompt<R, W> {
    fn ask(&mut self, stats: &EpochStats) -> Reply {
        let prompted = write!(
            self.output,
            "Run no. {} finished.\nPause again after ? runs (0 to cancel): ",
            stats.epoch
        )
        .and_then(|()| self.output.flush());
        if prompted.is_err() {
            return Reply::Malformed;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Reply::Malformed,
            Ok(_) => Reply::parse(&line),
        }
    }
}
