//! Payout readiness state machine.
//!
//! Transitions are pure: persistence is emitted as commands for the caller
//! to run after the transition, never performed inside it. Every transition
//! replaces the whole aggregate collection; there is no partial update.

use pd_core::{Article, AuthorPayout, PayoutRate};

use crate::engine::{calculate, rescale};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PayoutState {
    #[default]
    Empty,
    /// Built by a full pass over an article collection.
    Calculated(Vec<AuthorPayout>),
    /// Repriced from a previous aggregate after a rate change.
    Rescaled(Vec<AuthorPayout>),
}

impl PayoutState {
    pub fn payouts(&self) -> &[AuthorPayout] {
        match self {
            PayoutState::Empty => &[],
            PayoutState::Calculated(payouts) | PayoutState::Rescaled(payouts) => payouts,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PayoutEvent {
    /// A new validated article batch arrived; aggregates are rebuilt from
    /// scratch.
    ArticlesLoaded {
        articles: Vec<Article>,
        rates: PayoutRate,
    },
    /// Only the rate table changed; existing aggregates are repriced.
    RatesChanged(PayoutRate),
}

/// Side effects owed after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PersistPayouts(Vec<AuthorPayout>),
    PersistRates(PayoutRate),
}

pub fn transition(state: PayoutState, event: PayoutEvent) -> (PayoutState, Vec<Command>) {
    match event {
        PayoutEvent::ArticlesLoaded { articles, rates } => {
            let payouts = calculate(&articles, &rates);
            let commands = vec![Command::PersistPayouts(payouts.clone())];
            (PayoutState::Calculated(payouts), commands)
        }
        PayoutEvent::RatesChanged(rates) => match state {
            PayoutState::Empty => (PayoutState::Empty, vec![Command::PersistRates(rates)]),
            PayoutState::Calculated(previous) | PayoutState::Rescaled(previous) => {
                let payouts = rescale(&previous, &rates);
                let commands = vec![
                    Command::PersistRates(rates),
                    Command::PersistPayouts(payouts.clone()),
                ];
                (PayoutState::Rescaled(payouts), commands)
            }
        },
    }
}
