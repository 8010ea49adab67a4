//! Processing order for the assignment engine.
//!
//! Committed (fixed) demands go first, sorted by `(priority rank, committed
//! month)`, so a higher-priority commitment wins a contested slot. Fixed
//! demands without a rank go after the ranked ones. Flexible demands follow,
//! sorted by `(priority rank, eligible month)`. Both sorts are stable, so
//! equal keys keep input order unless the [`TieBreaker::ById`] strategy is
//! selected.

use crate::config::TieBreaker;
use crate::models::{CategoryOrder, Demand, YearMonth};

/// Demand indices split into processing phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOrder {
    /// Fixed demands, in processing order.
    pub fixed: Vec<usize>,
    /// Flexible demands with a known rank, in processing order.
    pub flexible: Vec<usize>,
    /// Flexible demands without a rank (unknown category, no override).
    pub unranked: Vec<usize>,
}

impl ProcessingOrder {
    /// Builds the processing order for the given subset of demands.
    ///
    /// `indices` selects which demands take part (normally the
    /// schedulable bucket from intake routing).
    pub fn build(
        demands: &[Demand],
        indices: &[usize],
        order: &CategoryOrder,
        tie_breaker: TieBreaker,
    ) -> Self {
        let mut result = Self::default();
        let mut fixed = Vec::new();
        let mut flexible = Vec::new();

        for &i in indices {
            let demand = &demands[i];
            let rank = demand.priority_rank(order);
            if demand.is_fixed() {
                fixed.push((rank.unwrap_or(u32::MAX), demand.fixed_month(), i));
                continue;
            }
            match rank {
                Some(rank) => flexible.push((rank, demand.eligible_month(), i)),
                None => result.unranked.push(i),
            }
        }

        result.fixed = sort_keyed(fixed, demands, tie_breaker);
        result.flexible = sort_keyed(flexible, demands, tie_breaker);
        result
    }
}

fn sort_keyed(
    mut keyed: Vec<(u32, Option<YearMonth>, usize)>,
    demands: &[Demand],
    tie_breaker: TieBreaker,
) -> Vec<usize> {
    match tie_breaker {
        TieBreaker::InputOrder => keyed.sort_by_key(|&(rank, month, _)| (rank, month)),
        TieBreaker::ById => keyed.sort_by(|a, b| {
            (a.0, a.1)
                .cmp(&(b.0, b.1))
                .then_with(|| demands[a.2].id.cmp(&demands[b.2].id))
        }),
    }
    keyed.into_iter().map(|(_, _, i)| i).collect()
}
