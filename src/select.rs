//! Instance selection per RFC 2782.

use crate::SrvRecord;
use rand::Rng;

/// Picks the record to use now, according to priority and weight.
///
/// Only the records with the lowest priority value are candidates. Among
/// those, each is chosen with a probability proportional to its weight, or
/// uniformly if all their weights are 0. Returns `None` for no records.
pub fn select<R: SrvRecord>(records: &[R]) -> Option<&R> {
    select_with_rng(records, &mut rand::rng())
}

/// Like [`select`], drawing from the given random number generator.
pub fn select_with_rng<'a, R, G>(records: &'a [R], rng: &mut G) -> Option<&'a R>
where
    R: SrvRecord,
    G: Rng,
{
    let priority = records.iter().map(|r| r.priority()).min()?;
    let candidates: Vec<&R> = records
        .iter()
        .filter(|r| r.priority() == priority)
        .collect();

    let total_weight: u64 = candidates.iter().map(|r| u64::from(r.weight())).sum();
    if total_weight == 0 {
        return candidates.get(rng.random_range(0..candidates.len())).copied();
    }

    // The running sum reaches `total_weight`, which exceeds any draw
    let draw = rng.random_range(0..total_weight);
    let mut running = 0;
    candidates.into_iter().find(|r| {
        running += u64::from(r.weight());
        draw < running
    })
}
