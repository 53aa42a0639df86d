//! Guess generation under a closed set of strategies.
//!
//! Every strategy builds its candidate pools deterministically from a
//! `StatsSnapshot` (same snapshot ⇒ same ranked pools); the final member
//! selection inside a pool is randomized. Games always come back
//! deduplicated and sorted ascending.
//!
//! When the store behind the snapshot is empty, every statistics-driven
//! strategy falls back to uniform random sampling.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::stats::StatsSnapshot;
use crate::types::{
    EngineError, MAX_GAMES_PER_REQUEST, MAX_GAME_NUMBERS, MIN_GAME_NUMBERS, NUMBER_MAX, NUMBER_MIN,
};

// ---------------------------------------------------------------------------
// Pool sizing constants
// ---------------------------------------------------------------------------

/// Pool size for the pure frequent / delayed strategies.
const TOP_POOL_SIZE: usize = 30;
/// Pool size for each half of the mixed strategy.
const MIXED_POOL_SIZE: usize = 20;
/// Candidates considered per position for 5-number positional games.
const POSITION_TIGHT_POOL: usize = 5;
/// Candidates considered per position for larger positional games.
const POSITION_WIDE_POOL: usize = 10;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Number-selection policy. A closed set: adding a strategy is a
/// compile-time-checked extension, not a string branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniform sampling without replacement — fully randomized.
    Random,
    /// Random picks from the top-30 most frequent numbers.
    Frequent,
    /// Random picks from the top-30 most delayed numbers.
    Delayed,
    /// The most delayed numbers taken outright in ranking order, no
    /// sampling. The one strategy that is reproducible for a given history.
    TopDelayed,
    /// Half from the top-20 frequent pool, half from the top-20 delayed
    /// pool (delayed half takes the remainder on odd sizes).
    Mixed,
    /// Even spread across the four range bands, remainder to lower bands.
    ByRange,
    /// Picks driven by the per-position frequency rankings.
    ByPosition,
}

impl Strategy {
    pub const ALL: &'static [Strategy] = &[
        Strategy::Random,
        Strategy::Frequent,
        Strategy::Delayed,
        Strategy::TopDelayed,
        Strategy::Mixed,
        Strategy::ByRange,
        Strategy::ByPosition,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Random => "random",
            Strategy::Frequent => "frequent",
            Strategy::Delayed => "delayed",
            Strategy::TopDelayed => "top_delayed",
            Strategy::Mixed => "mixed",
            Strategy::ByRange => "by_range",
            Strategy::ByPosition => "by_position",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "frequent" => Ok(Strategy::Frequent),
            "delayed" => Ok(Strategy::Delayed),
            "top_delayed" | "atrasados" => Ok(Strategy::TopDelayed),
            "mixed" | "balanced" => Ok(Strategy::Mixed),
            "by_range" | "range" => Ok(Strategy::ByRange),
            "by_position" | "position" => Ok(Strategy::ByPosition),
            _ => Err(EngineError::InvalidParameter(format!(
                "unknown strategy: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate `game_count` games of `numbers_per_game` distinct numbers each.
pub fn generate<R: Rng>(
    strategy: Strategy,
    numbers_per_game: usize,
    game_count: usize,
    stats: &StatsSnapshot,
    rng: &mut R,
) -> Result<Vec<Vec<u8>>, EngineError> {
    if !(MIN_GAME_NUMBERS..=MAX_GAME_NUMBERS).contains(&numbers_per_game) {
        return Err(EngineError::InvalidParameter(format!(
            "numbers per game must be between {MIN_GAME_NUMBERS} and {MAX_GAME_NUMBERS}"
        )));
    }
    if !(1..=MAX_GAMES_PER_REQUEST).contains(&game_count) {
        return Err(EngineError::InvalidParameter(format!(
            "game count must be between 1 and {MAX_GAMES_PER_REQUEST}"
        )));
    }

    let games = (0..game_count)
        .map(|_| {
            let mut numbers = one_game(strategy, numbers_per_game, stats, rng);
            numbers.sort_unstable();
            numbers.dedup();
            // Pool shortfalls are topped up uniformly, never left short
            fill_uniform(&mut numbers, numbers_per_game, rng);
            numbers.sort_unstable();
            numbers
        })
        .collect();

    Ok(games)
}

fn one_game<R: Rng>(
    strategy: Strategy,
    count: usize,
    stats: &StatsSnapshot,
    rng: &mut R,
) -> Vec<u8> {
    // Without history there is nothing to rank on
    if stats.total_draws == 0 && strategy != Strategy::Random && strategy != Strategy::ByRange {
        return sample_uniform(count, rng);
    }

    match strategy {
        Strategy::Random => sample_uniform(count, rng),
        Strategy::Frequent => sample_pool(&stats.top_frequent(TOP_POOL_SIZE), count, &[], rng),
        Strategy::Delayed => sample_pool(&stats.top_delayed(TOP_POOL_SIZE), count, &[], rng),
        Strategy::TopDelayed => stats.top_delayed(count),
        Strategy::Mixed => mixed_game(count, stats, rng),
        Strategy::ByRange => range_game(count, rng),
        Strategy::ByPosition => position_game(count, stats, rng),
    }
}

fn mixed_game<R: Rng>(count: usize, stats: &StatsSnapshot, rng: &mut R) -> Vec<u8> {
    let frequent_share = count / 2;
    let delayed_share = count - frequent_share;

    let mut numbers = sample_pool(
        &stats.top_frequent(MIXED_POOL_SIZE),
        frequent_share,
        &[],
        rng,
    );
    let delayed = sample_pool(
        &stats.top_delayed(MIXED_POOL_SIZE),
        delayed_share,
        &numbers,
        rng,
    );
    numbers.extend(delayed);
    numbers
}

fn range_game<R: Rng>(count: usize, rng: &mut R) -> Vec<u8> {
    let bands: [(u8, u8); 4] = [(1, 20), (21, 40), (41, 60), (61, 80)];
    let per_band = count / bands.len();
    let remainder = count % bands.len();

    let mut numbers = Vec::with_capacity(count);
    for (idx, &(lo, hi)) in bands.iter().enumerate() {
        let take = per_band + usize::from(idx < remainder);
        let band: Vec<u8> = (lo..=hi).collect();
        numbers.extend(band.choose_multiple(rng, take.min(band.len())).copied());
    }
    numbers
}

fn position_game<R: Rng>(count: usize, stats: &StatsSnapshot, rng: &mut R) -> Vec<u8> {
    if stats.by_position.len() < 5 {
        return sample_uniform(count, rng);
    }

    let mut numbers: Vec<u8> = Vec::with_capacity(count);
    if count == 5 {
        // One pick from each position's tight pool
        for position in 1..=5u8 {
            let pool = stats.position_pool(position, POSITION_TIGHT_POOL);
            let candidates: Vec<u8> = pool.into_iter().filter(|n| !numbers.contains(n)).collect();
            if let Some(&pick) = candidates.choose(rng) {
                numbers.push(pick);
            }
        }
    } else {
        let per_position = count / 5;
        let remainder = count % 5;
        for position in 1..=5u8 {
            let take = per_position + usize::from(usize::from(position) <= remainder);
            let pool = stats.position_pool(position, POSITION_WIDE_POOL);
            let picked = sample_pool(&pool, take, &numbers, rng);
            numbers.extend(picked);
        }
    }
    numbers
}

/// Uniform sample without replacement from the full playable range.
fn sample_uniform<R: Rng>(count: usize, rng: &mut R) -> Vec<u8> {
    let all: Vec<u8> = (NUMBER_MIN..=NUMBER_MAX).collect();
    all.choose_multiple(rng, count.min(all.len())).copied().collect()
}

/// Randomly pick up to `count` members of `pool`, skipping `exclude`.
fn sample_pool<R: Rng>(pool: &[u8], count: usize, exclude: &[u8], rng: &mut R) -> Vec<u8> {
    let available: Vec<u8> = pool
        .iter()
        .copied()
        .filter(|n| !exclude.contains(n))
        .collect();
    available
        .choose_multiple(rng, count.min(available.len()))
        .copied()
        .collect()
}

/// Top up `numbers` with uniform picks until it holds `target` members.
fn fill_uniform<R: Rng>(numbers: &mut Vec<u8>, target: usize, rng: &mut R) {
    while numbers.len() < target {
        let candidate = rng.gen_range(NUMBER_MIN..=NUMBER_MAX);
        if !numbers.contains(&candidate) {
            numbers.push(candidate);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
