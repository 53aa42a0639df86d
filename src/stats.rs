//! Statistics engine — the six distribution families derived from the store.
//!
//! `StatsSnapshot::compute` is a pure function of the store's current
//! contents: one O(draws × 5) pass collects frequency, delay (atraso),
//! positional, range-band, parity, and final-digit distributions. Nothing
//! here is persisted; callers decide whether to cache the snapshot.
//!
//! Percentages are taken against the total number of drawn slots
//! (`total_draws × 5`) and rounded to 2 decimal places throughout.
//! Rankings break ties by ascending number so results are deterministic.

use serde::Serialize;

use crate::store::DrawStore;
use crate::types::{DRAW_SIZE, NUMBER_MAX, NUMBER_MIN};

/// How many numbers to keep per draw position.
pub const TOP_PER_POSITION: usize = 10;

/// The fixed range bands (faixas) used for the distribution analysis.
pub const RANGE_BANDS: [(u8, u8, &str); 4] = [
    (1, 20, "01-20"),
    (21, 40, "21-40"),
    (41, 60, "41-60"),
    (61, 80, "61-80"),
];

// ---------------------------------------------------------------------------
// Per-family entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFrequency {
    pub number: u8,
    pub frequency: u64,
    /// Share of all drawn slots, percent, 2 decimals.
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberDelay {
    pub number: u8,
    /// Contests since last appearance. 0 if present in the latest draw,
    /// `total_draws` if never seen.
    pub atraso: u64,
    pub last_seen_contest: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRank {
    pub number: u8,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionStat {
    /// Draw position, 1..=5.
    pub position: u8,
    pub top_numbers: Vec<PositionRank>,
    pub total_draws: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStat {
    pub range: String,
    pub quantity: u64,
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityStat {
    pub even_count: u64,
    pub odd_count: u64,
    pub percentual_even: f64,
    pub percentual_odd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitStat {
    pub digit: u8,
    pub quantity: u64,
    pub percentual: f64,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One consistent view of all six distributions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_draws: u64,
    /// All 80 numbers, sorted by frequency descending, ties by number.
    pub frequency_by_number: Vec<NumberFrequency>,
    /// All 80 numbers, sorted by atraso descending, ties by number.
    pub delays_by_number: Vec<NumberDelay>,
    /// One entry per draw position (1..=5); empty when the store is empty.
    pub by_position: Vec<PositionStat>,
    pub by_range: Vec<RangeStat>,
    pub parity: ParityStat,
    pub by_digit: Vec<DigitStat>,
}

impl StatsSnapshot {
    /// Compute a snapshot from the store's current contents.
    ///
    /// The caller must hold the store steady for the duration (in practice:
    /// compute under the store's read lock).
    pub fn compute(store: &DrawStore) -> Self {
        let total_draws = store.len() as u64;
        let slots = total_draws * DRAW_SIZE as u64;

        let mut frequency = [0u64; NUMBER_MAX as usize + 1];
        let mut last_seen_idx = [None::<u64>; NUMBER_MAX as usize + 1];
        let mut last_seen_contest = [None::<u32>; NUMBER_MAX as usize + 1];
        let mut position_counts = [[0u64; NUMBER_MAX as usize + 1]; DRAW_SIZE];
        let mut range_counts = [0u64; RANGE_BANDS.len()];
        let mut even_count = 0u64;
        let mut odd_count = 0u64;
        let mut digit_counts = [0u64; 10];

        for (idx, draw) in store.all().enumerate() {
            for (pos, &n) in draw.drawn_numbers.iter().enumerate() {
                let i = n as usize;
                frequency[i] += 1;
                last_seen_idx[i] = Some(idx as u64);
                last_seen_contest[i] = Some(draw.contest_number);
                position_counts[pos][i] += 1;

                if let Some(band) = RANGE_BANDS.iter().position(|&(lo, hi, _)| lo <= n && n <= hi)
                {
                    range_counts[band] += 1;
                }
                if n % 2 == 0 {
                    even_count += 1;
                } else {
                    odd_count += 1;
                }
                digit_counts[(n % 10) as usize] += 1;
            }
        }

        // -- Frequency ranking ------------------------------------------------

        let mut frequency_by_number: Vec<NumberFrequency> = (NUMBER_MIN..=NUMBER_MAX)
            .map(|n| NumberFrequency {
                number: n,
                frequency: frequency[n as usize],
                percentual: percent(frequency[n as usize], slots),
            })
            .collect();
        frequency_by_number.sort_by_key(|f| (std::cmp::Reverse(f.frequency), f.number));

        // -- Delay ranking ----------------------------------------------------

        let mut delays_by_number: Vec<NumberDelay> = (NUMBER_MIN..=NUMBER_MAX)
            .map(|n| {
                let atraso = match last_seen_idx[n as usize] {
                    Some(idx) => total_draws - 1 - idx,
                    None => total_draws,
                };
                NumberDelay {
                    number: n,
                    atraso,
                    last_seen_contest: last_seen_contest[n as usize],
                }
            })
            .collect();
        delays_by_number.sort_by_key(|d| (std::cmp::Reverse(d.atraso), d.number));

        // -- Positional -------------------------------------------------------

        let by_position: Vec<PositionStat> = if total_draws == 0 {
            Vec::new()
        } else {
            (0..DRAW_SIZE)
                .map(|pos| {
                    let mut ranked: Vec<PositionRank> = (NUMBER_MIN..=NUMBER_MAX)
                        .filter(|&n| position_counts[pos][n as usize] > 0)
                        .map(|n| PositionRank {
                            number: n,
                            frequency: position_counts[pos][n as usize],
                        })
                        .collect();
                    ranked.sort_by_key(|r| (std::cmp::Reverse(r.frequency), r.number));
                    ranked.truncate(TOP_PER_POSITION);
                    PositionStat {
                        position: pos as u8 + 1,
                        top_numbers: ranked,
                        total_draws,
                    }
                })
                .collect()
        };

        // -- Ranges, parity, digits ------------------------------------------

        let by_range = RANGE_BANDS
            .iter()
            .enumerate()
            .map(|(i, &(_, _, label))| RangeStat {
                range: label.to_string(),
                quantity: range_counts[i],
                percentual: percent(range_counts[i], slots),
            })
            .collect();

        let parity = ParityStat {
            even_count,
            odd_count,
            percentual_even: percent(even_count, slots),
            percentual_odd: percent(odd_count, slots),
        };

        let by_digit = (0u8..10)
            .map(|d| DigitStat {
                digit: d,
                quantity: digit_counts[d as usize],
                percentual: percent(digit_counts[d as usize], slots),
            })
            .collect();

        StatsSnapshot {
            total_draws,
            frequency_by_number,
            delays_by_number,
            by_position,
            by_range,
            parity,
            by_digit,
        }
    }

    /// The `n` most frequent numbers (frequency > 0), ranked.
    pub fn top_frequent(&self, n: usize) -> Vec<u8> {
        self.frequency_by_number
            .iter()
            .filter(|f| f.frequency > 0)
            .take(n)
            .map(|f| f.number)
            .collect()
    }

    /// The `n` most delayed numbers, ranked.
    pub fn top_delayed(&self, n: usize) -> Vec<u8> {
        self.delays_by_number
            .iter()
            .take(n)
            .map(|d| d.number)
            .collect()
    }

    /// The top candidates for one draw position (1..=5), up to `n`.
    pub fn position_pool(&self, position: u8, n: usize) -> Vec<u8> {
        self.by_position
            .iter()
            .find(|p| p.position == position)
            .map(|p| p.top_numbers.iter().take(n).map(|r| r.number).collect())
            .unwrap_or_default()
    }

    /// The delay entry for one number (always present, all 80 are ranked).
    pub fn delay_of(&self, number: u8) -> Option<&NumberDelay> {
        self.delays_by_number.iter().find(|d| d.number == number)
    }
}

/// Percentage of `count` over `total`, rounded to 2 decimals; 0 when
/// `total` is 0.
fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        ((count as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
