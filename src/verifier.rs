//! Guess verification against one official draw.
//!
//! Input order never matters: the candidate list is deduplicated and sorted
//! before matching, so `verify([3,1,2,4,5])` and `verify([1,2,3,4,5])` are
//! the same request. Entries outside [1,80] are echoed back but can never
//! match a drawn number; validation only requires at least 5 distinct
//! entries, mirroring the observed client contract.

use crate::store::DrawStore;
use crate::types::{EngineError, VerificationResult, MIN_GAME_NUMBERS};

/// Check `numbers` against the draw for `contest_number`.
pub fn verify(
    store: &DrawStore,
    numbers: &[u16],
    contest_number: u32,
) -> Result<VerificationResult, EngineError> {
    let mut game_numbers: Vec<u16> = numbers.to_vec();
    game_numbers.sort_unstable();
    game_numbers.dedup();

    if game_numbers.len() < MIN_GAME_NUMBERS {
        return Err(EngineError::InvalidInput(format!(
            "at least {MIN_GAME_NUMBERS} distinct numbers are required, got {}",
            game_numbers.len()
        )));
    }

    let draw = store.get(contest_number)?;
    let drawn_numbers = draw.sorted_numbers();

    let matches: Vec<u8> = drawn_numbers
        .iter()
        .copied()
        .filter(|&n| game_numbers.contains(&u16::from(n)))
        .collect();

    Ok(VerificationResult {
        contest_number,
        match_count: matches.len(),
        game_numbers,
        drawn_numbers,
        matches,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
