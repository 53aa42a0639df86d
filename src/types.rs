//! Shared types for the QUINALAB engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that store, statistics, generator,
//! and API modules can depend on them without circular references.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Domain constants
// ---------------------------------------------------------------------------

/// Smallest playable number.
pub const NUMBER_MIN: u8 = 1;
/// Largest playable number.
pub const NUMBER_MAX: u8 = 80;
/// Numbers drawn per contest.
pub const DRAW_SIZE: usize = 5;

/// Minimum numbers in a generated or verified game.
pub const MIN_GAME_NUMBERS: usize = 5;
/// Maximum numbers in a generated game.
pub const MAX_GAME_NUMBERS: usize = 80;
/// Maximum games per generation request.
pub const MAX_GAMES_PER_REQUEST: usize = 100;

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

/// One official contest result.
///
/// `drawn_numbers` is kept in draw order (position 1..5); the sorted view
/// is derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub contest_number: u32,
    pub draw_date: String,
    pub drawn_numbers: Vec<u8>,
    pub accumulated: bool,
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {}{}",
            self.contest_number,
            self.draw_date,
            self.drawn_numbers
                .iter()
                .map(|n| format!("{n:02}"))
                .collect::<Vec<_>>()
                .join(" "),
            if self.accumulated { " (acc)" } else { "" },
        )
    }
}

impl Draw {
    /// Validate the structural invariants: contest number positive, exactly
    /// 5 numbers, each in [1,80], no duplicates.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.contest_number == 0 {
            return Err(EngineError::InvalidDraw(
                "contest number must be positive".into(),
            ));
        }
        if self.drawn_numbers.len() != DRAW_SIZE {
            return Err(EngineError::InvalidDraw(format!(
                "expected {DRAW_SIZE} numbers, got {}",
                self.drawn_numbers.len()
            )));
        }
        for &n in &self.drawn_numbers {
            if !(NUMBER_MIN..=NUMBER_MAX).contains(&n) {
                return Err(EngineError::InvalidDraw(format!(
                    "number {n} outside [{NUMBER_MIN},{NUMBER_MAX}]"
                )));
            }
        }
        let mut sorted = self.drawn_numbers.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != DRAW_SIZE {
            return Err(EngineError::InvalidDraw(
                "duplicate numbers within draw".into(),
            ));
        }
        Ok(())
    }

    /// The drawn numbers sorted ascending.
    pub fn sorted_numbers(&self) -> Vec<u8> {
        let mut sorted = self.drawn_numbers.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Whether `number` was drawn in this contest.
    pub fn contains(&self, number: u8) -> bool {
        self.drawn_numbers.contains(&number)
    }

    /// Helper to build a known test draw (the contest-2500 worked example).
    #[cfg(test)]
    pub fn sample() -> Self {
        Draw {
            contest_number: 2500,
            draw_date: "2025-01-15".to_string(),
            drawn_numbers: vec![4, 15, 22, 61, 80],
            accumulated: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Outcome of checking one game against one official draw.
///
/// `game_numbers` echoes the (deduplicated, sorted) input, including
/// out-of-range entries — those simply can never match. `matches` is the
/// ascending intersection with the drawn numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub contest_number: u32,
    pub game_numbers: Vec<u16>,
    pub drawn_numbers: Vec<u8>,
    pub matches: Vec<u8>,
    pub match_count: usize,
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "contest #{}: {}/{} matched {:?}",
            self.contest_number,
            self.match_count,
            self.game_numbers.len(),
            self.matches,
        )
    }
}

// ---------------------------------------------------------------------------
// Refresh report
// ---------------------------------------------------------------------------

/// Counts produced by one refresh pass against the external source.
///
/// A contest already present in the store counts toward `total_processed`
/// only — neither inserted nor an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub total_processed: u64,
    pub total_inserted: u64,
    pub total_errors: u64,
    #[serde(rename = "latestContestNumber")]
    pub latest_contest: Option<u32>,
    pub message: String,
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} inserted={} errors={} latest={:?}",
            self.total_processed, self.total_inserted, self.total_errors, self.latest_contest,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for QUINALAB.
///
/// None of these is fatal to the process; the API layer maps each variant
/// to an HTTP status and a `{ "error": ... }` body.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid draw: {0}")]
    InvalidDraw(String),

    #[error("Contest {0} already present")]
    DuplicateContest(u32),

    #[error("Contest {0} not found")]
    NotFound(u32),

    #[error("No draws in store")]
    EmptyStore,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source error: {0}")]
    Source(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Draw tests --

    #[test]
    fn test_draw_validate_ok() {
        assert!(Draw::sample().validate().is_ok());
    }

    #[test]
    fn test_draw_validate_zero_contest() {
        let mut draw = Draw::sample();
        draw.contest_number = 0;
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));
    }

    #[test]
    fn test_draw_validate_wrong_length() {
        let mut draw = Draw::sample();
        draw.drawn_numbers = vec![1, 2, 3, 4];
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));

        draw.drawn_numbers = vec![1, 2, 3, 4, 5, 6];
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));
    }

    #[test]
    fn test_draw_validate_out_of_range() {
        let mut draw = Draw::sample();
        draw.drawn_numbers = vec![0, 2, 3, 4, 5];
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));

        draw.drawn_numbers = vec![1, 2, 3, 4, 81];
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));
    }

    #[test]
    fn test_draw_validate_duplicates() {
        let mut draw = Draw::sample();
        draw.drawn_numbers = vec![7, 7, 3, 4, 5];
        assert!(matches!(draw.validate(), Err(EngineError::InvalidDraw(_))));
    }

    #[test]
    fn test_draw_validate_boundaries_ok() {
        let draw = Draw {
            contest_number: 1,
            draw_date: "2000-01-01".to_string(),
            drawn_numbers: vec![1, 80, 40, 41, 2],
            accumulated: true,
        };
        assert!(draw.validate().is_ok());
    }

    #[test]
    fn test_draw_sorted_numbers_preserves_original_order() {
        let draw = Draw {
            contest_number: 10,
            draw_date: "2020-05-05".to_string(),
            drawn_numbers: vec![61, 4, 80, 15, 22],
            accumulated: false,
        };
        assert_eq!(draw.sorted_numbers(), vec![4, 15, 22, 61, 80]);
        // Draw order untouched
        assert_eq!(draw.drawn_numbers, vec![61, 4, 80, 15, 22]);
    }

    #[test]
    fn test_draw_contains() {
        let draw = Draw::sample();
        assert!(draw.contains(22));
        assert!(!draw.contains(23));
    }

    #[test]
    fn test_draw_display() {
        let display = format!("{}", Draw::sample());
        assert!(display.contains("#2500"));
        assert!(display.contains("04 15 22 61 80"));
        assert!(!display.contains("(acc)"));
    }

    #[test]
    fn test_draw_serialization_field_names() {
        let json = serde_json::to_string(&Draw::sample()).unwrap();
        assert!(json.contains("\"contestNumber\":2500"));
        assert!(json.contains("\"drawDate\""));
        assert!(json.contains("\"drawnNumbers\""));
        assert!(json.contains("\"accumulated\":false"));
    }

    #[test]
    fn test_draw_serialization_roundtrip() {
        let draw = Draw::sample();
        let json = serde_json::to_string(&draw).unwrap();
        let parsed: Draw = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, draw);
    }

    // -- VerificationResult tests --

    #[test]
    fn test_verification_result_serialization_field_names() {
        let result = VerificationResult {
            contest_number: 2500,
            game_numbers: vec![4, 7, 15, 61, 99],
            drawn_numbers: vec![4, 15, 22, 61, 80],
            matches: vec![4, 15, 61],
            match_count: 3,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"contestNumber\":2500"));
        assert!(json.contains("\"gameNumbers\""));
        assert!(json.contains("\"matchCount\":3"));
    }

    #[test]
    fn test_verification_result_display() {
        let result = VerificationResult {
            contest_number: 42,
            game_numbers: vec![1, 2, 3, 4, 5],
            drawn_numbers: vec![1, 2, 30, 40, 50],
            matches: vec![1, 2],
            match_count: 2,
        };
        let display = format!("{result}");
        assert!(display.contains("#42"));
        assert!(display.contains("2/5"));
    }

    // -- RefreshReport tests --

    #[test]
    fn test_refresh_report_serialization_field_names() {
        let report = RefreshReport {
            total_processed: 10,
            total_inserted: 8,
            total_errors: 2,
            latest_contest: Some(6792),
            message: "done".into(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"totalProcessed\":10"));
        assert!(json.contains("\"totalInserted\":8"));
        assert!(json.contains("\"totalErrors\":2"));
        assert!(json.contains("\"latestContestNumber\":6792"));
    }

    #[test]
    fn test_refresh_report_display() {
        let report = RefreshReport {
            total_processed: 3,
            total_inserted: 3,
            total_errors: 0,
            latest_contest: Some(100),
            message: String::new(),
        };
        let display = format!("{report}");
        assert!(display.contains("processed=3"));
        assert!(display.contains("inserted=3"));
    }

    // -- EngineError tests --

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            format!("{}", EngineError::DuplicateContest(77)),
            "Contest 77 already present"
        );
        assert_eq!(
            format!("{}", EngineError::NotFound(123)),
            "Contest 123 not found"
        );
        assert_eq!(format!("{}", EngineError::EmptyStore), "No draws in store");
        assert!(format!("{}", EngineError::InvalidDraw("bad".into())).contains("bad"));
    }
}
