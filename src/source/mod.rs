//! External draw sources.
//!
//! Defines the `DrawSource` trait and provides the Caixa Econômica Federal
//! implementation. Everything behind this trait is an external collaborator:
//! the engine only sees well-formed `Draw`s (or errors) coming out of it.

pub mod caixa;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Draw;

/// Abstraction over an official-results provider.
///
/// Implementors fetch the most recent contest and arbitrary past contests.
/// The refresh coordinator drives this trait; tests mock it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// Fetch the most recent official draw.
    async fn fetch_latest(&self) -> Result<Draw>;

    /// Fetch one specific contest.
    async fn fetch_contest(&self, contest_number: u32) -> Result<Draw>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}
