//! This module contains the pure, stateless kernel for sliding-window n-gram
//! extraction.
//!
//! A window of width `n` slides over the token sequence with stride 1. Each window
//! is rendered as its tokens joined by a single space. The kernel holds no state
//! and may be called concurrently from any number of threads.

use crate::config::PROPERTY_NGRAM_SIZE;
use crate::error::NGramError;

const SEPARATOR: char = ' ';

//==================================================================================
// 1. Core Logic
//==================================================================================

/// Number of n-grams a sequence of `len` tokens yields: `max(0, len - n + 1)`.
pub fn ngram_count(len: usize, n: usize) -> usize {
    if n == 0 || len < n {
        0
    } else {
        len - n + 1
    }
}

/// Calls `emit` once per window, in window-start order, with the joined n-gram.
///
/// The joined string lives in a scratch buffer reused across windows, so callers
/// that copy it straight into an Arrow builder avoid one allocation per n-gram.
pub fn for_each_ngram<S, F>(tokens: &[S], n: usize, mut emit: F) -> Result<(), NGramError>
where
    S: AsRef<str>,
    F: FnMut(&str),
{
    if n == 0 {
        return Err(NGramError::InvalidConfiguration {
            property: PROPERTY_NGRAM_SIZE.to_string(),
            reason: "n-gram size must be a positive integer, got 0".to_string(),
        });
    }
    if tokens.len() < n {
        return Ok(());
    }

    let mut scratch = String::new();
    for window in tokens.windows(n) {
        scratch.clear();
        for (i, token) in window.iter().enumerate() {
            if i > 0 {
                scratch.push(SEPARATOR);
            }
            scratch.push_str(token.as_ref());
        }
        emit(&scratch);
    }
    Ok(())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Extracts the sliding-window n-grams of `tokens`.
///
/// Fewer tokens than `n` (including none) yields an empty vector; that is not
/// an error.
///
/// # Errors
/// Returns `NGramError::InvalidConfiguration` if `n == 0`.
pub fn extract<S: AsRef<str>>(tokens: &[S], n: usize) -> Result<Vec<String>, NGramError> {
    let mut ngrams = Vec::with_capacity(ngram_count(tokens.len(), n));
    for_each_ngram(tokens, n, |ngram| ngrams.push(ngram.to_string()))?;
    Ok(ngrams)
}
