//! CLI infrastructure for the learnlab demos
//!
//! This module provides the command-line interface for the threshold
//! classifier, k-means clustering and grid-world Q-learning demos.

pub mod commands;
pub mod config;
pub mod output;

use crate::{Error, Result};

/// Parse a comma-separated list of numbers, e.g. `"2, 3.5,4"`.
///
/// Empty entries are skipped, so `""` yields an empty list.
pub fn parse_list(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<f64>().map_err(|_| Error::ParseList {
                input: entry.to_string(),
                list: list.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_with_whitespace() {
        assert_eq!(parse_list(" 2, 3.5 ,4").unwrap(), vec![2.0, 3.5, 4.0]);
        assert_eq!(parse_list("").unwrap(), Vec::<f64>::new());
        assert_eq!(parse_list("1,,2").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn reports_the_bad_entry() {
        let err = parse_list("1,two,3").unwrap_err();
        assert!(matches!(err, Error::ParseList { ref input, .. } if input == "two"));
    }
}
