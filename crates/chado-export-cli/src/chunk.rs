//! Organism list chunking
//!
//! Partitions the ordered organism list into the fixed-size groups that each
//! become one scheduler job. The partition is contiguous and order
//! preserving: concatenating the chunks reproduces the input exactly.

use crate::error::{ExportError, Result};

/// Split `items` into contiguous chunks of at most `size` elements.
///
/// Produces `ceil(len / size)` chunks; every chunk except possibly the last
/// has exactly `size` elements. An empty input yields no chunks. The source
/// of the list (file or database) makes no difference at this boundary.
pub fn chunk(items: &[String], size: usize) -> Result<Vec<Vec<String>>> {
    if size == 0 {
        return Err(ExportError::invalid_argument(
            "chunk size must be greater than 0",
        ));
    }

    Ok(items.chunks(size).map(|slice| slice.to_vec()).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn organisms(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Organism{:02}", i)).collect()
    }

    #[test]
    fn test_forty_organisms_slice_ten() {
        let items = organisms(40);
        let chunks = chunk(&items, 10).unwrap();

        assert_eq!(chunks.len(), 4);
        for group in &chunks {
            assert_eq!(group.len(), 10);
        }
        assert_eq!(chunks[0][0], "Organism01");
        assert_eq!(chunks[3][9], "Organism40");
    }

    #[test]
    fn test_forty_organisms_slice_three() {
        let items = organisms(40);
        let chunks = chunk(&items, 3).unwrap();

        assert_eq!(chunks.len(), 14);
        for group in &chunks[..13] {
            assert_eq!(group.len(), 3);
        }
        assert_eq!(chunks[13].len(), 1);
        assert_eq!(chunks[13][0], "Organism40");
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let items = organisms(17);
        for size in 1..=20 {
            let rejoined: Vec<String> = chunk(&items, size)
                .unwrap()
                .into_iter()
                .flatten()
                .collect();
            assert_eq!(rejoined, items, "chunk size {}", size);
        }
    }

    #[test]
    fn test_only_last_chunk_may_be_short() {
        let items = organisms(10);
        let chunks = chunk(&items, 4).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4);
        assert_eq!(chunks[1].len(), 4);
        assert_eq!(chunks[2].len(), 2);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks = chunk(&[], 10).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        let items = organisms(5);
        let err = chunk(&items, 0).unwrap_err();
        assert!(matches!(err, ExportError::InvalidArgument(_)));
    }

    #[test]
    fn test_duplicates_pass_through() {
        let items = vec!["Smansoni".to_string(), "Smansoni".to_string()];
        let chunks = chunk(&items, 1).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], chunks[1]);
    }
}
