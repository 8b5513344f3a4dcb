//! Run-length grouping over sorted index sequences.

/// Group sorted, deduplicated indices into maximal contiguous runs,
/// returned as inclusive (start, end) pairs.
pub(crate) fn contiguous_runs(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut iter = indices.iter().copied();
    let mut current = match iter.next() {
        Some(first) => (first, first),
        None => return runs,
    };
    for index in iter {
        if index == current.1 + 1 {
            current.1 = index;
        } else {
            runs.push(current);
            current = (index, index);
        }
    }
    runs.push(current);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(contiguous_runs(&[]).is_empty());
    }

    #[test]
    fn test_single_run() {
        assert_eq!(contiguous_runs(&[3, 4, 5]), vec![(3, 5)]);
    }

    #[test]
    fn test_split_runs() {
        assert_eq!(
            contiguous_runs(&[0, 1, 4, 7, 8, 9]),
            vec![(0, 1), (4, 4), (7, 9)]
        );
    }

    #[test]
    fn test_singletons() {
        assert_eq!(contiguous_runs(&[2, 5]), vec![(2, 2), (5, 5)]);
    }
}
