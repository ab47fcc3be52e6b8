//! Substring scanner
//!
//! Enumerates substrings of a text by code point, shortest first at each
//! start index, and reports those that test positive.
//!
//! Order: for start `i` in `0..=N-L`, for length `j` in `L..=N-i`.
//! With `L = 0` only the whole text is tested.
//!
//! Membership is not monotonic under substring containment, so every
//! candidate is tested; nothing is pruned.

use std::time::Instant;

use tracing::debug;

use crate::error::ScanError;
use crate::ports::MembershipTest;

/// A single screening request
#[derive(Clone, Debug)]
pub struct ScanRequest {
    /// Text to screen
    pub text: String,
    /// Minimum substring length in code points; 0 means the whole text only
    pub min_substring_length: usize,
    /// Absolute point in time after which the scan is abandoned
    pub deadline: Instant,
}

impl ScanRequest {
    pub fn new(text: impl Into<String>, min_substring_length: usize, deadline: Instant) -> Self {
        Self {
            text: text.into(),
            min_substring_length,
            deadline,
        }
    }
}

/// Substrings that tested positive, in discovery order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub matches: Vec<String>,
    /// Number of candidates tested
    pub tested: u64,
}

/// Scans texts against a membership test
pub struct SubstringScanner<M> {
    set: M,
}

impl<M: MembershipTest> SubstringScanner<M> {
    pub fn new(set: M) -> Self {
        Self { set }
    }

    /// Run a scan, failing with `ScanError::Timeout` once the deadline passes
    pub fn scan(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let text = request.text.as_str();

        // Byte offset of every code point boundary, including the end, so a
        // substring of code points [i, i+j) is text[bounds[i]..bounds[i+j]].
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let n = bounds.len() - 1;

        let min_len = match request.min_substring_length {
            0 => n,
            len => len,
        };

        let mut result = ScanResult::default();
        if n == 0 || min_len > n {
            return Ok(result);
        }

        for start in 0..=(n - min_len) {
            for len in min_len..=(n - start) {
                if Instant::now() >= request.deadline {
                    debug!(
                        tested = result.tested,
                        matches = result.matches.len(),
                        "scan deadline exceeded"
                    );
                    return Err(ScanError::Timeout {
                        tested: result.tested,
                    });
                }

                let candidate = &text[bounds[start]..bounds[start + len]];
                result.tested += 1;
                if self.set.test(candidate.as_bytes()) {
                    result.matches.push(candidate.to_owned());
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::domain::BloomFilter;

    fn exact_set(words: &[&str]) -> HashSet<Vec<u8>> {
        words.iter().map(|w| w.as_bytes().to_vec()).collect()
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    /// Records every candidate it is asked about
    #[derive(Default)]
    struct RecordingSet {
        seen: Mutex<Vec<String>>,
    }

    impl MembershipTest for RecordingSet {
        fn test(&self, item: &[u8]) -> bool {
            self.seen
                .lock()
                .unwrap()
                .push(String::from_utf8(item.to_vec()).unwrap());
            false
        }
    }

    #[test]
    fn test_reports_matches_in_enumeration_order() {
        let set = exact_set(&["ab", "bcd"]);
        let request = ScanRequest::new("abcd", 1, far_deadline());

        let result = SubstringScanner::new(&set).scan(&request).unwrap();
        assert_eq!(result.matches, vec!["ab", "bcd"]);
        assert_eq!(result.tested, 10);
    }

    #[test]
    fn test_enumeration_order_is_start_then_length() {
        let recorder = RecordingSet::default();
        let request = ScanRequest::new("abc", 1, far_deadline());

        SubstringScanner::new(&recorder).scan(&request).unwrap();
        let seen = recorder.seen.into_inner().unwrap();
        assert_eq!(seen, vec!["a", "ab", "abc", "b", "bc", "c"]);
    }

    #[test]
    fn test_bloom_filter_matches_exact_vocabulary() {
        let mut filter = BloomFilter::new(1 << 20, 7).unwrap();
        filter.insert(b"ab");
        filter.insert(b"bcd");

        let request = ScanRequest::new("abcd", 1, far_deadline());
        let result = SubstringScanner::new(&filter).scan(&request).unwrap();
        assert_eq!(result.matches, vec!["ab", "bcd"]);
    }

    #[test]
    fn test_zero_min_length_tests_whole_text_only() {
        let recorder = RecordingSet::default();
        let request = ScanRequest::new("hello", 0, far_deadline());

        let result = SubstringScanner::new(&recorder).scan(&request).unwrap();
        assert_eq!(result.tested, 1);
        assert_eq!(recorder.seen.into_inner().unwrap(), vec!["hello"]);
    }

    #[test]
    fn test_min_length_longer_than_text() {
        let set = exact_set(&["abc"]);
        let request = ScanRequest::new("abc", 4, far_deadline());

        let result = SubstringScanner::new(&set).scan(&request).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.tested, 0);
    }

    #[test]
    fn test_min_length_skips_short_candidates() {
        let recorder = RecordingSet::default();
        let request = ScanRequest::new("abcd", 3, far_deadline());

        SubstringScanner::new(&recorder).scan(&request).unwrap();
        assert_eq!(
            recorder.seen.into_inner().unwrap(),
            vec!["abc", "abcd", "bcd"]
        );
    }

    #[test]
    fn test_empty_text_tests_nothing() {
        let recorder = RecordingSet::default();
        let request = ScanRequest::new("", 0, far_deadline());

        let result = SubstringScanner::new(&recorder).scan(&request).unwrap();
        assert_eq!(result.tested, 0);
    }

    #[test]
    fn test_substrings_split_on_code_points() {
        let set = exact_set(&["é", "ßé"]);
        let request = ScanRequest::new("aßé", 1, far_deadline());

        let result = SubstringScanner::new(&set).scan(&request).unwrap();
        assert_eq!(result.matches, vec!["ßé", "é"]);
    }

    #[test]
    fn test_repeated_substrings_reported_per_position() {
        let set = exact_set(&["ab"]);
        let request = ScanRequest::new("abab", 2, far_deadline());

        let result = SubstringScanner::new(&set).scan(&request).unwrap();
        assert_eq!(result.matches, vec!["ab", "ab"]);
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let recorder = RecordingSet::default();
        let text = "x".repeat(2_000);
        let request = ScanRequest::new(text, 1, Instant::now());

        let err = SubstringScanner::new(&recorder).scan(&request).unwrap_err();
        assert_eq!(err, ScanError::Timeout { tested: 0 });
        assert!(recorder.seen.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_deadline_stops_long_scan_early() {
        // 20k code points is ~2e8 candidates; far beyond 20ms
        let filter = BloomFilter::new(1 << 16, 3).unwrap();
        let text = "y".repeat(20_000);
        let request = ScanRequest::new(text, 1, Instant::now() + Duration::from_millis(20));

        match SubstringScanner::new(&filter).scan(&request) {
            Err(ScanError::Timeout { tested }) => {
                assert!(tested < 20_000 * 20_001 / 2, "Scan should stop early");
            }
            Ok(_) => panic!("Scan should not complete within the deadline"),
        }
    }
}
