    use super::*;

    /// Base classifier with a fixed boundary list, so filter behaviour can be
    /// tested independently of UAX #14 details.
    #[derive(Debug, Clone, Default)]
    struct FixedBreaks {
        text: String,
        candidates: Vec<usize>,
        index: usize,
    }

    impl FixedBreaks {
        fn new(candidates: &[usize]) -> Self {
            Self {
                candidates: candidates.to_vec(),
                ..Self::default()
            }
        }
    }

    impl LineBreaks for FixedBreaks {
        fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
            self.index = 0;
        }
        fn text(&self) -> &str {
            &self.text
        }
        fn current(&self) -> usize {
            self.candidates[self.index]
        }
        fn first(&mut self) -> usize {
            self.index = 0;
            self.candidates[0]
        }
        fn last(&mut self) -> usize {
            self.index = self.candidates.len() - 1;
            self.candidates[self.index]
        }
        fn next(&mut self) -> Option<usize> {
            if self.index + 1 >= self.candidates.len() {
                return None;
            }
            self.index += 1;
            Some(self.candidates[self.index])
        }
        fn previous(&mut self) -> Option<usize> {
            if self.index == 0 {
                return None;
            }
            self.index -= 1;
            Some(self.candidates[self.index])
        }
        fn following(&mut self, offset: usize) -> Option<usize> {
            let idx = self.candidates.iter().position(|&b| b > offset)?;
            self.index = idx;
            Some(self.candidates[idx])
        }
        fn preceding(&mut self, offset: usize) -> Option<usize> {
            let idx = self.candidates.iter().rposition(|&b| b < offset)?;
            self.index = idx;
            Some(self.candidates[idx])
        }
    }

    #[test]
    fn test_unicode_breaks_after_spaces() {
        let mut breaks = UnicodeBreaks::new();
        breaks.set_text("hello big world");
        assert_eq!(breaks.first(), 0);
        assert_eq!(breaks.next(), Some(6));
        assert_eq!(breaks.next(), Some(10));
        assert_eq!(breaks.next(), Some(15));
        assert_eq!(breaks.next(), None);
    }

    #[test]
    fn test_unicode_breaks_backward() {
        let mut breaks = UnicodeBreaks::new();
        breaks.set_text("hello big world");
        assert_eq!(breaks.last(), 15);
        assert_eq!(breaks.previous(), Some(10));
        assert_eq!(breaks.previous(), Some(6));
        assert_eq!(breaks.previous(), Some(0));
        assert_eq!(breaks.previous(), None);
    }

    #[test]
    fn test_unicode_breaks_following_and_preceding() {
        let mut breaks = UnicodeBreaks::new();
        breaks.set_text("hello big world");
        assert_eq!(breaks.following(3), Some(6));
        assert_eq!(breaks.following(6), Some(10));
        assert_eq!(breaks.following(15), None);
        assert_eq!(breaks.preceding(8), Some(6));
        assert_eq!(breaks.preceding(0), None);
    }

    #[test]
    fn test_unicode_breaks_empty_text() {
        let mut breaks = UnicodeBreaks::new();
        breaks.set_text("");
        assert_eq!(breaks.first(), 0);
        assert_eq!(breaks.next(), None);
    }

    #[test]
    fn test_apostrophe_rule() {
        let text = "rock\u{2019}n roll";
        let after_quote = "rock\u{2019}".len();
        assert!(!apostrophe_rule(text, after_quote));
        assert!(apostrophe_rule("rock\u{2019} roll", after_quote));
        assert!(apostrophe_rule(text, 2));
    }

    #[test]
    fn test_filter_skips_rejected_candidates_forward() {
        let text = "ab\u{2019}cd ef";
        let quote_end = "ab\u{2019}".len();
        let space_end = "ab\u{2019}cd ".len();
        let mut breaks = FilteredBreaks::new(FixedBreaks::new(&[0, quote_end, space_end, text.len()]));
        breaks.set_text(text);
        assert_eq!(breaks.first(), 0);
        assert_eq!(breaks.next(), Some(space_end));
        assert_eq!(breaks.next(), Some(text.len()));
        assert_eq!(breaks.next(), None);
    }

    #[test]
    fn test_filter_skips_rejected_candidates_backward() {
        let text = "ab\u{2019}cd ef";
        let quote_end = "ab\u{2019}".len();
        let mut breaks = FilteredBreaks::new(FixedBreaks::new(&[0, quote_end, text.len()]));
        breaks.set_text(text);
        assert_eq!(breaks.preceding(text.len()), Some(0));
        assert_eq!(breaks.following(0), Some(text.len()));
    }

    #[test]
    fn test_filter_with_custom_rule() {
        fn never_after_b(text: &str, offset: usize) -> bool {
            !text[..offset].ends_with('b')
        }
        let mut breaks = FilteredBreaks::with_rule(FixedBreaks::new(&[0, 1, 2, 3]), never_after_b);
        breaks.set_text("abc");
        assert_eq!(breaks.next(), Some(1));
        assert_eq!(breaks.next(), Some(3));
    }

    #[test]
    fn test_cached_matches_base() {
        let text = "the quick brown fox jumps";
        let mut base = UnicodeBreaks::new();
        base.set_text(text);
        let mut expected = vec![base.first()];
        while let Some(b) = base.next() {
            expected.push(b);
        }
        let cached = ParagraphBreaks::for_text(text);
        assert_eq!(cached.boundaries(), expected.as_slice());
    }

    fn stepped<B: LineBreaks>(breaks: &mut B) -> Vec<usize> {
        let mut found = Vec::new();
        breaks.first();
        while let Some(b) = breaks.next() {
            found.push(b);
        }
        found
    }

    #[test]
    fn test_scan_matches_stepping() {
        let text = "don\u{2019}t stop \u{201c}rock\u{2019}\u{201d} and roll, 漢字 ok";
        let mut base = UnicodeBreaks::new();
        base.set_text(text);
        let expected = stepped(&mut base);
        assert_eq!(base.scan(), expected);
        assert_eq!(base.current(), text.len());

        let mut filtered = FilteredBreaks::new(UnicodeBreaks::new());
        filtered.set_text(text);
        let expected = stepped(&mut filtered);
        assert_eq!(filtered.scan(), expected);
    }

    #[test]
    fn test_long_paragraph_cache() {
        let text = "word ".repeat(20_000);
        let breaks = ParagraphBreaks::for_text(&text);
        assert_eq!(breaks.boundaries().len(), 20_001);
        assert_eq!(breaks.boundaries()[1], 5);
        assert_eq!(breaks.boundaries().last(), Some(&text.len()));
    }

    #[test]
    fn test_cached_random_access() {
        let mut breaks = ParagraphBreaks::for_text("aa bb cc");
        assert_eq!(breaks.boundaries(), &[0, 3, 6, 8]);
        assert_eq!(breaks.following(4), Some(6));
        assert_eq!(breaks.current(), 6);
        assert_eq!(breaks.preceding(6), Some(3));
        assert_eq!(breaks.following(8), None);
        assert_eq!(breaks.current(), 8);
        assert_eq!(breaks.preceding(0), None);
        assert_eq!(breaks.current(), 0);
        assert!(breaks.is_boundary(3));
        assert!(!breaks.is_boundary(4));
    }

    #[test]
    fn test_cached_next_by_advances_n_positions() {
        let mut breaks = ParagraphBreaks::for_text("aa bb cc");
        breaks.first();
        assert_eq!(breaks.next_by(2), Some(6));
        assert_eq!(breaks.next_by(-1), Some(3));
        assert_eq!(breaks.next_by(0), Some(3));
    }

    #[test]
    fn test_cached_next_by_past_end_is_done() {
        let mut breaks = ParagraphBreaks::for_text("aa bb cc");
        breaks.first();
        assert_eq!(breaks.next_by(4), None);
        assert_eq!(breaks.current(), 8);
        assert_eq!(breaks.next_by(-10), None);
        assert_eq!(breaks.current(), 0);
    }

    #[test]
    fn test_cached_empty_text() {
        let mut breaks = ParagraphBreaks::for_text("");
        assert_eq!(breaks.boundaries(), &[0]);
        assert_eq!(breaks.first(), 0);
        assert_eq!(breaks.last(), 0);
        assert_eq!(breaks.next(), None);
    }
