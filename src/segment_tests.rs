    use super::*;

    #[test]
    fn test_segment_br_splits_paragraphs() {
        assert_eq!(segment("line1<br>line2"), vec!["line1", "line2"]);
        assert_eq!(segment("a<BR/>b"), vec!["a", "b"]);
    }

    #[test]
    fn test_segment_newlines() {
        assert_eq!(segment("a\nb\r\nc"), vec!["a", "b", "c"]);
        assert_eq!(segment("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_segment_trailing_newline_adds_nothing() {
        assert_eq!(segment("a\n"), vec!["a"]);
    }

    #[test]
    fn test_segment_empty_markup() {
        assert_eq!(segment(""), vec![""]);
        assert_eq!(segment("\n"), vec![""]);
    }

    #[test]
    fn test_segment_heading_swallows_one_newline() {
        assert_eq!(
            segment("<h1>Title</h1>\nBody"),
            vec!["<h1>Title</h1>", "Body"]
        );
        assert_eq!(
            segment("<h2>Title</h2>\n\nBody"),
            vec!["<h2>Title</h2>", "", "Body"]
        );
    }

    #[test]
    fn test_segment_heading_starts_new_paragraph() {
        assert_eq!(segment("Intro <h3>Head</h3>"), vec!["Intro ", "<h3>Head</h3>"]);
        assert_eq!(segment("<h7>Run-in</h7>"), vec!["<h7>Run-in</h7>"]);
    }

    #[test]
    fn test_segment_h8_is_not_a_heading() {
        assert_eq!(segment("a<h8>b</h8>\nc"), vec!["a<h8>b</h8>", "c"]);
    }

    #[test]
    fn test_segment_line_continuation() {
        assert_eq!(segment("one \\\n   two"), vec!["one two"]);
    }

    #[test]
    fn test_segment_quoted_parameters_keep_tag_whole() {
        assert_eq!(
            segment(r#"<define x "a>b<br>c">done"#),
            vec![r#"<define x "a>b<br>c">done"#]
        );
    }

    #[test]
    fn test_segment_literal_less_than() {
        assert_eq!(segment("a < b<br>c"), vec!["a < b", "c"]);
        assert_eq!(segment("open <tag"), vec!["open <tag"]);
    }

    #[test]
    fn test_heading_level_bounds() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h7"), Some(7));
        assert_eq!(heading_level("h0"), None);
        assert_eq!(heading_level("hr"), None);
    }
