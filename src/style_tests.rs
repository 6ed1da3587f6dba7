    use super::*;

    #[test]
    fn test_style_with_replaces_same_key() {
        let style = TextStyle::new()
            .with(Attribute::Weight(300.0))
            .with(Attribute::Weight(700.0));
        assert_eq!(style.len(), 1);
        assert_eq!(style.get(AttrKey::Weight), Some(&Attribute::Weight(700.0)));
    }

    #[test]
    fn test_resolved_style_applies_attributes() {
        let mut resolved = ResolvedStyle::default();
        resolved.apply(&BOLD);
        resolved.apply(&ITALIC);
        assert!(resolved.is_bold());
        assert_eq!(resolved.posture, Posture::Oblique);
    }

    #[test]
    fn test_size_scale_multiplies_current_size() {
        let mut resolved = ResolvedStyle::default();
        resolved.apply(&TextStyle::new().with(Attribute::Size(20.0)));
        resolved.apply(&SUPERSCRIPT);
        assert!((resolved.size - 14.0).abs() < 1e-4);
        assert_eq!(resolved.superscript, 1);
    }

    #[test]
    fn test_heading_styles_are_distinct() {
        let s1 = heading_style(1);
        let s2 = heading_style(2);
        let s3 = heading_style(3);
        assert_ne!(s1.get(AttrKey::Foreground), s2.get(AttrKey::Foreground));
        assert_ne!(s2.get(AttrKey::Foreground), s3.get(AttrKey::Foreground));
        assert!(s1.contains(AttrKey::Weight));
    }

    #[test]
    fn test_to_ratatui_maps_modifiers() {
        let mut resolved = ResolvedStyle::default();
        resolved.apply(&BOLD);
        resolved.apply(&UNDERLINE);
        resolved.apply(&STRIKETHROUGH);
        let style = resolved.to_ratatui();
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(!style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_attribute_reports_unset_background_as_none() {
        let resolved = ResolvedStyle::default();
        assert_eq!(resolved.attribute(AttrKey::Background), None);
        assert_eq!(resolved.attribute(AttrKey::Size), Some(Attribute::Size(12.0)));
    }

    #[test]
    fn test_style_range_discards_empty() {
        assert!(StyleRange::new(BOLD.clone(), 3, 3).is_none());
        assert!(StyleRange::new(BOLD.clone(), 4, 3).is_none());
        let range = StyleRange::new(BOLD.clone(), 0, 5).unwrap();
        assert_eq!(range.range, 0..5);
    }

    #[test]
    fn test_styled_text_rejects_out_of_bounds() {
        let mut text = StyledText::new("abc");
        let err = text.apply(StyleRange {
            style: BOLD.clone(),
            range: 1..9,
        });
        assert!(matches!(err, Err(MarkupError::InvalidRange { .. })));
    }

    #[test]
    fn test_styled_text_rejects_split_character() {
        let mut text = StyledText::new("é!");
        let err = text.apply(StyleRange {
            style: BOLD.clone(),
            range: 1..3,
        });
        assert!(matches!(err, Err(MarkupError::NotCharBoundary(1))));
    }

    #[test]
    fn test_runs_split_at_range_boundaries() {
        let mut text = StyledText::new("Hello world");
        text.apply(StyleRange::new(BOLD.clone(), 0, 5).unwrap()).unwrap();
        let runs = text.runs(&ResolvedStyle::default());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].range, 0..5);
        assert!(runs[0].style.is_bold());
        assert_eq!(runs[1].range, 5..11);
        assert!(!runs[1].style.is_bold());
    }

    #[test]
    fn test_runs_overlapping_ranges() {
        let mut text = StyledText::new("abcdef");
        text.apply(StyleRange::new(BOLD.clone(), 0, 4).unwrap()).unwrap();
        text.apply(StyleRange::new(ITALIC.clone(), 2, 6).unwrap()).unwrap();
        let runs = text.runs(&ResolvedStyle::default());
        assert_eq!(runs.len(), 3);
        assert!(runs[1].style.is_bold());
        assert_eq!(runs[1].style.posture, Posture::Oblique);
        assert!(!runs[2].style.is_bold());
    }

    #[test]
    fn test_runs_merge_identical_neighbours() {
        let mut text = StyledText::new("abcdef");
        text.apply(StyleRange::new(BOLD.clone(), 0, 3).unwrap()).unwrap();
        text.apply(StyleRange::new(BOLD.clone(), 3, 6).unwrap()).unwrap();
        let runs = text.runs(&ResolvedStyle::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].range, 0..6);
    }

    #[test]
    fn test_runs_empty_text() {
        let text = StyledText::new("");
        assert!(text.runs(&ResolvedStyle::default()).is_empty());
    }
