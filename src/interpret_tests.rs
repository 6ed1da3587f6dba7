    use super::*;
    use crate::hooks::{ScriptEvaluator, StyleAdjuster, UnknownTagHandler};
    use crate::image::FileImageResolver;
    use crate::segment::segment;
    use ratatui::style::Color;
    use std::rc::Rc;

    struct Fixture {
        registry: TagRegistry,
        hooks: Hooks,
        default: ResolvedStyle,
        punctuation: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: TagRegistry::default(),
                hooks: Hooks::default(),
                default: ResolvedStyle::default(),
                punctuation: true,
            }
        }

        fn interpreter(&self) -> Interpreter<'_> {
            Interpreter {
                registry: &self.registry,
                hooks: &self.hooks,
                default_style: &self.default,
                base_path: None,
                image_resolver: &FileImageResolver,
                punctuation: self.punctuation,
                expansion_limit: DEFAULT_EXPANSION_LIMIT,
            }
        }

        fn parse_with(&self, markup: &str, definitions: &mut Definitions) -> Document {
            self.interpreter()
                .document(&segment(markup), definitions, DocumentState::default())
        }

        fn parse(&self, markup: &str) -> Document {
            self.parse_with(markup, &mut Definitions::new())
        }

        fn first(&self, markup: &str) -> Paragraph {
            self.parse(markup).paragraphs.remove(0)
        }
    }

    fn texts(document: &Document) -> Vec<&str> {
        document.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_bold_range_covers_enclosed_text() {
        let paragraph = Fixture::new().first("<b>Hello</b> world");
        assert_eq!(paragraph.text, "Hello world");
        assert_eq!(paragraph.styles.len(), 1);
        assert_eq!(paragraph.styles[0].range, 0..5);
        assert_eq!(
            paragraph.styles[0].style.get(AttrKey::Weight),
            Some(&Attribute::Weight(700.0))
        );
    }

    #[test]
    fn test_empty_tag_pair_produces_no_range() {
        let paragraph = Fixture::new().first("<b></b>x");
        assert_eq!(paragraph.text, "x");
        assert!(paragraph.styles.is_empty());
    }

    #[test]
    fn test_tag_names_are_case_insensitive() {
        let paragraph = Fixture::new().first("<B>x</b>");
        assert_eq!(paragraph.styles.len(), 1);
    }

    #[test]
    fn test_tabs_recorded_at_plain_text_offsets() {
        let paragraph = Fixture::new().first("a\tb\tc");
        assert_eq!(paragraph.text, "a\tb\tc");
        assert_eq!(paragraph.tabs, vec![1, 3]);
    }

    #[test]
    fn test_macro_expands_parameters() {
        let fixture = Fixture::new();
        let paragraph = fixture.first(r#"<define greet "Hi @1;!"><greet "Sam">"#);
        assert_eq!(paragraph.text, "Hi Sam!");
    }

    #[test]
    fn test_macro_defined_in_earlier_paragraph() {
        let document = Fixture::new().parse("<define greet \"Hi @1;!\">\n<GREET Sam>");
        assert_eq!(texts(&document), vec![" ", "Hi Sam!"]);
    }

    #[test]
    fn test_macro_unresolved_parameter_marker() {
        let paragraph = Fixture::new().first(r#"<define pair "@1;+@2;"><pair a>"#);
        assert_eq!(paragraph.text, "a+?2?");
    }

    #[test]
    fn test_macro_expansion_is_reparsed() {
        let paragraph = Fixture::new().first(r#"<define em "<i>@1;</i>"><em word>"#);
        assert_eq!(paragraph.text, "word");
        assert_eq!(paragraph.styles.len(), 1);
        assert_eq!(paragraph.styles[0].range, 0..4);
    }

    #[test]
    fn test_definitions_outlive_the_parse() {
        let fixture = Fixture::new();
        let mut definitions = Definitions::new();
        fixture.parse_with(r#"<define sig "-- @1;">"#, &mut definitions);
        assert_eq!(definitions.get("SIG"), Some("-- @1;"));
    }

    #[test]
    fn test_registered_replacement() {
        let mut fixture = Fixture::new();
        fixture.registry.set_replacement("copy", "(c) @1;").unwrap();
        assert_eq!(fixture.first("<copy 2024>").text, "(c) 2024");
    }

    #[test]
    fn test_runaway_expansion_fails_only_that_paragraph() {
        let document = Fixture::new().parse("<define loop \"<loop><loop>\"><loop>\nafter");
        assert_eq!(document.paragraphs.len(), 2);
        assert!(document.paragraphs[0].text.contains("expansion exceeded"));
        assert!(document.paragraphs[0].styles.is_empty());
        assert_eq!(document.paragraphs[1].text, "after");
    }

    #[test]
    fn test_failed_paragraph_keeps_carried_styles() {
        let document = Fixture::new().parse(
            "<autoclose off><define loop \"<loop><loop>\"><b>one\n<loop>\ntwo</b> x\nlast",
        );
        let [first, failed, resumed, last] = &document.paragraphs[..] else {
            panic!("expected four paragraphs");
        };
        assert_eq!(first.styles[0].range, 0..3);
        assert!(failed.text.contains("expansion exceeded"));
        assert_eq!(resumed.text, "two x");
        assert_eq!(resumed.styles.len(), 1);
        assert_eq!(resumed.styles[0].range, 0..3);
        assert!(last.styles.is_empty());
    }

    #[test]
    fn test_em_dash_from_three_hyphens() {
        let fixture = Fixture::new();
        assert_eq!(fixture.first("5---6").text, "5—6");
        assert_eq!(fixture.first("a--b").text, "a–b");
        assert_eq!(fixture.first("wait...").text, "wait…");
    }

    #[test]
    fn test_curly_quotes_track_depth() {
        let fixture = Fixture::new();
        assert_eq!(fixture.first(r#""Hi," she said"#).text, "“Hi,” she said");
        assert_eq!(fixture.first("don't 'quote'").text, "don’t ‘quote’");
    }

    #[test]
    fn test_quotes_pair_across_tags() {
        let fixture = Fixture::new();
        let paragraph = fixture.first(r#""<i>Hello</i>" and <b>Bob</b>'s"#);
        assert_eq!(paragraph.text, "“Hello” and Bob’s");
        let nested = fixture.first(r#""<b>"a"</b>" ok"#);
        assert_eq!(nested.text, "““a”” ok");
    }

    #[test]
    fn test_dashes_do_not_merge_across_tags() {
        let fixture = Fixture::new();
        assert_eq!(fixture.first("a-<b>-</b>b").text, "a--b");
    }

    #[test]
    fn test_punctuation_disabled_by_setting() {
        let mut fixture = Fixture::new();
        fixture.punctuation = false;
        assert_eq!(fixture.first("5---6").text, "5---6");
    }

    #[test]
    fn test_nopunc_counter_nests() {
        let fixture = Fixture::new();
        assert_eq!(fixture.first("<nopunc>--</nopunc>--").text, "--–");
        assert_eq!(
            fixture.first("<nopunc><nopunc>--</nopunc>--</nopunc>--").text,
            "----–"
        );
    }

    #[test]
    fn test_substitution_never_crosses_a_tag() {
        let paragraph = Fixture::new().first("-<b>-</b>");
        assert_eq!(paragraph.text, "--");
        assert_eq!(paragraph.styles[0].range, 1..2);
    }

    #[test]
    fn test_autoclose_on_closes_at_paragraph_end() {
        let paragraph = Fixture::new().first("<i>open");
        assert_eq!(paragraph.styles.len(), 1);
        assert_eq!(paragraph.styles[0].range, 0..4);
    }

    #[test]
    fn test_autoclose_off_carries_into_next_paragraph() {
        let document = Fixture::new().parse("<autoclose off><b>one\ntwo</b> x\nthree");
        let [first, second, third] = &document.paragraphs[..] else {
            panic!("expected three paragraphs");
        };
        assert_eq!(first.styles[0].range, 0..3);
        assert_eq!(second.styles.len(), 1);
        assert_eq!(second.styles[0].range, 0..3);
        assert!(third.styles.is_empty());
    }

    #[test]
    fn test_autoclose_off_discards_on_last_paragraph() {
        let paragraph = Fixture::new().first("<autoclose off><b>solo");
        assert!(paragraph.styles.is_empty());
    }

    #[test]
    fn test_heading_flag_is_per_paragraph() {
        let document = Fixture::new().parse("<h2>Title</h2>\nbody");
        assert_eq!(document.paragraphs[0].flags.heading, Some(2));
        assert!(document.paragraphs[0].is_heading());
        assert_eq!(document.paragraphs[1].flags.heading, None);
    }

    #[test]
    fn test_alignment_persists_until_closed() {
        let document = Fixture::new().parse("<center>a\nb</center>\nc");
        assert_eq!(document.paragraphs[0].flags.alignment, Alignment::Center);
        // The closing tag ends paragraph b, whose flags are captured after it.
        assert_eq!(document.paragraphs[1].flags.alignment, Alignment::Left);
        assert_eq!(document.paragraphs[2].flags.alignment, Alignment::Left);
    }

    #[test]
    fn test_vertical_anchor_reported_on_document() {
        let document = Fixture::new().parse("<bottom>text");
        assert_eq!(document.vertical, VerticalAlignment::Bottom);
    }

    #[test]
    fn test_tabwidth_tighten_and_loosen() {
        let fixture = Fixture::new();
        let paragraph = fixture.first("<tabwidth 4 8pt><tighten 0.2>x");
        assert_eq!(paragraph.flags.tab_widths, vec![4.0, 8.0]);
        assert!((paragraph.flags.tightness_delta + 0.2).abs() < 1e-6);
        let loose = fixture.first("<loosen>x");
        assert!((loose.flags.tightness_delta - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_repeat_expands_markup() {
        let paragraph = Fixture::new().first(r#"<repeat 3 "<b>ab</b>">"#);
        assert_eq!(paragraph.text, "ababab");
        assert_eq!(paragraph.styles.len(), 3);
    }

    #[test]
    fn test_repeat_is_charged_to_budget() {
        let paragraph = Fixture::new().first(r#"<repeat 100000 "xyz">"#);
        assert!(paragraph.text.contains("expansion exceeded"));
    }

    #[test]
    fn test_literal_angle_brackets() {
        let fixture = Fixture::new();
        let paragraph = fixture.first("<lt>b<gt>");
        assert_eq!(paragraph.text, "<b>");
        assert!(paragraph.styles.is_empty());
        assert_eq!(fixture.first("a < b").text, "a < b");
        assert_eq!(fixture.first("dangling <b").text, "dangling <b");
    }

    #[test]
    fn test_empty_paragraph_becomes_space() {
        assert_eq!(Fixture::new().first("<b></b>").text, " ");
    }

    #[test]
    fn test_unknown_tag_dropped() {
        assert_eq!(Fixture::new().first("a<blink>b</blink>").text, "ab");
    }

    #[test]
    fn test_image_emits_object_replacement() {
        let paragraph = Fixture::new().first("x<image nowhere/missing.png>y");
        assert_eq!(paragraph.text, "x\u{FFFC}y");
        assert_eq!(paragraph.styles.len(), 1);
        assert_eq!(paragraph.styles[0].range, 1..4);
        let image = paragraph.styles[0].style.replacement().unwrap();
        assert_eq!(image.id, "nowhere/missing.png");
        assert_eq!(image.width, 72.0);
    }

    #[test]
    fn test_inner_style_wins_over_outer() {
        let paragraph = Fixture::new().first("<color red>a<color blue>b</color>c</color>");
        let runs = paragraph.styled_text().runs(&ResolvedStyle::default());
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].style.foreground, Color::Red);
        assert_eq!(runs[1].style.foreground, Color::Blue);
        assert_eq!(runs[2].style.foreground, Color::Red);
    }

    #[test]
    fn test_relative_size_reads_open_styles() {
        let paragraph = Fixture::new().first("<size 20><size 50%>x</size></size>");
        let inner = paragraph
            .styles
            .iter()
            .find(|range| range.style.get(AttrKey::Size) == Some(&Attribute::Size(10.0)));
        assert!(inner.is_some(), "{:?}", paragraph.styles);
    }

    struct Bracketing;

    impl UnknownTagHandler for Bracketing {
        fn handle_unknown_tag(&self, tag: &str, original: &str) -> Option<String> {
            (tag == "name").then(|| format!("[{original}]"))
        }
    }

    #[test]
    fn test_unknown_tag_handler_replacement_is_parsed() {
        let mut fixture = Fixture::new();
        fixture.hooks.unknown_tags = Rc::new(Bracketing);
        assert_eq!(fixture.first("<NAME>!").text, "[NAME]!");
        assert_eq!(fixture.first("<other>!").text, "!");
    }

    struct Calculator;

    impl ScriptEvaluator for Calculator {
        fn evaluate(&self, expression: &str) -> Option<String> {
            (expression == "1+1").then(|| "<b>2</b>".to_string())
        }

        fn call(&self, params: &[String]) -> Option<String> {
            Some(params.join("|"))
        }
    }

    #[test]
    fn test_script_hooks() {
        let mut fixture = Fixture::new();
        assert_eq!(fixture.first("[<eval 1+1>]").text, "[]");
        fixture.hooks.script = Some(Rc::new(Calculator));
        let evaluated = fixture.first("[<eval 1+1>]");
        assert_eq!(evaluated.text, "[2]");
        assert_eq!(evaluated.styles[0].range, 1..2);
        assert_eq!(fixture.first(r#"<script a "b c">"#).text, "a|b c");
        assert_eq!(fixture.first("<eval 2+2>x").text, "x");
    }

    struct AlwaysItalic;

    impl StyleAdjuster for AlwaysItalic {
        fn adjust_style(
            &self,
            _tag: &str,
            _style: Arc<TextStyle>,
            _context: &dyn StyleContext,
        ) -> Arc<TextStyle> {
            style::ITALIC.clone()
        }
    }

    #[test]
    fn test_style_adjuster_sees_every_open() {
        let mut fixture = Fixture::new();
        fixture.hooks.style_adjuster = Rc::new(AlwaysItalic);
        let paragraph = fixture.first("<b>x</b>");
        assert!(paragraph.styles[0].style.contains(AttrKey::Posture));
        assert!(!paragraph.styles[0].style.contains(AttrKey::Weight));
    }

    #[test]
    fn test_registry_rejects_bad_names() {
        let mut registry = TagRegistry::default();
        assert!(registry.set_replacement("", "x").is_err());
        assert!(registry.set_replacement("/b", "x").is_err());
        assert!(registry.set_replacement("a b", "x").is_err());
        assert!(registry.set_replacement("Sig", "x").is_ok());
        assert_eq!(registry.replacement("sig"), Some("x"));
    }

    #[test]
    fn test_registry_one_meaning_per_name() {
        let mut registry = TagRegistry::default();
        registry.set_replacement("b", "bold").unwrap();
        assert!(registry.style("b").is_none());
        assert!(registry.remove("B"));
        assert!(!registry.remove("b"));
        assert!(TagRegistry::empty().style("i").is_none());
    }

    #[test]
    fn test_expand_template_edge_cases() {
        let params = vec!["x".to_string()];
        assert_eq!(expand_template("@1;@1;", &params), "xx");
        assert_eq!(expand_template("@0;", &params), "?0?");
        assert_eq!(expand_template("a@b @1", &params), "a@b @1");
        assert_eq!(expand_template("mail@1;.org", &params), "mailx.org");
    }

    #[test]
    fn test_expansion_budget_floor_and_limit() {
        assert_eq!(ExpansionBudget::new(0, 32).limit(), 1024);
        assert_eq!(ExpansionBudget::new(100, 32).limit(), 3200);
        let mut budget = ExpansionBudget::new(10, 1);
        assert!(budget.charge(1000).is_ok());
        assert_eq!(budget.remaining(), 24);
        assert!(matches!(
            budget.charge(25),
            Err(MarkupError::ExpansionLimit { limit: 1024 })
        ));
    }
