    use super::*;
    use crate::image::{ImageAlignment, MissingImage};
    use crate::style::ResolvedStyle;
    use std::sync::Arc;

    fn run(text: &str, x: f32, baseline: f32, direction: Direction) -> PositionedRun {
        PositionedRun {
            paragraph: 0,
            range: 0..text.len(),
            text: text.to_string(),
            style: ResolvedStyle::default(),
            x,
            baseline,
            advance: text.chars().count() as f32,
            ascent: 1.0,
            descent: 0.0,
            direction,
            object: None,
        }
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_draw_run_at_line_top() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 8, 3));
        BufferSurface::new(&mut buffer).draw_run(&run("hey", 2.0, 2.0, Direction::LeftToRight));
        assert_eq!(row(&buffer, 1), "  hey   ");
        assert_eq!(row(&buffer, 0), "        ");
    }

    #[test]
    fn test_draw_run_right_to_left_reverses() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 1));
        BufferSurface::new(&mut buffer).draw_run(&run("abc", 0.0, 1.0, Direction::RightToLeft));
        assert_eq!(row(&buffer, 0), "cba ");
    }

    #[test]
    fn test_draw_run_clips_to_buffer() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 1));
        let mut surface = BufferSurface::new(&mut buffer);
        surface.draw_run(&run("abcdef", 2.0, 1.0, Direction::LeftToRight));
        surface.draw_run(&run("zz", 1.0, 5.0, Direction::LeftToRight));
        assert_eq!(row(&buffer, 0), "  ab");
    }

    #[test]
    fn test_buffer_offset_is_respected() {
        let mut buffer = Buffer::empty(Rect::new(3, 2, 4, 2));
        BufferSurface::new(&mut buffer).draw_run(&run("ok", 0.0, 1.0, Direction::LeftToRight));
        assert_eq!(buffer[(3, 2)].symbol(), "o");
        assert_eq!(buffer[(4, 2)].symbol(), "k");
    }

    #[test]
    fn test_dashed_rect_outline() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 3));
        BufferSurface::new(&mut buffer).draw_dashed_rect(LayoutRect::new(0.0, 0.0, 4.0, 3.0));
        assert_eq!(row(&buffer, 0), "┆┄┄┆");
        assert_eq!(row(&buffer, 1), "┆  ┆");
        assert_eq!(row(&buffer, 2), "┆┄┄┆");
    }

    #[test]
    fn test_image_paints_its_box() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 2));
        let image = InlineImage {
            id: "gone.png".into(),
            source: Arc::new(MissingImage),
            width: 2.0,
            height: 2.0,
            alignment: ImageAlignment::Baseline,
            offset: 0.0,
        };
        BufferSurface::new(&mut buffer).draw_image(&image, LayoutRect::new(1.0, 0.0, 2.0, 2.0));
        assert_eq!(row(&buffer, 0), " ?? ");
        assert_eq!(row(&buffer, 1), " ?? ");
    }

    #[test]
    fn test_empty_fill_paints_nothing() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 2, 1));
        BufferSurface::new(&mut buffer).fill(LayoutRect::new(0.0, 0.0, 0.0, 1.0), 'x');
        assert_eq!(row(&buffer, 0), "  ");
    }

    #[test]
    fn test_edge_marker() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 3, 1));
        BufferSurface::new(&mut buffer).draw_edge_marker(1.0, 0.0);
        assert_eq!(row(&buffer, 0), " · ");
    }
