    use super::*;

    fn inset(left: f32, right: f32) -> Arc<dyn PageShape> {
        Arc::new(InsetShape::new(left, right))
    }

    #[test]
    fn test_rectangle_has_no_insets() {
        assert_eq!(RectangleShape.left_inset(0.0, 10.0), 0.0);
        assert_eq!(RectangleShape.right_inset(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_threshold_above_and_below() {
        let shape = ThresholdShape::new(100.0, inset(10.0, 2.0), Arc::new(RectangleShape));
        assert_eq!(shape.left_inset(5.0, 17.0), 10.0);
        assert_eq!(shape.right_inset(5.0, 17.0), 2.0);
        assert_eq!(shape.left_inset(100.0, 112.0), 0.0);
    }

    #[test]
    fn test_threshold_straddle_takes_narrower_margin() {
        let shape = ThresholdShape::new(100.0, inset(10.0, 0.0), inset(0.0, 7.0));
        assert_eq!(shape.left_inset(95.0, 105.0), 10.0);
        assert_eq!(shape.right_inset(95.0, 105.0), 7.0);
    }

    #[test]
    fn test_threshold_keeps_negative_insets() {
        let shape = ThresholdShape::new(50.0, inset(-4.0, 0.0), inset(-8.0, 0.0));
        assert_eq!(shape.left_inset(0.0, 10.0), -4.0);
        assert_eq!(shape.left_inset(45.0, 55.0), -4.0);
        assert_eq!(shape.left_inset(60.0, 70.0), -8.0);
    }

    #[test]
    fn test_cup_steps_in_then_out() {
        let shape = CupShape::new(20.0, 40.0, inset(0.0, 0.0), inset(15.0, 15.0));
        assert_eq!(shape.left_inset(0.0, 10.0), 0.0);
        assert_eq!(shape.left_inset(25.0, 35.0), 15.0);
        assert_eq!(shape.right_inset(25.0, 35.0), 15.0);
        assert_eq!(shape.left_inset(50.0, 60.0), 0.0);
        assert_eq!(shape.left_inset(15.0, 25.0), 15.0);
    }

    #[test]
    fn test_merged_takes_elementwise_maximum() {
        let shape = MergedShape::new(inset(3.0, -2.0), inset(1.0, 5.0));
        assert_eq!(shape.left_inset(0.0, 1.0), 3.0);
        assert_eq!(shape.right_inset(0.0, 1.0), 5.0);
    }

    #[test]
    fn test_polygon_span() {
        let square = Polygon::new(vec![(20.0, 0.0), (80.0, 0.0), (80.0, 100.0), (20.0, 100.0)]);
        assert_eq!(square.span_at(50.0), Some((20.0, 80.0)));
        assert_eq!(square.span_at(150.0), None);
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let line = Polygon::new(vec![(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(line.span_at(5.0), None);
    }

    #[test]
    fn test_raster_square() {
        let square = Polygon::new(vec![(20.0, 0.0), (80.0, 0.0), (80.0, 100.0), (20.0, 100.0)]);
        let shape = RasterShape::sample(&square, LayoutRect::new(0.0, 0.0, 100.0, 100.0), 10);
        assert_eq!(shape.left_inset(0.0, 12.0), 20.0);
        assert_eq!(shape.right_inset(50.0, 62.0), 20.0);
    }

    #[test]
    fn test_raster_triangle_widens_downward() {
        let triangle = Polygon::new(vec![(50.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let shape = RasterShape::sample(&triangle, LayoutRect::new(0.0, 0.0, 100.0, 100.0), 10);
        let top = shape.left_inset(0.0, 1.0);
        let middle = shape.left_inset(50.0, 51.0);
        let bottom = shape.left_inset(95.0, 96.0);
        assert!(top > middle && middle > bottom, "{top} {middle} {bottom}");
        assert!((top - 45.0).abs() < 0.1);
        assert!(bottom.abs() < 0.1);
    }

    #[test]
    fn test_raster_band_query_takes_narrowest_band() {
        let triangle = Polygon::new(vec![(50.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let shape = RasterShape::sample(&triangle, LayoutRect::new(0.0, 0.0, 100.0, 100.0), 10);
        let spanning = shape.left_inset(5.0, 45.0);
        assert_eq!(spanning, shape.left_inset(0.0, 1.0));
    }

    #[test]
    fn test_raster_outside_bounds_is_rectangle() {
        let square = Polygon::new(vec![(20.0, 0.0), (80.0, 0.0), (80.0, 100.0), (20.0, 100.0)]);
        let shape = RasterShape::sample(&square, LayoutRect::new(0.0, 0.0, 100.0, 100.0), 10);
        assert_eq!(shape.left_inset(200.0, 210.0), 0.0);
        assert_eq!(shape.right_inset(-30.0, -20.0), 0.0);
    }

    #[test]
    fn test_raster_empty_band_is_closed() {
        let small = Polygon::new(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 40.0), (0.0, 40.0)]);
        let shape = RasterShape::sample(&small, LayoutRect::new(0.0, 0.0, 100.0, 100.0), 10);
        assert_eq!(shape.left_inset(80.0, 85.0), 100.0);
    }

    #[test]
    fn test_sample_edges_at_unit_steps() {
        let shape = ThresholdShape::new(2.0, inset(3.0, 1.0), Arc::new(RectangleShape));
        let samples = sample_edges(&shape, LayoutRect::new(10.0, 0.0, 20.0, 4.0), 1.0);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].left, 13.0);
        assert_eq!(samples[0].right, 29.0);
        assert_eq!(samples[3].left, 10.0);
    }
