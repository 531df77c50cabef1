use crate::{
    foundation::core::{Canvas, Point},
    model::Position,
};

/// Distance kept between corner-anchored text and the canvas edges.
pub const EDGE_PADDING: f64 = 40.0;

/// Point the text run is centered on.
///
/// `font_size` stands in for the text height; no ascender/descender metrics are consulted.
pub fn anchor_point(position: Position, canvas: Canvas, text_width: f64, font_size: f64) -> Point {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let half_w = text_width / 2.0;
    let half_h = font_size / 2.0;

    let left = half_w + EDGE_PADDING;
    let right = w - half_w - EDGE_PADDING;
    let top = half_h + EDGE_PADDING;
    let bottom = h - half_h - EDGE_PADDING;

    match position {
        Position::Center => canvas.center(),
        Position::TopLeft => Point::new(left, top),
        Position::TopRight => Point::new(right, top),
        Position::BottomLeft => Point::new(left, bottom),
        Position::BottomRight => Point::new(right, bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas {
        width: 800,
        height: 600,
    };

    #[test]
    fn bottom_right_reference_case() {
        let p = anchor_point(Position::BottomRight, CANVAS, 100.0, 48.0);
        assert_eq!(p, Point::new(710.0, 536.0));
    }

    #[test]
    fn corners_mirror_each_other() {
        assert_eq!(
            anchor_point(Position::TopLeft, CANVAS, 100.0, 48.0),
            Point::new(90.0, 64.0)
        );
        assert_eq!(
            anchor_point(Position::TopRight, CANVAS, 100.0, 48.0),
            Point::new(710.0, 64.0)
        );
        assert_eq!(
            anchor_point(Position::BottomLeft, CANVAS, 100.0, 48.0),
            Point::new(90.0, 536.0)
        );
    }

    #[test]
    fn center_ignores_text_metrics() {
        for width in [0.0, 10.0, 5000.0] {
            assert_eq!(
                anchor_point(Position::Center, CANVAS, width, 300.0),
                Point::new(400.0, 300.0)
            );
        }
    }

    #[test]
    fn oversized_text_is_not_clamped() {
        let p = anchor_point(Position::TopLeft, Canvas { width: 50, height: 50 }, 400.0, 48.0);
        assert_eq!(p, Point::new(240.0, 64.0));
    }
}
