//! Procedural path builders. Everything here runs once at scene setup; the
//! animator never touches geometry.

use kurbo::{BezPath, Circle, Point, Rect, RoundedRect, Shape as _};

const TOLERANCE: f64 = 0.1;

pub fn rect(x: f64, y: f64, w: f64, h: f64) -> BezPath {
    Rect::new(x, y, x + w, y + h).to_path(TOLERANCE)
}

pub fn rounded_rect(x: f64, y: f64, w: f64, h: f64, radius: f64) -> BezPath {
    RoundedRect::new(x, y, x + w, y + h, radius).to_path(TOLERANCE)
}

pub fn circle(cx: f64, cy: f64, r: f64) -> BezPath {
    Circle::new((cx, cy), r).to_path(TOLERANCE)
}

/// Annulus: outer circle plus the inner circle with reversed winding, so a
/// non-zero fill leaves the hole open.
pub fn ring(cx: f64, cy: f64, outer_r: f64, inner_r: f64) -> BezPath {
    let mut path = Circle::new((cx, cy), outer_r).to_path(TOLERANCE);
    path.extend(
        Circle::new((cx, cy), inner_r)
            .to_path(TOLERANCE)
            .reverse_subpaths(),
    );
    path
}

/// Centered outline of a rounded rectangle, `stroke_w` wide. Stands in for a
/// stroked rounded rect without needing a stroke pass.
pub fn rounded_rect_ring(x: f64, y: f64, w: f64, h: f64, radius: f64, stroke_w: f64) -> BezPath {
    let half = stroke_w / 2.0;
    let mut path = RoundedRect::new(x - half, y - half, x + w + half, y + h + half, radius + half)
        .to_path(TOLERANCE);
    path.extend(
        RoundedRect::new(
            x + half,
            y + half,
            x + w - half,
            y + h - half,
            (radius - half).max(0.0),
        )
        .to_path(TOLERANCE)
        .reverse_subpaths(),
    );
    path
}

pub fn triangle(a: Point, b: Point, c: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path.line_to(c);
    path.close_path();
    path
}

/// N-point star polygon, first point straight up before `rotation` is applied.
pub fn star(cx: f64, cy: f64, points: u32, outer_r: f64, inner_r: f64, rotation: f64) -> BezPath {
    let mut path = BezPath::new();
    let step = std::f64::consts::PI / f64::from(points);
    let start = -std::f64::consts::FRAC_PI_2 + rotation;
    for k in 0..(2 * points) {
        let r = if k % 2 == 0 { outer_r } else { inner_r };
        let angle = start + f64::from(k) * step;
        let p = Point::new(cx + r * angle.cos(), cy + r * angle.sin());
        if k == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Symmetric mound: a cubic from `(start_x, base_y)` to `(start_x + width, base_y)`
/// with both control points at the apex height.
pub fn hill(start_x: f64, base_y: f64, width: f64, height: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((start_x, base_y));
    path.curve_to(
        (start_x + width / 2.0, base_y - height),
        (start_x + width / 2.0, base_y - height),
        (start_x + width, base_y),
    );
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    #[test]
    fn rect_bbox_matches_inputs() {
        let bbox = rect(2.0, 3.0, 10.0, 4.0).bounding_box();
        assert_eq!(bbox, Rect::new(2.0, 3.0, 12.0, 7.0));
    }

    #[test]
    fn star_stays_within_outer_radius() {
        let bbox = star(0.0, 0.0, 5, 10.0, 5.0, 0.3).bounding_box();
        assert!(bbox.x0 >= -10.0 - 1e-9 && bbox.x1 <= 10.0 + 1e-9);
        assert!(bbox.y0 >= -10.0 - 1e-9 && bbox.y1 <= 10.0 + 1e-9);
        // First point is on the outer radius.
        assert!(bbox.y0 <= -9.0);
    }

    #[test]
    fn ring_has_two_subpaths_with_opposite_winding() {
        let path = ring(0.0, 0.0, 10.0, 6.0);
        let moves = path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
        // Opposite winding cancels: signed area well below a single disc's.
        let area = path.area().abs();
        let outer_area = circle(0.0, 0.0, 10.0).area().abs();
        assert!(area < outer_area);
    }

    #[test]
    fn hill_spans_width_and_rises_toward_apex() {
        let bbox = hill(100.0, 600.0, 400.0, 300.0).bounding_box();
        assert!((bbox.x0 - 100.0).abs() < 1e-9);
        assert!((bbox.x1 - 500.0).abs() < 1e-9);
        assert!((bbox.y1 - 600.0).abs() < 1e-9);
        // Cubic apex reaches 3/4 of the control height.
        assert!(bbox.y0 < 600.0 - 200.0);
    }

    #[test]
    fn triangle_is_closed() {
        let path = triangle(
            Point::new(-50.0, 0.0),
            Point::new(0.0, -60.0),
            Point::new(50.0, 0.0),
        );
        assert!(matches!(
            path.elements().last(),
            Some(kurbo::PathEl::ClosePath)
        ));
    }
}
