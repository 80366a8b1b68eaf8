use egui::{Pos2, Rect, Vec2};

/// Where the base image sits on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f32,
    /// Top-left corner in canvas coordinates
    pub offset: Vec2,
    /// Scaled image size
    pub size: Vec2,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.offset.to_pos2(), self.size)
    }
}

/// Scale `image` uniformly so it fits entirely inside `canvas`, centered.
pub fn fit_inside(image: Vec2, canvas: Vec2) -> Placement {
    let scale = if image.x > 0.0 && image.y > 0.0 {
        (canvas.x / image.x).min(canvas.y / image.y)
    } else {
        0.0
    };
    let size = image * scale;
    Placement {
        scale,
        offset: (canvas - size) * 0.5,
        size,
    }
}

pub fn point_to_segment_dist(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

/// Even-odd rule.
pub fn point_in_polygon(p: Pos2, points: &[Pos2]) -> bool {
    let mut inside = false;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + n - 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

pub fn bounding_rect(points: &[Pos2]) -> Rect {
    points
        .iter()
        .fold(Rect::NOTHING, |r, p| r.union(Rect::from_min_max(*p, *p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn wide_image_touches_sides_and_centers_vertically() {
        let p = fit_inside(vec2(2000.0, 1000.0), vec2(800.0, 600.0));
        assert!((p.scale - 0.4).abs() < 1e-6);
        assert_eq!(p.size, vec2(800.0, 400.0));
        assert_eq!(p.offset, vec2(0.0, 100.0));
    }

    #[test]
    fn tall_image_touches_top_and_bottom() {
        let p = fit_inside(vec2(300.0, 1200.0), vec2(800.0, 600.0));
        assert!((p.scale - 0.5).abs() < 1e-6);
        assert_eq!(p.size, vec2(150.0, 600.0));
        assert_eq!(p.offset, vec2(325.0, 0.0));
    }

    #[test]
    fn small_image_is_scaled_up() {
        let p = fit_inside(vec2(400.0, 300.0), vec2(800.0, 600.0));
        assert!((p.scale - 2.0).abs() < 1e-6);
        assert_eq!(p.rect(), Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0)));
    }

    #[test]
    fn degenerate_image_has_zero_scale() {
        let p = fit_inside(vec2(0.0, 100.0), vec2(800.0, 600.0));
        assert_eq!(p.scale, 0.0);
        assert_eq!(p.size, Vec2::ZERO);
    }

    #[test]
    fn kite_contains_center_not_corner() {
        let kite = [pos2(50.0, 0.0), pos2(100.0, 50.0), pos2(50.0, 100.0), pos2(0.0, 50.0)];
        assert!(point_in_polygon(pos2(50.0, 50.0), &kite));
        assert!(!point_in_polygon(pos2(5.0, 5.0), &kite));
        assert_eq!(
            bounding_rect(&kite),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0))
        );
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = point_to_segment_dist(pos2(-3.0, 4.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
        let d = point_to_segment_dist(pos2(5.0, 2.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert!((d - 2.0).abs() < 1e-6);
    }
}
