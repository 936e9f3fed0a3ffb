//! Minimal 2D/3D point geometry: no spatial-index internals (spec.md Non-goals),
//! just the segment math the restriction engine (§4.4) needs — intersection of
//! two 2D segments, Liang-Barsky 3D line clipping against an axis-aligned box,
//! and linear interpolation along a segment.

use std::fmt;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x, self.y)
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT Z({} {} {})", self.x, self.y, self.z)
    }
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation at fraction `t` in [0, 1] between `self` and `other`.
    pub fn lerp(&self, other: &Point2D, t: f64) -> Point2D {
        Point2D::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3D { x, y, z }
    }

    pub fn lerp(&self, other: &Point3D, t: f64) -> Point3D {
        Point3D::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Axis-aligned 2D bounding box, used for the per-segment overlap pruning that
/// precedes the exact 2D segment-intersection predicate (§4.4.1 step 2).
#[derive(Debug, Clone, Copy)]
pub struct Bbox2D {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Bbox2D {
    pub fn of_segment(a: Point2D, b: Point2D) -> Self {
        Bbox2D {
            xmin: a.x.min(b.x),
            ymin: a.y.min(b.y),
            xmax: a.x.max(b.x),
            ymax: a.y.max(b.y),
        }
    }

    pub fn overlaps(&self, other: &Bbox2D) -> bool {
        self.xmin <= other.xmax && other.xmin <= self.xmax && self.ymin <= other.ymax && other.ymin <= self.ymax
    }
}

/// Axis-aligned 3D box used by STBox restriction (§4.4.2).
#[derive(Debug, Clone, Copy)]
pub struct Box3D {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
}

impl Box3D {
    pub fn contains_point(&self, p: Point3D, border_inc: bool) -> bool {
        let within = |v: f64, lo: f64, hi: f64| {
            if border_inc {
                v >= lo - EPS && v <= hi + EPS
            } else {
                v > lo + EPS && v < hi - EPS
            }
        };
        within(p.x, self.xmin, self.xmax) && within(p.y, self.ymin, self.ymax) && within(p.z, self.zmin, self.zmax)
    }
}

/// Result of intersecting two 2D segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    None,
    /// A single point, at parametric fraction `t` along the first segment.
    Point { at: Point2D, t: f64 },
    /// The segments are collinear and overlap on a sub-range.
    Overlap { t0: f64, t1: f64 },
}

/// Exact 2D segment-segment intersection via the standard parametric form
/// (used both by the simple-decomposition self-intersection check of
/// §4.4.1 step 2 and by the lifting engine's `segment_intersect_fn`, §4.3).
pub fn segment_intersection(p1: Point2D, p2: Point2D, p3: Point2D, p4: Point2D) -> SegmentIntersection {
    let d1x = p2.x - p1.x;
    let d1y = p2.y - p1.y;
    let d2x = p4.x - p3.x;
    let d2y = p4.y - p3.y;

    let denom = d1x * d2y - d1y * d2x;

    if denom.abs() < EPS {
        // Parallel or collinear. Check collinearity via cross product of p3-p1 with d1.
        let cross = (p3.x - p1.x) * d1y - (p3.y - p1.y) * d1x;
        if cross.abs() > EPS {
            return SegmentIntersection::None;
        }
        // Collinear: project onto the dominant axis to find overlap.
        let (proj, len) = if d1x.abs() > d1y.abs() { (d1x, d1x) } else { (d1y, d1y) };
        if len.abs() < EPS {
            return SegmentIntersection::None;
        }
        let t_of = |p: Point2D| -> f64 {
            if d1x.abs() > d1y.abs() {
                (p.x - p1.x) / proj
            } else {
                (p.y - p1.y) / proj
            }
        };
        let (mut t0, mut t1) = (t_of(p3), t_of(p4));
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        let lo = t0.max(0.0);
        let hi = t1.min(1.0);
        if lo > hi + EPS {
            return SegmentIntersection::None;
        }
        return SegmentIntersection::Overlap { t0: lo, t1: hi };
    }

    let t = ((p3.x - p1.x) * d2y - (p3.y - p1.y) * d2x) / denom;
    let u = ((p3.x - p1.x) * d1y - (p3.y - p1.y) * d1x) / denom;

    if (-EPS..=1.0 + EPS).contains(&t) && (-EPS..=1.0 + EPS).contains(&u) {
        let at = Point2D::new(p1.x + t * d1x, p1.y + t * d1y);
        SegmentIntersection::Point { at, t: t.clamp(0.0, 1.0) }
    } else {
        SegmentIntersection::None
    }
}

/// Liang-Barsky 3D line clipping (§4.4.2): clip the segment `p0 -> p1` against
/// an axis-aligned box, returning the entry/exit parametric fractions `[t0, t1]`
/// if the segment intersects the box's interior (or boundary, with `border_inc`).
pub fn liang_barsky_clip_3d(p0: Point3D, p1: Point3D, bbox: Box3D, border_inc: bool) -> Option<(f64, f64)> {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let dz = p1.z - p0.z;

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    let checks = [
        (-dx, p0.x - bbox.xmin),
        (dx, bbox.xmax - p0.x),
        (-dy, p0.y - bbox.ymin),
        (dy, bbox.ymax - p0.y),
        (-dz, p0.z - bbox.zmin),
        (dz, bbox.zmax - p0.z),
    ];

    for (p, q) in checks {
        if p.abs() < EPS {
            // Segment is parallel to this pair of planes.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
            }
        }
    }

    if t0 > t1 {
        return None;
    }
    if !border_inc && (t0 - t1).abs() < EPS {
        // Degenerate touch at a single boundary point is excluded when border_inc=false.
        return None;
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_intersect_at_midpoint() {
        let r = segment_intersection(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0), Point2D::new(0.0, 10.0), Point2D::new(10.0, 0.0));
        match r {
            SegmentIntersection::Point { at, t } => {
                assert!((at.x - 5.0).abs() < 1e-6);
                assert!((at.y - 5.0).abs() < 1e-6);
                assert!((t - 0.5).abs() < 1e-6);
            }
            _ => panic!("expected a point intersection"),
        }
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let r = segment_intersection(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(0.0, 1.0), Point2D::new(10.0, 1.0));
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn liang_barsky_clips_diagonal_through_box() {
        let p0 = Point3D::new(0.0, 0.0, 0.0);
        let p1 = Point3D::new(10.0, 10.0, 0.0);
        let bbox = Box3D { xmin: 2.0, ymin: 2.0, zmin: -1.0, xmax: 8.0, ymax: 8.0, zmax: 1.0 };
        let (t0, t1) = liang_barsky_clip_3d(p0, p1, bbox, true).unwrap();
        assert!((t0 - 0.2).abs() < 1e-6);
        assert!((t1 - 0.8).abs() < 1e-6);
    }

    #[test]
    fn liang_barsky_misses_box_entirely() {
        let p0 = Point3D::new(0.0, 0.0, 0.0);
        let p1 = Point3D::new(1.0, 1.0, 0.0);
        let bbox = Box3D { xmin: 5.0, ymin: 5.0, zmin: -1.0, xmax: 8.0, ymax: 8.0, zmax: 1.0 };
        assert!(liang_barsky_clip_3d(p0, p1, bbox, true).is_none());
    }
}
