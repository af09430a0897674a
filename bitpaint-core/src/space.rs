//! # Space
//!
//! Integer 2D geometry. All positions in the document are whole pixels, so [`Vector2`] is integral.
//! Floating point only appears transiently, for projections in [`Vector2::snap_to`].

/// Bresenham lines are cut off after this many pixels.
const RASTER_LINE_LIMIT: usize = 10_000;

/// An immutable pixel position or displacement.
///
/// Serialized compactly as `[x, y]`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}
impl From<[i32; 2]> for Vector2 {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}
impl From<Vector2> for [i32; 2] {
    fn from(value: Vector2) -> Self {
        [value.x, value.y]
    }
}
impl std::fmt::Debug for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
impl std::ops::Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl std::ops::Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}
impl std::ops::Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Shorthand constructor, `v(1, 2)`.
#[must_use]
pub const fn v(x: i32, y: i32) -> Vector2 {
    Vector2::new(x, y)
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0, 0);
    pub const ONE: Self = Self::new(1, 1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    #[must_use]
    pub fn scale(self, s: i32) -> Self {
        Self::new(self.x * s, self.y * s)
    }
    #[must_use]
    pub fn dot(self, other: Self) -> i64 {
        i64::from(self.x) * i64::from(other.x) + i64::from(self.y) * i64::from(other.y)
    }
    #[must_use]
    pub fn magnitude(self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }
    /// Unit vector in the same direction. NaN components for the zero vector.
    #[must_use]
    pub fn normalized(self) -> [f64; 2] {
        let m = self.magnitude();
        [f64::from(self.x) / m, f64::from(self.y) / m]
    }
    /// Treat `self` as a line through `(0, 0)` and find the perpendicular distance from it to `p`.
    ///
    /// `D = |p - (p.n)n|` where `n` is `self` normalized.
    #[must_use]
    pub fn perpendicular_distance(self, p: Self) -> f64 {
        let [nx, ny] = self.normalized();
        let (px, py) = (f64::from(p.x), f64::from(p.y));
        let along = px * nx + py * ny;
        (px - nx * along).hypot(py - ny * along)
    }
    /// Ordered, inclusive Bresenham raster path from `self` to `to`.
    #[must_use]
    pub fn raster_line(self, to: Self) -> Vec<Self> {
        // Wide enough that no coordinate pair can overflow.
        let dx = (i64::from(to.x) - i64::from(self.x)).abs();
        let dy = (i64::from(to.y) - i64::from(self.y)).abs();
        let sx = if self.x < to.x { 1 } else { -1 };
        let sy = if self.y < to.y { 1 } else { -1 };

        let len = usize::try_from(dx.max(dy)).unwrap_or(usize::MAX);
        let mut line = Vec::with_capacity(len.saturating_add(1).min(RASTER_LINE_LIMIT));
        let mut err = dx - dy;
        let mut cur = self;
        for _ in 0..RASTER_LINE_LIMIT {
            line.push(cur);
            if cur == to {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                cur.x += sx;
            }
            if e2 < dx {
                err += dx;
                cur.y += sy;
            }
        }
        line
    }
    /// Project onto the closest of `lines` (each a line through the origin), keeping roughly the same
    /// magnitude and the signs of `self`. Result is snapped to whole pixels.
    ///
    /// Lines only need defining in the `+x` half plane, as they extend through the origin anyway.
    /// For diagonal lines the x/y ratio of the line is kept exactly, so "spare" pixels of a raster
    /// land at the end of the line rather than the start.
    ///
    /// Returns `None` if `lines` is empty.
    #[must_use]
    pub fn snap_to(self, lines: &[Self]) -> Option<Self> {
        let mut closest = *lines.first()?;
        let mut shortest = f64::INFINITY;
        for line in lines {
            let distance = line.perpendicular_distance(self);
            if distance < shortest {
                closest = *line;
                shortest = distance;
            }
        }
        let magnitude = self.magnitude();
        let [nx, ny] = closest.normalized();
        let (mut px, mut py) = ((nx * magnitude).round(), (ny * magnitude).round());

        if closest.x != 0 && closest.y != 0 {
            if closest.y.abs() > closest.x.abs() {
                let ratio = f64::from(closest.y) / f64::from(closest.x);
                py = (px * ratio).round();
            } else {
                let ratio = f64::from(closest.x) / f64::from(closest.y);
                px = (py * ratio).round();
            }
        }

        // `as` saturates, which is fine for pixel coordinates.
        let (px, py) = (px.abs() as i32, py.abs() as i32);
        Some(Self::new(
            if self.x >= 0 { px } else { -px },
            if self.y >= 0 { py } else { -py },
        ))
    }
}

/// An axis aligned box, inclusive on both ends.
///
/// `from <= to` is *not* guaranteed. Degenerate boxes must be tolerated by consumers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[Vector2; 2]", into = "[Vector2; 2]")]
pub struct Bounds {
    pub from: Vector2,
    pub to: Vector2,
}
impl From<[Vector2; 2]> for Bounds {
    fn from([from, to]: [Vector2; 2]) -> Self {
        Self { from, to }
    }
}
impl From<Bounds> for [Vector2; 2] {
    fn from(value: Bounds) -> Self {
        [value.from, value.to]
    }
}
impl Bounds {
    /// The 1x1 box at the origin, used as the bounds of empty shapes.
    pub const ZERO: Self = Self::new(Vector2::ZERO, Vector2::ZERO);

    #[must_use]
    pub const fn new(from: Vector2, to: Vector2) -> Self {
        Self { from, to }
    }
    /// Number of cells spanned on each axis. Always at least one.
    #[must_use]
    pub fn size(&self) -> Vector2 {
        Vector2::new(
            (self.to.x - self.from.x).abs() + 1,
            (self.to.y - self.from.y).abs() + 1,
        )
    }
    #[must_use]
    pub fn contains(&self, pos: Vector2) -> bool {
        pos.x >= self.from.x && pos.x <= self.to.x && pos.y >= self.from.y && pos.y <= self.to.y
    }
    /// Erode by one pixel on every side. May produce a degenerate box.
    #[must_use]
    pub fn shrink(&self) -> Self {
        Self::new(self.from + Vector2::ONE, self.to - Vector2::ONE)
    }
    /// Smallest box covering both.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        Self::new(
            Vector2::new(self.from.x.min(other.from.x), self.from.y.min(other.from.y)),
            Vector2::new(self.to.x.max(other.to.x), self.to.y.max(other.to.y)),
        )
    }
    #[must_use]
    pub fn translate(&self, offset: Vector2) -> Self {
        Self::new(self.from + offset, self.to + offset)
    }
    /// Tight bounds of a set of positions, or `None` if there are none.
    pub fn of_points(points: impl IntoIterator<Item = Vector2>) -> Option<Self> {
        points.into_iter().fold(None, |bounds: Option<Self>, pos| {
            let point = Self::new(pos, pos);
            Some(match bounds {
                Some(bounds) => bounds.combine(&point),
                None => point,
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn arithmetic() {
        assert_eq!(v(1, 1) + v(-2, 1), v(-1, 2));
        assert_eq!(v(1, 1) - v(-2, 1), v(3, 0));
        assert_eq!(v(1, 2).scale(3), v(3, 6));
        assert_eq!(v(2, 1).dot(v(1, 3)), 5);
        assert_eq!(v(1, 0).dot(v(0, 1)), 0);
        assert_eq!(v(1, 2).to_string(), "(1, 2)");
    }
    #[test]
    fn normalize() {
        assert_eq!(v(1, 0).normalized(), [1.0, 0.0]);
        let [x, y] = v(1, 1).normalized();
        assert!((x - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert!((y - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }
    #[test]
    fn perpendicular() {
        assert!((v(1, 0).perpendicular_distance(v(1, 1)) - 1.0).abs() < 1e-10);
        assert!((v(1, 0).perpendicular_distance(v(0, 10)) - 10.0).abs() < 1e-10);
        assert!(v(1, 1).perpendicular_distance(v(1, 1)).abs() < 1e-10);
        assert!((v(-1, 1).perpendicular_distance(v(1, 1)) - 2f64.sqrt()).abs() < 1e-10);
    }
    #[test]
    fn raster_diagonal() {
        assert_eq!(
            v(0, 0).raster_line(v(4, 4)),
            vec![v(0, 0), v(1, 1), v(2, 2), v(3, 3), v(4, 4)]
        );
    }
    #[test]
    fn raster_extremes_are_cut_off() {
        let line = v(i32::MIN, i32::MIN).raster_line(v(i32::MAX, i32::MAX));
        assert_eq!(line.len(), RASTER_LINE_LIMIT);
        assert_eq!(line[1], v(i32::MIN + 1, i32::MIN + 1));
        let line = v(i32::MAX, 0).raster_line(v(i32::MIN, 0));
        assert_eq!(line.len(), RASTER_LINE_LIMIT);
        assert_eq!(line[1], v(i32::MAX - 1, 0));
    }
    #[test]
    fn raster_straight() {
        assert_eq!(
            v(0, 1).raster_line(v(4, 1)),
            vec![v(0, 1), v(1, 1), v(2, 1), v(3, 1), v(4, 1)]
        );
        assert_eq!(v(2, 2).raster_line(v(2, 2)), vec![v(2, 2)]);
    }
    #[test]
    fn raster_isometric() {
        assert_eq!(
            v(0, 0).raster_line(v(5, -2)),
            vec![v(0, 0), v(1, 0), v(2, -1), v(3, -1), v(4, -2), v(5, -2)]
        );
    }
    #[test]
    fn raster_snapped_isometric_puts_spare_pixel_last() {
        let to = v(5, 3).snap_to(&[v(2, 1)]).unwrap();
        assert_eq!(to, v(6, 3));
        assert_eq!(
            v(0, 0).raster_line(to),
            vec![v(0, 0), v(1, 0), v(2, 1), v(3, 1), v(4, 2), v(5, 2), v(6, 3)]
        );
    }
    #[test]
    fn snap_to_axes() {
        let axes = [v(1, 0), v(0, 1)];
        assert_eq!(v(2, 1).snap_to(&axes), Some(v(2, 0)));
        assert_eq!(v(1, 2).snap_to(&axes), Some(v(0, 2)));
        assert_eq!(v(-1, 2).snap_to(&axes), Some(v(0, 2)));
        assert_eq!(v(-2, 1).snap_to(&axes), Some(v(-2, 0)));
        assert_eq!(v(-2, -1).snap_to(&axes), Some(v(-2, 0)));
        assert_eq!(v(1, -2).snap_to(&axes), Some(v(0, -2)));
        assert_eq!(v(1, -2).snap_to(&[]), None);
    }
    #[test]
    fn bounds() {
        let b = Bounds::new(v(1, 1), v(3, 4));
        assert_eq!(b.size(), v(3, 4));
        assert!(b.contains(v(1, 1)));
        assert!(b.contains(v(3, 4)));
        assert!(!b.contains(v(0, 1)));
        assert_eq!(b.shrink(), Bounds::new(v(2, 2), v(2, 3)));
        assert_eq!(
            b.combine(&Bounds::new(v(-1, 2), v(2, 6))),
            Bounds::new(v(-1, 1), v(3, 6))
        );
        assert_eq!(
            Bounds::of_points([v(2, 0), v(-1, 3)]),
            Some(Bounds::new(v(-1, 0), v(2, 3)))
        );
        assert_eq!(Bounds::of_points([]), None);
    }
    #[test]
    fn degenerate_bounds_contain_nothing() {
        let b = Bounds::new(v(1, 1), v(0, 0));
        assert!(!b.contains(v(0, 0)));
        assert!(!b.contains(v(1, 1)));
        assert_eq!(b.size(), v(2, 2));
    }
    #[test]
    fn serializes_compactly() {
        assert_eq!(serde_json::to_string(&v(2, -6)).unwrap(), "[2,-6]");
        let back: Vector2 = serde_json::from_str("[2,-6]").unwrap();
        assert_eq!(back, v(2, -6));
    }
}
