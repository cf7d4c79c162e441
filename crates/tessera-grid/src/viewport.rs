/// Half-open rectangle of cell coordinates: `x..x + width`, `y..y + height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Grows every side by `margin` cells.
    #[inline]
    pub fn expand(&self, margin: i32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// Intersects with a `width` x `height` grid anchored at the origin.
    pub fn clamp_to(&self, width: usize, height: usize) -> Self {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.width).min(width as i32);
        let y1 = (self.y + self.height).min(height as i32);
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Row-major cell coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let Viewport {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height.max(0)).flat_map(move |yy| (x..x + width.max(0)).map(move |xx| (xx, yy)))
    }

    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_then_clamp_at_origin() {
        let v = Viewport::new(0, 0, 4, 4).expand(1).clamp_to(10, 10);
        assert_eq!(v, Viewport::new(0, 0, 5, 5));
        let v = Viewport::new(8, 8, 4, 4).expand(1).clamp_to(10, 10);
        assert_eq!(v, Viewport::new(7, 7, 3, 3));
    }

    #[test]
    fn cells_visits_area_in_row_order() {
        let v = Viewport::new(2, 3, 3, 2);
        let cells: Vec<_> = v.cells().collect();
        assert_eq!(cells.len(), v.area());
        assert_eq!(cells[0], (2, 3));
        assert_eq!(cells[3], (2, 4));
        assert!(cells.iter().all(|&(x, y)| v.contains(x, y)));
    }

    #[test]
    fn disjoint_clamp_is_empty() {
        let v = Viewport::new(20, 20, 4, 4).clamp_to(10, 10);
        assert!(v.is_empty());
        assert_eq!(v.cells().count(), 0);
    }
}
