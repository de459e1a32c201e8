//! 2D scalar field storage and transforms
//!
//! The generation pipeline passes heightfields between stages by value; each
//! numeric transform consumes the field and returns a new one, so the stages
//! (redistribute, scale, terrace, clamp, normalize) stay independently
//! testable.

/// A width × height grid of f64 values.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    pub width: usize,
    pub height: usize,
    data: Vec<f64>,
}

impl Heightfield {
    pub fn new(width: usize, height: usize) -> Self {
        Heightfield {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap an existing row-major buffer. Length must be width × height.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), width * height, "buffer does not match dimensions");
        Heightfield { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Read with coordinates clamped to the grid, so border cells can ask
    /// about out-of-range neighbors.
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(cx, cy)
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, &val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        for v in &mut self.data {
            *v = f(*v);
        }
        self
    }

    // ------------------------------------------------------------------
    // Transform pipeline
    // ------------------------------------------------------------------

    /// Raise every value to `exponent`, pushing mid values toward the floor
    /// for exponents above one.
    pub fn redistribute(self, exponent: f64) -> Self {
        self.map(|v| v.powf(exponent))
    }

    /// Multiply every value by a constant (the linear height scale).
    pub fn scale(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Quantize values into `steps` flat levels.
    pub fn terrace(self, steps: f64) -> Self {
        self.map(|v| (v * steps).floor() / steps)
    }

    pub fn raise_floor(self, level: f64) -> Self {
        self.map(|v| v.max(level))
    }

    pub fn lower_ceiling(self, level: f64) -> Self {
        self.map(|v| v.min(level))
    }

    /// Rescale linearly so the minimum maps to 0.0 and the maximum to 1.0.
    /// A constant field maps to all zeros.
    pub fn normalized(self) -> Self {
        let min = self.min_value();
        let max = self.max_value();
        let span = max - min;
        if span == 0.0 {
            return self.map(|_| 0.0);
        }
        self.map(move |v| (v - min) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut field = Heightfield::new(4, 3);
        field.set(3, 2, 1.5);
        assert_eq!(field.get(3, 2), 1.5);
        assert_eq!(field.get(0, 0), 0.0);
    }

    #[test]
    fn test_clamped_reads() {
        let mut field = Heightfield::new(2, 2);
        field.set(0, 0, 1.0);
        field.set(1, 1, 4.0);
        assert_eq!(field.get_clamped(-1, 0), 1.0);
        assert_eq!(field.get_clamped(-5, -5), 1.0);
        assert_eq!(field.get_clamped(2, 1), 4.0);
        assert_eq!(field.get_clamped(1, 7), 4.0);
    }

    #[test]
    fn test_redistribute_and_scale() {
        let field = Heightfield::from_vec(2, 1, vec![0.5, 1.0]);
        let field = field.redistribute(2.0).scale(10.0);
        assert!((field.get(0, 0) - 2.5).abs() < 1e-12);
        assert!((field.get(1, 0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_terrace() {
        let field = Heightfield::from_vec(3, 1, vec![0.12, 0.55, 0.99]);
        let field = field.terrace(4.0);
        assert_eq!(field.get(0, 0), 0.0);
        assert_eq!(field.get(1, 0), 0.5);
        assert_eq!(field.get(2, 0), 0.75);
    }

    #[test]
    fn test_normalized() {
        let field = Heightfield::from_vec(3, 1, vec![2.0, 3.0, 4.0]).normalized();
        assert_eq!(field.get(0, 0), 0.0);
        assert_eq!(field.get(1, 0), 0.5);
        assert_eq!(field.get(2, 0), 1.0);

        let flat = Heightfield::from_vec(2, 1, vec![7.0, 7.0]).normalized();
        assert_eq!(flat.get(0, 0), 0.0);
        assert_eq!(flat.get(1, 0), 0.0);
    }

    #[test]
    fn test_floor_and_ceiling() {
        let field = Heightfield::from_vec(3, 1, vec![0.1, 0.5, 0.9])
            .raise_floor(0.25)
            .lower_ceiling(0.75);
        assert_eq!(field.get(0, 0), 0.25);
        assert_eq!(field.get(1, 0), 0.5);
        assert_eq!(field.get(2, 0), 0.75);
    }
}
