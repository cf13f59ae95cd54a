/// A closed range of ray parameters or coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Ray parameters strictly in front of `t_min`, up to (excluding) infinity.
    pub const fn ahead_of(t_min: f32) -> Self {
        Self::new(t_min, f32::INFINITY)
    }

    /// `min <= x <= max`. Always false for NaN.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// `min < x < max`.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// A single value: nothing to split along.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}
