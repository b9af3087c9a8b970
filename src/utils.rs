use std::ops::Add;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[macro_export]
macro_rules! pos {
    ($x:expr, $y:expr) => {
        Pos { x: $x, y: $y }
    };
}

impl Pos {
    /// Wraps both components into `[0, size)`, torus fashion.
    pub fn wrapped(self, size: usize) -> Self {
        let size = size as i32;
        pos!(self.x.rem_euclid(size), self.y.rem_euclid(size))
    }
}

impl Add for Pos {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        pos!(self.x + rhs.x, self.y + rhs.y)
    }
}

#[test]
fn test_wrapped() {
    assert_eq!(pos!(-1, 5).wrapped(5), pos!(4, 0));
    assert_eq!(pos!(3, -7).wrapped(5), pos!(3, 3));
    assert_eq!(pos!(2, 0).wrapped(5), pos!(2, 0));
}
