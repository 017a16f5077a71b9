//! Core value types shared across modules

/// Integer coordinate in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a display in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// One monitor as reported by the windowing system
/// Immutable once parsed; a layout change produces a new list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub name: String,
    pub size: Dimensions,
    /// Top-left corner in the virtual screen
    pub offset: Point,
    pub primary: bool,
}

impl Display {
    pub fn left(&self) -> i32 {
        self.offset.x
    }

    pub fn right(&self) -> i32 {
        self.offset.x + self.size.width
    }

    pub fn top(&self) -> i32 {
        self.offset.y
    }

    pub fn bottom(&self) -> i32 {
        self.offset.y + self.size.height
    }
}
