use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    OutOfBounds { x: i32, y: i32 },
    NotTrack { x: i32, y: i32 },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfBounds { x, y } => write!(f, "cell ({x}, {y}) is outside the grid"),
            EditError::NotTrack { x, y } => write!(f, "cell ({x}, {y}) holds no minecart track"),
        }
    }
}

impl std::error::Error for EditError {}
