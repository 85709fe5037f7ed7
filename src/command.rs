use std::fmt;
use std::time::Duration;

use crate::grid::GridCell;

// keep the pointer this far inside the viewport when a coordinate overshoots
const POINTER_SAFETY_BUFFER: i32 = 100;

/// A single device input. Pure data until a `Device` performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MoveTo { x: i32, y: i32 },
    Click,
    KeyTap { key: &'static str },
    KeyHold { key: &'static str, pressed: bool },
    Wait(Duration),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MoveTo { x, y } => write!(f, "move pointer to ({}, {})", x, y),
            Action::Click => write!(f, "click"),
            Action::KeyTap { key } => write!(f, "tap {}", key),
            Action::KeyHold { key, pressed: true } => write!(f, "hold {}", key),
            Action::KeyHold { key, pressed: false } => write!(f, "release {}", key),
            Action::Wait(duration) => write!(f, "wait {}ms", duration.as_millis()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The normalized chat input
    pub text: String,
    /// Votes are grouped by this, so it has to be unique per distinct effect
    pub description: String,
    pub actions: Vec<Action>,
}

impl Command {
    pub fn vote_key(&self) -> &str {
        &self.description
    }
}

/// Geometry of the game window on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            width: 1280,
            height: 720,
            x_offset: 0,
            y_offset: 45,
        }
    }
}

impl Screen {
    /// Pointer move to game-relative pixel coordinates. Coordinates past the
    /// right or bottom edge are pulled back inside the viewport.
    pub fn pointer(&self, mut x: i32, mut y: i32) -> Action {
        if x > self.width {
            x = self.width - POINTER_SAFETY_BUFFER;
        }
        if y > self.height {
            y = self.height - POINTER_SAFETY_BUFFER;
        }

        Action::MoveTo {
            x: x.saturating_add(self.x_offset),
            y: y.saturating_add(self.y_offset),
        }
    }

    pub fn pointer_to_cell(&self, cell: GridCell) -> Action {
        let (x, y) = cell.pixel(self.width, self.height);
        self.pointer(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_applies_window_offset() {
        let screen = Screen::default();
        assert_eq!(screen.pointer(100, 100), Action::MoveTo { x: 100, y: 145 });
    }

    #[test]
    fn pointer_clamps_overshoot() {
        let screen = Screen::default();
        assert_eq!(screen.pointer(5000, 900), Action::MoveTo { x: 1180, y: 665 });
        // the edge itself is still inside
        assert_eq!(screen.pointer(1280, 720), Action::MoveTo { x: 1280, y: 765 });
    }

    #[test]
    fn pointer_saturates_extreme_offsets() {
        let screen = Screen {
            x_offset: i32::MAX,
            y_offset: i32::MIN,
            ..Screen::default()
        };
        assert_eq!(
            screen.pointer(10, -10),
            Action::MoveTo { x: i32::MAX, y: i32::MIN }
        );
    }

    #[test]
    fn pointer_to_cell_uses_board_geometry() {
        let screen = Screen {
            y_offset: 0,
            ..Screen::default()
        };
        let cell = GridCell::new('h', '8').unwrap();
        assert_eq!(screen.pointer_to_cell(cell), Action::MoveTo { x: 640, y: 93 });
    }

    #[test]
    fn actions_describe_themselves() {
        assert_eq!(Action::KeyTap { key: "tab" }.to_string(), "tap tab");
        assert_eq!(
            Action::KeyHold { key: "alt", pressed: false }.to_string(),
            "release alt"
        );
        assert_eq!(Action::Wait(Duration::from_secs(1)).to_string(), "wait 1000ms");
    }
}
