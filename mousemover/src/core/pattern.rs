use super::{boundary, CursorPosition, Displacement, ScreenBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Horizontal,
    Vertical,
    Diagonal,
}

impl Pattern {
    pub fn next(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Diagonal,
            Self::Diagonal => Self::Horizontal,
        }
    }
}

/// Current pattern plus the travel direction on each axis (`1` or `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternState {
    pub pattern: Pattern,
    pub direction_x: i32,
    pub direction_y: i32,
}

impl PatternState {
    pub fn flip_x(&mut self) {
        self.direction_x = -self.direction_x;
    }

    pub fn flip_y(&mut self) {
        self.direction_y = -self.direction_y;
    }
}

impl Default for PatternState {
    fn default() -> Self {
        Self {
            pattern: Pattern::Horizontal,
            direction_x: 1,
            direction_y: 1,
        }
    }
}

/// Produces synthetic displacements cycling Horizontal -> Vertical -> Diagonal.
/// Both directions flip each time the cycle wraps, so repeated cycles trace a
/// zig-zag instead of one fixed line.
#[derive(Debug, Clone, Default)]
pub struct PatternGenerator {
    state: PatternState,
}

impl PatternGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> PatternState {
        self.state
    }

    pub fn propose(&self, distance: i32) -> Displacement {
        let PatternState {
            pattern,
            direction_x,
            direction_y,
        } = self.state;
        match pattern {
            Pattern::Horizontal => Displacement::new(direction_x * distance, 0),
            Pattern::Vertical => Displacement::new(0, direction_y * distance),
            Pattern::Diagonal => Displacement::new(direction_x * distance, direction_y * distance),
        }
    }

    pub fn advance(&mut self) {
        self.state.pattern = self.state.pattern.next();
        if self.state.pattern == Pattern::Horizontal {
            self.state.flip_x();
            self.state.flip_y();
        }
    }

    /// Next displacement without any screen edge handling.
    #[cfg(test)]
    pub fn next(&mut self, distance: i32) -> Displacement {
        let displacement = self.propose(distance);
        self.advance();
        displacement
    }

    /// Next displacement, reflected off the screen margins before the
    /// pattern advances.
    pub fn next_within(
        &mut self,
        distance: i32,
        position: CursorPosition,
        bounds: ScreenBounds,
    ) -> Displacement {
        let proposed = self.propose(distance);
        let displacement = boundary::reflect(
            &mut self.state,
            position,
            proposed,
            bounds,
            boundary::BORDER_MARGIN,
            distance,
        );
        self.advance();
        displacement
    }
}
