use super::{CursorPosition, Displacement, PatternState, ScreenBounds};

/// Distance in pixels from each screen edge the pointer should stay clear of.
pub const BORDER_MARGIN: i32 = 10;

/// Turns the proposed displacement around on any axis where it would leave
/// the margin band. Axes are checked independently; a flipped direction is
/// written back to `state` and persists for later moves.
///
/// An axis whose proposed component is zero is still checked, so a pointer
/// already inside the margin gets pushed back out on that axis too.
pub fn reflect(
    state: &mut PatternState,
    position: CursorPosition,
    proposed: Displacement,
    bounds: ScreenBounds,
    margin: i32,
    distance: i32,
) -> Displacement {
    let mut displacement = proposed;

    if out_of_band(position.x + displacement.dx, bounds.width, margin) {
        state.flip_x();
        displacement.dx = state.direction_x * distance;
    }

    if out_of_band(position.y + displacement.dy, bounds.height, margin) {
        state.flip_y();
        displacement.dy = state.direction_y * distance;
    }

    displacement
}

fn out_of_band(coordinate: i32, extent: i32, margin: i32) -> bool {
    coordinate < margin || coordinate > extent - margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pattern;

    const BOUNDS: ScreenBounds = ScreenBounds {
        width: 1920,
        height: 1080,
    };

    fn state(direction_x: i32, direction_y: i32) -> PatternState {
        PatternState {
            pattern: Pattern::Diagonal,
            direction_x,
            direction_y,
        }
    }

    #[test]
    fn test_inside_band_is_unchanged() {
        let mut s = state(1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(500, 500),
            Displacement::new(5, 5),
            BOUNDS,
            BORDER_MARGIN,
            5,
        );
        assert_eq!(d, Displacement::new(5, 5));
        assert_eq!(s, state(1, 1));
    }

    #[test]
    fn test_left_edge_flips_x() {
        let mut s = state(-1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(5, 500),
            Displacement::new(-5, 0),
            BOUNDS,
            BORDER_MARGIN,
            5,
        );
        assert_eq!(d, Displacement::new(5, 0));
        assert_eq!(s.direction_x, 1);
    }

    #[test]
    fn test_landing_exactly_on_margin_is_allowed() {
        let mut s = state(1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(5, 500),
            Displacement::new(5, 0),
            BOUNDS,
            BORDER_MARGIN,
            5,
        );
        assert_eq!(d, Displacement::new(5, 0));
        assert_eq!(s.direction_x, 1);
    }

    #[test]
    fn test_right_edge_flips_x() {
        let mut s = state(1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(1908, 500),
            Displacement::new(5, 0),
            BOUNDS,
            BORDER_MARGIN,
            5,
        );
        assert_eq!(d, Displacement::new(-5, 0));
        assert_eq!(s.direction_x, -1);
    }

    #[test]
    fn test_corner_flips_both_axes() {
        let mut s = state(1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(1915, 1075),
            Displacement::new(3, 3),
            BOUNDS,
            BORDER_MARGIN,
            3,
        );
        assert_eq!(d, Displacement::new(-3, -3));
        assert_eq!(s, state(-1, -1));
    }

    #[test]
    fn test_zero_component_inside_margin_is_pushed_out() {
        let mut s = state(1, -1);
        let d = reflect(
            &mut s,
            CursorPosition::new(500, 2),
            Displacement::new(4, 0),
            BOUNDS,
            BORDER_MARGIN,
            4,
        );
        assert_eq!(d, Displacement::new(4, 4));
        assert_eq!(s.direction_y, 1);
    }

    #[test]
    fn test_bottom_edge_flips_y() {
        let mut s = state(1, 1);
        let d = reflect(
            &mut s,
            CursorPosition::new(500, 1068),
            Displacement::new(0, 5),
            BOUNDS,
            BORDER_MARGIN,
            5,
        );
        assert_eq!(d, Displacement::new(0, -5));
        assert_eq!(s.direction_y, -1);
    }
}
