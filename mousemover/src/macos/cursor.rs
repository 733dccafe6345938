use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton, EventField};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use crate::core::{CursorPosition, Displacement, ScreenBounds};
use crate::platform::CursorPort;

/// Pointer access through Quartz events.
///
/// Movements are posted as `MouseMoved` events at the HID level rather than
/// warped, so the system treats them as input and resets its idle timer.
pub struct MacOSCursor;

impl MacOSCursor {
    fn event_source(state: CGEventSourceStateID) -> Result<CGEventSource, String> {
        CGEventSource::new(state).map_err(|_| "Failed to create event source".to_string())
    }
}

impl CursorPort for MacOSCursor {
    fn position(&self) -> Result<CursorPosition, String> {
        let source = Self::event_source(CGEventSourceStateID::CombinedSessionState)?;
        let event =
            CGEvent::new(source).map_err(|_| "Failed to create query event".to_string())?;
        let location = event.location();
        Ok(CursorPosition::new(
            location.x.round() as i32,
            location.y.round() as i32,
        ))
    }

    fn move_by(&self, displacement: Displacement) -> Result<(), String> {
        let target = self.position()?.offset(displacement);
        let source = Self::event_source(CGEventSourceStateID::HIDSystemState)?;
        let event = CGEvent::new_mouse_event(
            source,
            CGEventType::MouseMoved,
            CGPoint::new(target.x as f64, target.y as f64),
            CGMouseButton::Left,
        )
        .map_err(|_| "Failed to create mouse moved event".to_string())?;

        event.set_integer_value_field(EventField::MOUSE_EVENT_DELTA_X, displacement.dx as i64);
        event.set_integer_value_field(EventField::MOUSE_EVENT_DELTA_Y, displacement.dy as i64);
        event.post(CGEventTapLocation::HID);

        tracing::debug!(
            "Posted mouse move by ({}, {}) to ({}, {})",
            displacement.dx,
            displacement.dy,
            target.x,
            target.y
        );
        Ok(())
    }

    fn screen_bounds(&self) -> Result<ScreenBounds, String> {
        let bounds = CGDisplay::main().bounds();
        let width = bounds.size.width as i32;
        let height = bounds.size.height as i32;
        if width <= 0 || height <= 0 {
            return Err(format!("Main display reports empty bounds {}x{}", width, height));
        }
        Ok(ScreenBounds::new(width, height))
    }
}

impl Default for MacOSCursor {
    fn default() -> Self {
        Self
    }
}
