//! Pointer input capability
//!
//! The selector polls a [`PointerSource`] once per preview tick. Sources report
//! positions in preview space; converting to absolute coordinates is the
//! selector's job.

use std::collections::VecDeque;

use crate::model::{PointerEvent, PointerEventKind};

/// Source of pointer events for interactive selection
pub trait PointerSource: Send {
    /// Returns the next pointer event
    ///
    /// `Some` with [`PointerEventKind::None`] means nothing happened since the
    /// last poll. `None` means the source is gone (window closed, script
    /// exhausted) and no further events will arrive.
    fn poll(&mut self) -> Option<PointerEvent>;
}

/// Replays a fixed sequence of pointer events
///
/// Once the script runs out the source reports itself closed, unless
/// [`hold_open`](Self::hold_open) was called, in which case it keeps
/// reporting idle events at the last known position.
///
/// # Examples
///
/// ```
/// use frame_hook::{input::{PointerSource, ScriptedPointer}, model::PointerEventKind};
///
/// let mut pointer = ScriptedPointer::clicks(&[(10, 20)]);
/// assert_eq!(pointer.poll().unwrap().kind, PointerEventKind::Press);
/// assert_eq!(pointer.poll().unwrap().kind, PointerEventKind::Release);
/// assert!(pointer.poll().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedPointer {
    events:    VecDeque<PointerEvent>,
    last:      (i32, i32),
    hold_open: bool,
    polled:    usize,
}

impl ScriptedPointer {
    pub fn new(events: impl IntoIterator<Item = PointerEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A press and a release at every given preview position
    pub fn clicks(points: &[(i32, i32)]) -> Self {
        let mut pointer = Self::default();
        for &(x, y) in points {
            pointer.push_click(x, y);
        }
        pointer
    }

    /// Keeps reporting idle events after the script is exhausted
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push_back(event);
    }

    pub fn push_click(&mut self, x: i32, y: i32) {
        self.push(PointerEvent::press(x, y));
        self.push(PointerEvent::release(x, y));
    }

    /// Number of events not yet delivered
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Number of successful polls so far
    pub fn polled(&self) -> usize {
        self.polled
    }
}

impl PointerSource for ScriptedPointer {
    fn poll(&mut self) -> Option<PointerEvent> {
        let event = match self.events.pop_front() {
            Some(event) => event,
            None if self.hold_open => {
                PointerEvent::new(self.last.0, self.last.1, PointerEventKind::None)
            }
            None => return None,
        };

        self.last = (event.x, event.y);
        self.polled += 1;
        Some(event)
    }
}
