//! Engine tuning knobs.

use crate::consts::{CREATE_POINTER_OFFSET_PX, MOVE_STEP_PX, RESIZE_STEP_PX};
use crate::geometry::GeometryLimits;

/// Step sizes and geometry floors used by the interaction controller and store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub limits: GeometryLimits,
    /// Keyboard move step when grid snap is off.
    pub move_step: f64,
    /// Keyboard resize step.
    pub resize_step: f64,
    /// How far inside a new note the pointer lands, on both axes.
    pub create_offset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: GeometryLimits::default(),
            move_step: MOVE_STEP_PX,
            resize_step: RESIZE_STEP_PX,
            create_offset: CREATE_POINTER_OFFSET_PX,
        }
    }
}
