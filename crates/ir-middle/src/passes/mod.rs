//! Built-in middle-stage passes

mod add_mean_scale_values;
mod markers;
mod scale_input;

pub use add_mean_scale_values::AddMeanScaleValues;
pub use markers::{MiddleFinish, MiddleStart, PreMiddleStart};
pub use scale_input::ScaleInput;
