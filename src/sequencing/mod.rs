// Purpose: the two memoized stages between control values and step data.
// Each stage is a pure function plus a cache keyed on that function's inputs.

pub mod filter;
pub mod ramp;

pub use filter::{FilterType, MaskCache, MaskKey, StepMask};
pub use ramp::{Ramp, RampCache, RampKey};
