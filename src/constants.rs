use std::f32::consts::FRAC_PI_2;

pub const EPSILON: f32 = 0.00001;

/// Ray parameter returned for "no intersection". Anything below zero is a miss.
pub const NO_HIT: f32 = -1.0;

pub const AMBIENT: f32 = 0.07;
pub const SHININESS: f32 = 80.0;
pub const LIGHT_INTENSITY: f32 = 40.0;

/// Shadow rays start this far out along the surface normal.
pub const SHADOW_BIAS: f32 = 0.1;

pub const FRAMES_PER_SECOND: f32 = 60.0;
pub const TIME_OFFSET: f32 = 19.0;

pub const FIELD_OF_VIEW: f32 = FRAC_PI_2;
