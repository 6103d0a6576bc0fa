// Domain layer - Core types with no external dependencies
pub mod point;
pub mod sample;
pub mod segment;

/// Points kept per hour when an hour is simplified ahead of the final pass.
pub const POINTS_PER_HOUR: usize = 60;

/// Hours with this many raw samples or fewer are never pre-simplified.
pub const SIMPLIFY_THRESHOLD: usize = 200;
