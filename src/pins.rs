//! GPIO pin assignments for the GarageWatch board.
//!
//! Single source of truth; `main` builds its pin drivers from these
//! numbers rather than hard-coding them.

// ---------------------------------------------------------------------------
// Door sensor (IR break-beam or reed switch)
// ---------------------------------------------------------------------------

/// Digital input with internal pull-up.  LOW = door open, HIGH = closed.
pub const DOOR_SENSOR_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Door opener relay
// ---------------------------------------------------------------------------

/// Digital output to the relay module input (active LOW).  Rests HIGH;
/// see `drivers::relay`.
pub const RELAY_GPIO: i32 = 18;
