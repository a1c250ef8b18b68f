//! # Shared Input Resolution
//!
//! The one code path both backends use to turn raw device reads into the
//! normalized per-poll values:
//!
//! - [`axis_state`] resolves one configured logical axis: classify the
//!   [`AxisId`](crate::axis::AxisId) encoding, read the matching physical
//!   source, apply the
//!   dead zone (real axes only; button-pair and hat pseudo-axes are
//!   already discrete), apply inversion.
//! - [`buttons_state`] builds the held bitmask over virtual buttons,
//!   excluding any physical button consumed by a configured
//!   button-pair pseudo-axis: a button emulating an axis extreme must
//!   not simultaneously register as a button press.
//!
//! Both functions read through [`RawPad`], the common physical input model
//! (buttons, full-scale analog axes, 8-way hats) that an opened backend
//! exposes. Reads against an absent source return neutral values; absence
//! of a controller is a steady state, not an error.

use crate::axis::{hat, AxisKind, HatDirection, AXIS_FULL_SCALE};
use crate::mapping::{AxisBinding, AxisBindings, ButtonMap};

/// Number of physical buttons folded into the held bitmask each poll.
pub const MAX_POLLED_BUTTONS: usize = 20;

/// Raw button/axis/hat queries against one opened pad.
///
/// Implementations return a best-effort snapshot of current physical
/// state. Out-of-range indices read as neutral (released button, centered
/// axis, centered hat) rather than erroring.
pub trait RawPad {
    /// Current state of one physical button.
    fn button(&self, index: usize) -> bool;

    /// Current value of one real analog axis, scaled to
    /// ±[`AXIS_FULL_SCALE`].
    fn axis(&self, index: usize) -> i32;

    /// Current direction mask of one hat (see [`crate::axis::hat`]).
    fn hat(&self, index: usize) -> u8;
}

/// Resolves one configured logical axis against a pad.
///
/// The dead zone applies to real axes only and is inclusive: a reading
/// with magnitude at or below `dead_zone` is snapped to exactly zero.
///
/// # Examples
///
/// ```
/// use pad_bridge::axis::AxisId;
/// use pad_bridge::mapping::AxisBinding;
/// use pad_bridge::resolve::{axis_state, RawPad};
///
/// struct OneAxis(i32);
/// impl RawPad for OneAxis {
///     fn button(&self, _: usize) -> bool { false }
///     fn axis(&self, index: usize) -> i32 { if index == 0 { self.0 } else { 0 } }
///     fn hat(&self, _: usize) -> u8 { 0 }
/// }
///
/// let binding = AxisBinding::new(0, false);
/// assert_eq!(axis_state(&OneAxis(3000), binding, 10922), 0);
/// assert_eq!(axis_state(&OneAxis(-12000), binding, 10922), -12000);
/// ```
#[must_use]
pub fn axis_state<P: RawPad + ?Sized>(pad: &P, binding: AxisBinding, dead_zone: i32) -> i32 {
    let mut result = match binding.id.classify() {
        AxisKind::Disabled => 0,

        AxisKind::ButtonPair { neg, pos } => {
            let mut value = 0;
            if pad.button(neg) {
                value -= AXIS_FULL_SCALE;
            }
            if pad.button(pos) {
                value += AXIS_FULL_SCALE;
            }
            value
        }

        AxisKind::Hat { hat: index, direction } => {
            let mask = pad.hat(index);
            match direction {
                HatDirection::Horizontal => {
                    if mask & hat::LEFT != 0 {
                        -AXIS_FULL_SCALE
                    } else if mask & hat::RIGHT != 0 {
                        AXIS_FULL_SCALE
                    } else {
                        0
                    }
                }
                HatDirection::Vertical => {
                    if mask & hat::UP != 0 {
                        -AXIS_FULL_SCALE
                    } else if mask & hat::DOWN != 0 {
                        AXIS_FULL_SCALE
                    } else {
                        0
                    }
                }
            }
        }

        AxisKind::Real(index) => {
            let value = pad.axis(index);
            if value.abs() <= dead_zone {
                0
            } else {
                value
            }
        }
    };

    if binding.invert {
        result = -result;
    }

    result
}

/// True when a physical button is consumed by one of the configured
/// button-pair pseudo-axes.
fn is_axis_button(physical: usize, bindings: &AxisBindings) -> bool {
    bindings.all().iter().any(|binding| {
        matches!(
            binding.id.classify(),
            AxisKind::ButtonPair { neg, pos } if physical == neg || physical == pos
        )
    })
}

/// Builds the held bitmask over the virtual button range.
///
/// At least [`MAX_POLLED_BUTTONS`] virtual buttons are polled; a wider
/// remapping table (the multi-controller backend has 24 virtual buttons)
/// widens the range to its length. Each virtual button maps through `map`
/// (identity fallback past the table, disabled sentinel skipped).
/// Physical buttons claimed by a configured button-pair pseudo-axis never
/// appear in the mask.
#[must_use]
pub fn buttons_state<P: RawPad + ?Sized>(pad: &P, map: &ButtonMap, bindings: &AxisBindings) -> u32 {
    let mut result = 0;
    let polled = map.len().max(MAX_POLLED_BUTTONS).min(u32::BITS as usize);

    for virtual_index in 0..polled {
        let Some(physical) = map.physical(virtual_index) else {
            continue;
        };

        if is_axis_button(physical, bindings) {
            continue;
        }

        if pad.button(physical) {
            result |= 1 << virtual_index;
        }
    }

    result
}
