//! # Axis Encoding Scheme
//!
//! Defines how a "virtual axis identifier" packs one of three physical
//! source kinds into a single signed integer, matching the integer format
//! stored in configuration files.
//!
//! ## Encoding
//!
//! | Range | Kind | Operands |
//! |-------|------|----------|
//! | `value < 0` | Disabled | none |
//! | `0..0x10000` | Real analog axis | axis index |
//! | `0x10000..0x20000` | Button-pair pseudo-axis | negative button (bits 0-7), positive button (bits 8-15) |
//! | `0x20000..0x30000` | Hat pseudo-axis | hat index (bits 0-7), direction (bits 8-15) |
//!
//! A button-pair pseudo-axis presents two digital buttons as one
//! three-valued axis (pressed-negative, neutral, pressed-positive). A hat
//! pseudo-axis presents one direction pair of an 8-way hat the same way.
//!
//! The encodings never overlap; [`AxisId::classify`] is total over all
//! integers and maps anything outside the table above to
//! [`AxisKind::Disabled`] so that a corrupt configuration value can never
//! drive an out-of-bounds device read.

/// Base of the button-pair pseudo-axis range.
pub const BUTTON_AXIS_BASE: i32 = 0x10000;

/// Base of the hat pseudo-axis range.
pub const HAT_AXIS_BASE: i32 = 0x20000;

/// Mask selecting the encoding range of an axis identifier.
const AXIS_RANGE_MASK: i32 = 0xf0000;

/// Full-scale magnitude of a resolved axis value.
pub const AXIS_FULL_SCALE: i32 = 32767;

/// Hat direction bitmask values, as reported by [`RawPad::hat`].
///
/// Opposite directions are never set simultaneously by a well-formed
/// device; diagonals set two adjacent bits.
///
/// [`RawPad::hat`]: crate::resolve::RawPad::hat
pub mod hat {
    /// No direction pressed.
    pub const CENTERED: u8 = 0x00;
    /// Up direction bit.
    pub const UP: u8 = 0x01;
    /// Right direction bit.
    pub const RIGHT: u8 = 0x02;
    /// Down direction bit.
    pub const DOWN: u8 = 0x04;
    /// Left direction bit.
    pub const LEFT: u8 = 0x08;
}

/// Which direction pair of a hat a hat pseudo-axis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatDirection {
    /// Left/right pair: left is the negative extreme.
    Horizontal,
    /// Up/down pair: up is the negative extreme ("up is negative"
    /// convention shared with the stick axes).
    Vertical,
}

impl HatDirection {
    /// Direction selector codes stored in the packed encoding.
    const HORIZONTAL_CODE: i32 = 1;
    const VERTICAL_CODE: i32 = 2;

    fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::HORIZONTAL_CODE => Some(Self::Horizontal),
            Self::VERTICAL_CODE => Some(Self::Vertical),
            _ => None,
        }
    }

    fn code(self) -> i32 {
        match self {
            Self::Horizontal => Self::HORIZONTAL_CODE,
            Self::Vertical => Self::VERTICAL_CODE,
        }
    }
}

/// The decoded kind of a virtual axis identifier.
///
/// Produced by [`AxisId::classify`]; every identifier decodes to exactly
/// one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// No source bound; always reads neutral.
    Disabled,
    /// A genuine analog axis on the physical device.
    Real(usize),
    /// Two physical buttons acting as the negative and positive extremes.
    ButtonPair {
        /// Physical button index driving the negative extreme.
        neg: usize,
        /// Physical button index driving the positive extreme.
        pos: usize,
    },
    /// One direction pair of a physical hat.
    Hat {
        /// Physical hat index.
        hat: usize,
        /// Which direction pair to read.
        direction: HatDirection,
    },
}

/// Capabilities of an opened device, as fixed at enumeration time.
///
/// Used by [`AxisId::is_valid_for`] to reject configurations that would
/// read past the hardware. Button counts are deliberately absent: buttons
/// are range-checked at read time, not at validation time, because devices
/// may expose more buttons dynamically than were enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCaps {
    /// Number of real analog axes.
    pub axes: usize,
    /// Number of hats.
    pub hats: usize,
}

/// A virtual axis identifier in the packed integer namespace.
///
/// # Examples
///
/// ```
/// use pad_bridge::axis::{AxisId, AxisKind};
///
/// let id = AxisId::button_pair(5, 6);
/// assert_eq!(id.classify(), AxisKind::ButtonPair { neg: 5, pos: 6 });
///
/// // Raw configuration integers round-trip through the same namespace.
/// assert_eq!(AxisId::from_raw(id.raw()), id);
/// assert_eq!(AxisId::from_raw(-1).classify(), AxisKind::Disabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisId(i32);

impl AxisId {
    /// The disabled identifier (no source bound).
    pub const DISABLED: AxisId = AxisId(-1);

    /// Wraps a raw configuration integer. Total: any integer is accepted
    /// and classified later.
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        AxisId(raw)
    }

    /// Returns the raw integer form stored in configuration.
    #[must_use]
    pub fn raw(self) -> i32 {
        self.0
    }

    /// A genuine analog axis.
    #[must_use]
    pub fn real(index: usize) -> Self {
        AxisId(index as i32)
    }

    /// A button-pair pseudo-axis over two physical button indices.
    #[must_use]
    pub fn button_pair(neg: usize, pos: usize) -> Self {
        AxisId(BUTTON_AXIS_BASE | (neg as i32 & 0xff) | ((pos as i32 & 0xff) << 8))
    }

    /// A hat pseudo-axis over one direction pair of a physical hat.
    #[must_use]
    pub fn hat(hat: usize, direction: HatDirection) -> Self {
        AxisId(HAT_AXIS_BASE | (hat as i32 & 0xff) | (direction.code() << 8))
    }

    /// Classifies this identifier into exactly one [`AxisKind`].
    ///
    /// Total over all integers: negative values, values in neither
    /// reserved high range, and hat encodings with an unknown direction
    /// selector all decode to `Disabled` rather than panicking or reading
    /// hardware out of range.
    #[must_use]
    pub fn classify(self) -> AxisKind {
        if self.0 < 0 {
            return AxisKind::Disabled;
        }

        match self.0 & AXIS_RANGE_MASK {
            0 => AxisKind::Real(self.0 as usize),
            BUTTON_AXIS_BASE => AxisKind::ButtonPair {
                neg: (self.0 & 0xff) as usize,
                pos: ((self.0 >> 8) & 0xff) as usize,
            },
            HAT_AXIS_BASE => match HatDirection::from_code((self.0 >> 8) & 0xff) {
                Some(direction) => AxisKind::Hat {
                    hat: (self.0 & 0xff) as usize,
                    direction,
                },
                None => AxisKind::Disabled,
            },
            _ => AxisKind::Disabled,
        }
    }

    /// Checks this identifier against an opened device's capabilities.
    ///
    /// A disabled axis is always valid. A real axis is valid iff its index
    /// is below the device's axis count; a hat axis iff its hat index is
    /// below the hat count. Button-pair axes are always considered valid:
    /// the buttons are range-checked at read time instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::axis::{AxisId, DeviceCaps};
    ///
    /// let caps = DeviceCaps { axes: 2, hats: 0 };
    /// assert!(AxisId::real(1).is_valid_for(caps));
    /// assert!(!AxisId::real(2).is_valid_for(caps));
    /// assert!(AxisId::DISABLED.is_valid_for(caps));
    /// ```
    #[must_use]
    pub fn is_valid_for(self, caps: DeviceCaps) -> bool {
        match self.classify() {
            AxisKind::Disabled => true,
            AxisKind::Real(index) => index < caps.axes,
            AxisKind::ButtonPair { .. } => true,
            AxisKind::Hat { hat, .. } => hat < caps.hats,
        }
    }
}

impl Default for AxisId {
    fn default() -> Self {
        Self::DISABLED
    }
}
