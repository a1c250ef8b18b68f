//! # Virtual Button/Axis Remapping
//!
//! Per-installation tables mapping the abstract control namespace onto a
//! concrete physical layout:
//!
//! - [`ButtonMap`]: virtual button index → physical button index, with an
//!   identity fallback for indices past the configured table and a
//!   negative disabled sentinel.
//! - [`AxisBindings`]: the four logical axes (turn, forward, strafe, look),
//!   each an [`AxisId`] selection plus an invert flag.
//!
//! Both are decoded once from configuration when a backend opens and are
//! immutable for the backend's lifetime, so a poll can never observe a
//! half-edited mapping.

use crate::axis::AxisId;

/// Number of remappable virtual buttons on the primary joystick backend.
pub const PRIMARY_VIRTUAL_BUTTONS: usize = 11;

/// Number of remappable virtual buttons on the multi-controller backend.
pub const CONSOLE_VIRTUAL_BUTTONS: usize = 24;

/// Maps virtual button indices to physical button indices.
///
/// The table length is fixed per backend. Virtual indices beyond the table
/// fall back to the identity mapping rather than failing, so a short or
/// missing configuration still yields a usable layout.
///
/// # Examples
///
/// ```
/// use pad_bridge::mapping::ButtonMap;
///
/// let map = ButtonMap::from_table(&[3, 2, -1]);
/// assert_eq!(map.physical(0), Some(3));
/// assert_eq!(map.physical(2), None);    // disabled sentinel
/// assert_eq!(map.physical(7), Some(7)); // identity fallback
/// ```
#[derive(Debug, Clone)]
pub struct ButtonMap {
    table: Box<[i32]>,
}

impl ButtonMap {
    /// Creates a straight (identity) mapping of the given length.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self {
            table: (0..len as i32).collect(),
        }
    }

    /// Creates a mapping from configured physical indices. Negative
    /// entries disable the corresponding virtual button.
    #[must_use]
    pub fn from_table(table: &[i32]) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Resolves a virtual button index to its physical index.
    ///
    /// Returns `None` when the virtual button is explicitly disabled.
    #[must_use]
    pub fn physical(&self, virtual_index: usize) -> Option<usize> {
        match self.table.get(virtual_index) {
            Some(&entry) if entry < 0 => None,
            Some(&entry) => Some(entry as usize),
            None => Some(virtual_index),
        }
    }

    /// Length of the configured table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when no entries are configured (everything resolves identity).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// One logical axis: a source selection and an invert flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBinding {
    /// Which physical source drives this axis.
    pub id: AxisId,
    /// Negate the resolved value.
    pub invert: bool,
}

impl AxisBinding {
    /// A binding with no source; always reads neutral.
    pub const DISABLED: AxisBinding = AxisBinding {
        id: AxisId::DISABLED,
        invert: false,
    };

    /// Creates a binding from a raw configured axis integer.
    #[must_use]
    pub fn new(raw_axis: i32, invert: bool) -> Self {
        Self {
            id: AxisId::from_raw(raw_axis),
            invert,
        }
    }
}

/// The four logical axes every backend resolves each poll.
#[derive(Debug, Clone, Copy)]
pub struct AxisBindings {
    /// Horizontal movement (primary stick X).
    pub turn: AxisBinding,
    /// Vertical movement (primary stick Y).
    pub forward: AxisBinding,
    /// Sideways movement (secondary stick X).
    pub strafe: AxisBinding,
    /// Looking (secondary stick Y).
    pub look: AxisBinding,
}

impl AxisBindings {
    /// The four bindings in resolution order.
    #[must_use]
    pub fn all(&self) -> [AxisBinding; 4] {
        [self.turn, self.forward, self.strafe, self.look]
    }
}

impl Default for AxisBindings {
    fn default() -> Self {
        Self {
            turn: AxisBinding::DISABLED,
            forward: AxisBinding::DISABLED,
            strafe: AxisBinding::DISABLED,
            look: AxisBinding::DISABLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisKind;

    #[test]
    fn test_identity_map() {
        let map = ButtonMap::identity(PRIMARY_VIRTUAL_BUTTONS);
        assert_eq!(map.len(), PRIMARY_VIRTUAL_BUTTONS);
        for i in 0..PRIMARY_VIRTUAL_BUTTONS {
            assert_eq!(map.physical(i), Some(i));
        }
    }

    #[test]
    fn test_configured_entries() {
        let map = ButtonMap::from_table(&[4, 0, 9]);
        assert_eq!(map.physical(0), Some(4));
        assert_eq!(map.physical(1), Some(0));
        assert_eq!(map.physical(2), Some(9));
    }

    #[test]
    fn test_identity_fallback_past_table() {
        let map = ButtonMap::from_table(&[4, 0]);
        assert_eq!(map.physical(2), Some(2));
        assert_eq!(map.physical(19), Some(19));
    }

    #[test]
    fn test_disabled_sentinel() {
        let map = ButtonMap::from_table(&[-1, 1]);
        assert_eq!(map.physical(0), None);
        assert_eq!(map.physical(1), Some(1));
    }

    #[test]
    fn test_empty_map_is_pure_identity() {
        let map = ButtonMap::from_table(&[]);
        assert!(map.is_empty());
        assert_eq!(map.physical(5), Some(5));
    }

    #[test]
    fn test_axis_binding_decodes_raw() {
        let binding = AxisBinding::new(1, true);
        assert_eq!(binding.id.classify(), AxisKind::Real(1));
        assert!(binding.invert);
    }

    #[test]
    fn test_default_bindings_disabled() {
        let bindings = AxisBindings::default();
        for binding in bindings.all() {
            assert_eq!(binding, AxisBinding::DISABLED);
        }
    }
}
