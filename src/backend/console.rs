//! # Multi-Controller Driver
//!
//! Merges one built-in primary gamepad and up to four secondary remote
//! peripherals into one combined per-poll state.
//!
//! ## Merge Model
//!
//! Every poll starts from a neutral accumulator. The primary gamepad is
//! read first and unconditionally; the four secondary channels follow in
//! index order, so output is deterministic for identical physical input.
//! Button contributions OR into one 24-virtual-button mask through each
//! peripheral's physical-to-virtual table; stick contributions add into
//! the shared accumulators (scaled from the normalized ±1.0 float range
//! by [`STICK_SCALE`], vertical axes sign-flipped to the "up is negative"
//! convention) and the combined result is clamped to ±[`STICK_SCALE`].
//! The merged accumulator then acts as a four-axis pad for the shared
//! resolution path, so dead zone, inversion and remapping behave exactly
//! as on the primary joystick backend.
//!
//! ## Secondary Channel Lifecycle
//!
//! Each channel is an explicit state machine: `Connected` (fresh sample
//! cached), `Stale` (serving the cached sample while a bounded countdown
//! of consecutive empty reads runs down; radio links drop samples
//! transiently), `Disconnected` (countdown expired; cache cleared; the
//! channel contributes nothing until a fresh sample arrives). A probe
//! failure feeds the same countdown as an empty read. Nothing in this
//! component is fatal.
//!
//! ## Extension Kinds
//!
//! | Kind | Buttons | Sticks | Analog triggers |
//! |------|---------|--------|-----------------|
//! | Remote | yes | none | none |
//! | Nunchuk | yes (remote table) | one | none |
//! | Classic | yes | two | yes |
//! | Pro | yes | two | yes |

use tracing::debug;

use crate::axis::{hat, AxisId, DeviceCaps};
use crate::config::ConsoleConfig;
use crate::mapping::{AxisBindings, ButtonMap, CONSOLE_VIRTUAL_BUTTONS};
use crate::resolve::{axis_state, buttons_state, RawPad};
use crate::snapshot::PadSnapshot;

use super::PadBackend;

/// Number of secondary controller channels.
pub const SECONDARY_CHANNELS: usize = 4;

/// Full-scale bound of the combined stick accumulators.
pub const STICK_SCALE: i32 = 0x7ff0;

/// Readings with magnitude at or below this are snapped to zero.
pub const CONSOLE_DEAD_ZONE: i32 = 32768 / 10;

/// Normalized trigger travel past which an analog shoulder trigger
/// registers as its digital button.
pub const TRIGGER_THRESHOLD: f32 = 0.25;

/// Raw report bits of the built-in gamepad.
pub mod gamepad {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const X: u32 = 1 << 2;
    pub const Y: u32 = 1 << 3;
    pub const STICK_L: u32 = 1 << 4;
    pub const STICK_R: u32 = 1 << 5;
    pub const L: u32 = 1 << 6;
    pub const R: u32 = 1 << 7;
    pub const ZL: u32 = 1 << 8;
    pub const ZR: u32 = 1 << 9;
    pub const PLUS: u32 = 1 << 10;
    pub const MINUS: u32 = 1 << 11;
    pub const LEFT: u32 = 1 << 12;
    pub const UP: u32 = 1 << 13;
    pub const RIGHT: u32 = 1 << 14;
    pub const DOWN: u32 = 1 << 15;
    pub const EMU_L_LEFT: u32 = 1 << 16;
    pub const EMU_L_UP: u32 = 1 << 17;
    pub const EMU_L_RIGHT: u32 = 1 << 18;
    pub const EMU_L_DOWN: u32 = 1 << 19;
    pub const EMU_R_LEFT: u32 = 1 << 20;
    pub const EMU_R_UP: u32 = 1 << 21;
    pub const EMU_R_RIGHT: u32 = 1 << 22;
    pub const EMU_R_DOWN: u32 = 1 << 23;
}

/// Raw report bits of a bare remote (also used by the nunchuk extension,
/// whose buttons live on the remote itself).
pub mod remote {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const C: u32 = 1 << 2;
    pub const Z: u32 = 1 << 3;
    pub const ONE: u32 = 1 << 4;
    pub const TWO: u32 = 1 << 5;
    pub const PLUS: u32 = 1 << 6;
    pub const MINUS: u32 = 1 << 7;
    pub const LEFT: u32 = 1 << 8;
    pub const UP: u32 = 1 << 9;
    pub const RIGHT: u32 = 1 << 10;
    pub const DOWN: u32 = 1 << 11;
}

/// Raw report bits of a classic-style extension.
pub mod classic {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const X: u32 = 1 << 2;
    pub const Y: u32 = 1 << 3;
    pub const L: u32 = 1 << 4;
    pub const R: u32 = 1 << 5;
    pub const ZL: u32 = 1 << 6;
    pub const ZR: u32 = 1 << 7;
    pub const PLUS: u32 = 1 << 8;
    pub const MINUS: u32 = 1 << 9;
    pub const LEFT: u32 = 1 << 10;
    pub const UP: u32 = 1 << 11;
    pub const RIGHT: u32 = 1 << 12;
    pub const DOWN: u32 = 1 << 13;
}

/// Raw report bits of a pro-style extension.
pub mod pro {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const X: u32 = 1 << 2;
    pub const Y: u32 = 1 << 3;
    pub const STICK_L: u32 = 1 << 4;
    pub const STICK_R: u32 = 1 << 5;
    pub const L: u32 = 1 << 6;
    pub const R: u32 = 1 << 7;
    pub const ZL: u32 = 1 << 8;
    pub const ZR: u32 = 1 << 9;
    pub const PLUS: u32 = 1 << 10;
    pub const MINUS: u32 = 1 << 11;
    pub const LEFT: u32 = 1 << 12;
    pub const UP: u32 = 1 << 13;
    pub const RIGHT: u32 = 1 << 14;
    pub const DOWN: u32 = 1 << 15;
    pub const EMU_L_LEFT: u32 = 1 << 16;
    pub const EMU_L_UP: u32 = 1 << 17;
    pub const EMU_L_RIGHT: u32 = 1 << 18;
    pub const EMU_L_DOWN: u32 = 1 << 19;
    pub const EMU_R_LEFT: u32 = 1 << 20;
    pub const EMU_R_UP: u32 = 1 << 21;
    pub const EMU_R_RIGHT: u32 = 1 << 22;
    pub const EMU_R_DOWN: u32 = 1 << 23;
}

/// Physical-to-virtual tables, indexed by virtual button. Entry `i` is
/// the raw report mask that drives virtual button `i`; zero entries leave
/// the virtual button unmapped for that peripheral.
///
/// Virtual layout: A, B, X, Y, stick clicks, L, R, ZL, ZR, plus, minus,
/// d-pad left/up/right/down, then the eight stick-emulation directions.
const GAMEPAD_BUTTON_MAP: [u32; CONSOLE_VIRTUAL_BUTTONS] = [
    gamepad::A,
    gamepad::B,
    gamepad::X,
    gamepad::Y,
    gamepad::STICK_L,
    gamepad::STICK_R,
    gamepad::L,
    gamepad::R,
    gamepad::ZL,
    gamepad::ZR,
    gamepad::PLUS,
    gamepad::MINUS,
    gamepad::LEFT,
    gamepad::UP,
    gamepad::RIGHT,
    gamepad::DOWN,
    gamepad::EMU_L_LEFT,
    gamepad::EMU_L_UP,
    gamepad::EMU_L_RIGHT,
    gamepad::EMU_L_DOWN,
    gamepad::EMU_R_LEFT,
    gamepad::EMU_R_UP,
    gamepad::EMU_R_RIGHT,
    gamepad::EMU_R_DOWN,
];

const REMOTE_BUTTON_MAP: [u32; 16] = [
    remote::A,
    remote::B,
    remote::Z,
    remote::C,
    0,
    0,
    remote::ONE,
    remote::TWO,
    0,
    0,
    remote::PLUS,
    remote::MINUS,
    remote::LEFT,
    remote::UP,
    remote::RIGHT,
    remote::DOWN,
];

// Virtual L/R read the classic ZL/ZR triggers and vice versa.
const CLASSIC_BUTTON_MAP: [u32; 16] = [
    classic::A,
    classic::B,
    classic::X,
    classic::Y,
    0,
    0,
    classic::ZL,
    classic::ZR,
    classic::L,
    classic::R,
    classic::PLUS,
    classic::MINUS,
    classic::LEFT,
    classic::UP,
    classic::RIGHT,
    classic::DOWN,
];

const PRO_BUTTON_MAP: [u32; CONSOLE_VIRTUAL_BUTTONS] = [
    pro::A,
    pro::B,
    pro::X,
    pro::Y,
    pro::STICK_L,
    pro::STICK_R,
    pro::L,
    pro::R,
    pro::ZL,
    pro::ZR,
    pro::PLUS,
    pro::MINUS,
    pro::LEFT,
    pro::UP,
    pro::RIGHT,
    pro::DOWN,
    pro::EMU_L_LEFT,
    pro::EMU_L_UP,
    pro::EMU_L_RIGHT,
    pro::EMU_L_DOWN,
    pro::EMU_R_LEFT,
    pro::EMU_R_UP,
    pro::EMU_R_RIGHT,
    pro::EMU_R_DOWN,
];

/// What peripheral hardware a secondary channel currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    /// Bare remote: buttons only.
    Remote,
    /// Nunchuk-style extension: remote buttons plus one stick.
    Nunchuk,
    /// Classic-style extension: two sticks and analog shoulder triggers.
    Classic,
    /// Pro-style extension: two sticks and analog shoulder triggers.
    Pro,
}

/// One fresh read of the built-in gamepad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadSample {
    /// Raw held mask (see [`gamepad`]).
    pub held: u32,
    /// Raw pressed-this-poll mask.
    pub pressed: u32,
    /// Left stick, normalized ±1.0, up positive.
    pub left_stick: (f32, f32),
    /// Right stick, normalized ±1.0, up positive.
    pub right_stick: (f32, f32),
}

/// One fresh read of a secondary channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteSample {
    /// Attached peripheral hardware.
    pub extension: ExtensionKind,
    /// Raw held mask in the extension's report layout.
    pub held: u32,
    /// Raw pressed-this-poll mask. Carried by the port contract; edge
    /// detection currently folds in primary gamepad transitions only.
    pub pressed: u32,
    /// Primary stick (nunchuk stick, or classic/pro left stick).
    pub stick: (f32, f32),
    /// Right stick (classic/pro only).
    pub right_stick: (f32, f32),
    /// Analog shoulder trigger travel, 0.0 to 1.0 (classic/pro only).
    pub triggers: (f32, f32),
}

impl RemoteSample {
    /// A buttons-only sample for the given extension kind.
    #[must_use]
    pub fn buttons(extension: ExtensionKind, held: u32) -> Self {
        Self {
            extension,
            held,
            pressed: 0,
            stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
            triggers: (0.0, 0.0),
        }
    }
}

/// The console platform's pad-read API, as an external collaborator.
///
/// All reads are best-effort snapshots: `None` means no fresh sample was
/// available this poll, not a hard failure.
pub trait ConsolePort {
    /// Reads the built-in gamepad.
    fn read_gamepad(&mut self) -> Option<GamepadSample>;

    /// True when a peripheral currently answers on the channel.
    fn probe(&mut self, channel: usize) -> bool;

    /// Reads one secondary channel; `None` when no fresh sample arrived.
    fn read_channel(&mut self, channel: usize) -> Option<RemoteSample>;

    /// Notified when a channel's reconnect window expires.
    fn disconnect(&mut self, channel: usize) {
        let _ = channel;
    }

    /// Releases platform pad resources.
    fn shutdown(&mut self) {}
}

/// Per-channel link state: the reconnect countdown made explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChannelLink {
    /// No peripheral, or the reconnect window expired.
    Disconnected,
    /// Last read returned a fresh sample.
    Connected { last: RemoteSample },
    /// Serving the cached sample while consecutive empty reads count
    /// down toward disconnection.
    Stale { last: RemoteSample, remaining: u8 },
}

impl ChannelLink {
    /// Accepts a fresh sample: cache it and restart the countdown.
    fn fresh(&mut self, sample: RemoteSample) -> RemoteSample {
        *self = ChannelLink::Connected { last: sample };
        sample
    }

    /// Registers an empty read. Returns the sample to substitute this
    /// poll, or `None` once the countdown of `timeout` consecutive empty
    /// reads has expired.
    fn miss(&mut self, timeout: u8) -> Option<RemoteSample> {
        match self {
            ChannelLink::Disconnected => None,
            ChannelLink::Connected { last } => {
                if timeout <= 1 {
                    *self = ChannelLink::Disconnected;
                    None
                } else {
                    let last = *last;
                    *self = ChannelLink::Stale {
                        last,
                        remaining: timeout - 1,
                    };
                    Some(last)
                }
            }
            ChannelLink::Stale { last, remaining } => {
                if *remaining <= 1 {
                    *self = ChannelLink::Disconnected;
                    None
                } else {
                    *remaining -= 1;
                    Some(*last)
                }
            }
        }
    }

    fn is_disconnected(&self) -> bool {
        matches!(self, ChannelLink::Disconnected)
    }
}

/// The combined accumulator one poll builds, acting as a four-axis
/// virtual pad for the shared resolution path.
#[derive(Debug, Default, Clone, Copy)]
struct MergedPad {
    held: u32,
    pressed: u32,
    /// Stick X/Y, right stick X/Y, in axis-index order 0..3.
    sticks: [i32; 4],
}

impl MergedPad {
    /// ORs raw masks into the virtual button space through a table.
    fn apply_table(&mut self, table: &[u32], held: u32, pressed: u32) {
        for (index, &mask) in table.iter().enumerate() {
            if mask == 0 {
                continue;
            }
            if held & mask != 0 {
                self.held |= 1 << index;
            }
            if pressed & mask != 0 {
                self.pressed |= 1 << index;
            }
        }
    }

    /// Adds one stick contribution. Vertical axes flip sign to the
    /// shared "up is negative" convention.
    fn add_stick(&mut self, base: usize, stick: (f32, f32)) {
        self.sticks[base] += (stick.0 * STICK_SCALE as f32) as i32;
        self.sticks[base + 1] -= (stick.1 * STICK_SCALE as f32) as i32;
    }

    fn accumulate_gamepad(&mut self, sample: &GamepadSample) {
        self.apply_table(&GAMEPAD_BUTTON_MAP, sample.held, sample.pressed);
        self.add_stick(0, sample.left_stick);
        self.add_stick(2, sample.right_stick);
    }

    fn accumulate_remote(&mut self, sample: &RemoteSample) {
        // Edge detection folds in primary gamepad transitions only, so
        // secondary pressed masks stay out of the accumulator.
        match sample.extension {
            ExtensionKind::Remote => {
                self.apply_table(&REMOTE_BUTTON_MAP, sample.held, 0);
            }
            ExtensionKind::Nunchuk => {
                self.apply_table(&REMOTE_BUTTON_MAP, sample.held, 0);
                self.add_stick(0, sample.stick);
            }
            ExtensionKind::Classic => {
                let held = sample.held
                    | trigger_mask(sample.triggers, classic::L, classic::R);
                self.apply_table(&CLASSIC_BUTTON_MAP, held, 0);
                self.add_stick(0, sample.stick);
                self.add_stick(2, sample.right_stick);
            }
            ExtensionKind::Pro => {
                let held =
                    sample.held | trigger_mask(sample.triggers, pro::ZL, pro::ZR);
                self.apply_table(&PRO_BUTTON_MAP, held, 0);
                self.add_stick(0, sample.stick);
                self.add_stick(2, sample.right_stick);
            }
        }
    }

    /// Bounds the combined stick accumulators to full scale.
    fn clamp(&mut self) {
        for value in &mut self.sticks {
            *value = (*value).clamp(-STICK_SCALE, STICK_SCALE);
        }
    }
}

impl RawPad for MergedPad {
    fn button(&self, index: usize) -> bool {
        index < CONSOLE_VIRTUAL_BUTTONS && self.held & (1 << index) != 0
    }

    fn axis(&self, index: usize) -> i32 {
        self.sticks.get(index).copied().unwrap_or(0)
    }

    fn hat(&self, _index: usize) -> u8 {
        hat::CENTERED
    }
}

/// Pressed-edge view over the accumulator, so the edge mask resolves
/// through the same virtual-button path as the held mask.
struct PressedView<'a>(&'a MergedPad);

impl RawPad for PressedView<'_> {
    fn button(&self, index: usize) -> bool {
        index < CONSOLE_VIRTUAL_BUTTONS && self.0.pressed & (1 << index) != 0
    }

    fn axis(&self, index: usize) -> i32 {
        self.0.axis(index)
    }

    fn hat(&self, index: usize) -> u8 {
        self.0.hat(index)
    }
}

/// Converts analog trigger travel past the threshold into the
/// extension's digital shoulder masks.
fn trigger_mask(triggers: (f32, f32), left: u32, right: u32) -> u32 {
    let mut mask = 0;
    if triggers.0 > TRIGGER_THRESHOLD {
        mask |= left;
    }
    if triggers.1 > TRIGGER_THRESHOLD {
        mask |= right;
    }
    mask
}

/// The multi-controller backend over a platform port.
pub struct ConsoleDriver<P> {
    port: P,
    bindings: AxisBindings,
    button_map: ButtonMap,
    channel_timeout: u8,
    links: [ChannelLink; SECONDARY_CHANNELS],
    closed: bool,
}

impl<P: ConsolePort> ConsoleDriver<P> {
    /// Wraps an initialized platform port. There is no failure path:
    /// absent peripherals simply contribute nothing.
    #[must_use]
    pub fn new(config: &ConsoleConfig, port: P) -> Self {
        Self {
            port,
            bindings: config.axis_bindings(),
            button_map: ButtonMap::identity(CONSOLE_VIRTUAL_BUTTONS),
            channel_timeout: config.channel_timeout,
            links: [ChannelLink::Disconnected; SECONDARY_CHANNELS],
            closed: false,
        }
    }

    /// Runs one secondary channel through its link state machine and
    /// returns the sample (fresh or substituted) to merge this poll.
    fn read_channel(&mut self, channel: usize) -> Option<RemoteSample> {
        let fresh = if self.port.probe(channel) {
            self.port.read_channel(channel)
        } else {
            None
        };

        match fresh {
            Some(sample) => Some(self.links[channel].fresh(sample)),
            None => {
                let was_disconnected = self.links[channel].is_disconnected();
                let substitute = self.links[channel].miss(self.channel_timeout);

                if !was_disconnected && self.links[channel].is_disconnected() {
                    debug!("secondary channel {} timed out; disconnecting", channel);
                    self.port.disconnect(channel);
                }

                substitute
            }
        }
    }
}

impl<P: ConsolePort> PadBackend for ConsoleDriver<P> {
    fn name(&self) -> &str {
        "console multi-controller"
    }

    fn poll(&mut self) -> PadSnapshot {
        let mut merged = MergedPad::default();

        // Primary gamepad first, then channels in index order.
        if let Some(sample) = self.port.read_gamepad() {
            merged.accumulate_gamepad(&sample);
        }

        for channel in 0..SECONDARY_CHANNELS {
            if let Some(sample) = self.read_channel(channel) {
                merged.accumulate_remote(&sample);
            }
        }

        merged.clamp();

        let pressed = buttons_state(&PressedView(&merged), &self.button_map, &self.bindings);

        PadSnapshot {
            buttons: buttons_state(&merged, &self.button_map, &self.bindings),
            pressed: Some(pressed),
            turn: axis_state(&merged, self.bindings.turn, CONSOLE_DEAD_ZONE),
            forward: axis_state(&merged, self.bindings.forward, CONSOLE_DEAD_ZONE),
            strafe: axis_state(&merged, self.bindings.strafe, CONSOLE_DEAD_ZONE),
            look: axis_state(&merged, self.bindings.look, CONSOLE_DEAD_ZONE),
        }
    }

    fn is_valid_axis(&self, axis: AxisId) -> bool {
        axis.is_valid_for(DeviceCaps {
            axes: 4,
            hats: 0,
        })
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.port.shutdown();
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scriptable console port: tests mutate the public fields between
    /// polls.
    #[derive(Default)]
    struct MockConsolePort {
        gamepad: Option<GamepadSample>,
        channels: [Option<RemoteSample>; SECONDARY_CHANNELS],
        probe_ok: [bool; SECONDARY_CHANNELS],
        disconnects: Vec<usize>,
        shutdowns: u32,
    }

    impl ConsolePort for MockConsolePort {
        fn read_gamepad(&mut self) -> Option<GamepadSample> {
            self.gamepad
        }

        fn probe(&mut self, channel: usize) -> bool {
            self.probe_ok[channel]
        }

        fn read_channel(&mut self, channel: usize) -> Option<RemoteSample> {
            self.channels[channel]
        }

        fn disconnect(&mut self, channel: usize) {
            self.disconnects.push(channel);
        }

        fn shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    fn driver(port: MockConsolePort) -> ConsoleDriver<MockConsolePort> {
        ConsoleDriver::new(&ConsoleConfig::default(), port)
    }

    fn nunchuk_stick(x: f32, y: f32) -> RemoteSample {
        RemoteSample {
            stick: (x, y),
            ..RemoteSample::buttons(ExtensionKind::Nunchuk, 0)
        }
    }

    fn scaled(value: f32) -> i32 {
        (value * STICK_SCALE as f32) as i32
    }

    // ==================== Gamepad Tests ====================

    #[test]
    fn test_no_peripherals_reads_neutral() {
        let mut driver = driver(MockConsolePort::default());
        let snapshot = driver.poll();
        assert_eq!(snapshot, PadSnapshot {
            pressed: Some(0),
            ..PadSnapshot::neutral()
        });
    }

    #[test]
    fn test_gamepad_buttons_map_to_virtual_bits() {
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: gamepad::A | gamepad::ZR,
            pressed: gamepad::A,
            left_stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
        });

        let snapshot = driver(port).poll();
        // Virtual layout: A is 0, ZR is 9.
        assert_eq!(snapshot.buttons, 1 | (1 << 9));
        assert_eq!(snapshot.pressed, Some(1));
    }

    #[test]
    fn test_gamepad_sticks_scaled_and_flipped() {
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: 0,
            pressed: 0,
            left_stick: (0.5, 1.0),
            right_stick: (-1.0, -0.5),
        });

        let snapshot = driver(port).poll();
        // Console defaults: turn = axis 2 (right X), forward = axis 1
        // (left Y), strafe = axis 0 (left X), look = axis 3 (right Y).
        assert_eq!(snapshot.strafe, scaled(0.5));
        assert_eq!(snapshot.forward, -STICK_SCALE); // up is negative
        assert_eq!(snapshot.turn, -STICK_SCALE);
        assert_eq!(snapshot.look, scaled(0.5));
    }

    #[test]
    fn test_console_dead_zone_applies_to_merged_sticks() {
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: 0,
            pressed: 0,
            left_stick: (0.05, 0.0), // ~1637, inside 32768/10
            right_stick: (0.0, 0.0),
        });

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.strafe, 0);
    }

    // ==================== Extension Tests ====================

    #[test]
    fn test_remote_contributes_buttons_only() {
        let mut port = MockConsolePort::default();
        port.probe_ok[0] = true;
        port.channels[0] = Some(RemoteSample {
            stick: (1.0, 1.0), // must be ignored on a bare remote
            ..RemoteSample::buttons(ExtensionKind::Remote, remote::A | remote::TWO)
        });

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.buttons, 1 | (1 << 7));
        assert_eq!(snapshot.strafe, 0);
        assert_eq!(snapshot.forward, 0);
    }

    #[test]
    fn test_nunchuk_contributes_one_stick() {
        let mut port = MockConsolePort::default();
        port.probe_ok[1] = true;
        port.channels[1] = Some(nunchuk_stick(1.0, 0.0));

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.strafe, STICK_SCALE);
        assert_eq!(snapshot.turn, 0); // no right stick on a nunchuk
    }

    #[test]
    fn test_classic_triggers_fold_into_shoulder_buttons() {
        let mut port = MockConsolePort::default();
        port.probe_ok[0] = true;
        port.channels[0] = Some(RemoteSample {
            triggers: (1.0, 0.1),
            ..RemoteSample::buttons(ExtensionKind::Classic, 0)
        });

        let snapshot = driver(port).poll();
        // Classic physical L sits at virtual index 8; 0.1 stays under
        // the threshold so the right side contributes nothing.
        assert_eq!(snapshot.buttons, 1 << 8);
    }

    #[test]
    fn test_pro_contributes_two_sticks() {
        let mut port = MockConsolePort::default();
        port.probe_ok[3] = true;
        port.channels[3] = Some(RemoteSample {
            stick: (0.0, -1.0),
            right_stick: (0.5, 0.0),
            ..RemoteSample::buttons(ExtensionKind::Pro, pro::STICK_R)
        });

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.forward, STICK_SCALE); // down stick, flipped
        assert_eq!(snapshot.turn, scaled(0.5));
        assert_eq!(snapshot.buttons, 1 << 5);
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_contributions_accumulate_and_clamp() {
        // Gamepad and nunchuk both push left stick X at 0.8: the sum
        // exceeds full scale and clamps exactly to it.
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: 0,
            pressed: 0,
            left_stick: (0.8, 0.0),
            right_stick: (0.0, 0.0),
        });
        port.probe_ok[0] = true;
        port.channels[0] = Some(nunchuk_stick(0.8, 0.0));

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.strafe, STICK_SCALE);
    }

    #[test]
    fn test_opposed_contributions_cancel() {
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: 0,
            pressed: 0,
            left_stick: (1.0, 0.0),
            right_stick: (0.0, 0.0),
        });
        port.probe_ok[0] = true;
        port.channels[0] = Some(nunchuk_stick(-1.0, 0.0));

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.strafe, 0);
    }

    #[test]
    fn test_buttons_or_across_peripherals() {
        let mut port = MockConsolePort::default();
        port.gamepad = Some(GamepadSample {
            held: gamepad::B,
            pressed: 0,
            left_stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
        });
        port.probe_ok[2] = true;
        port.channels[2] =
            Some(RemoteSample::buttons(ExtensionKind::Remote, remote::A));

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.buttons, 1 | (1 << 1));
    }

    #[test]
    fn test_secondary_pressed_excluded_from_edge_mask() {
        let mut port = MockConsolePort::default();
        port.probe_ok[0] = true;
        port.channels[0] = Some(RemoteSample {
            pressed: remote::A,
            ..RemoteSample::buttons(ExtensionKind::Remote, remote::A)
        });

        let snapshot = driver(port).poll();
        assert_eq!(snapshot.buttons, 1);
        assert_eq!(snapshot.pressed, Some(0));
    }

    // ==================== Reconnect Tests ====================

    #[test]
    fn test_stale_cache_served_during_gap_then_disconnect() {
        let timeout = ConsoleConfig::default().channel_timeout as usize;
        let mut driver = driver(MockConsolePort::default());

        driver.port.probe_ok[0] = true;
        driver.port.channels[0] = Some(nunchuk_stick(1.0, 0.0));
        assert_eq!(driver.poll().strafe, STICK_SCALE);

        // Empty reads: the cached sample substitutes for timeout-1 polls.
        driver.port.channels[0] = None;
        for _ in 0..timeout - 1 {
            assert_eq!(driver.poll().strafe, STICK_SCALE);
        }
        assert!(driver.port.disconnects.is_empty());

        // The next empty read expires the window.
        assert_eq!(driver.poll().strafe, 0);
        assert_eq!(driver.port.disconnects, vec![0]);

        // Further polls contribute nothing and do not re-notify.
        assert_eq!(driver.poll().strafe, 0);
        assert_eq!(driver.port.disconnects, vec![0]);
    }

    #[test]
    fn test_fresh_sample_resets_countdown() {
        let timeout = ConsoleConfig::default().channel_timeout as usize;
        let mut driver = driver(MockConsolePort::default());

        driver.port.probe_ok[0] = true;
        driver.port.channels[0] = Some(nunchuk_stick(1.0, 0.0));
        driver.poll();

        // timeout-1 consecutive misses, then one success.
        driver.port.channels[0] = None;
        for _ in 0..timeout - 1 {
            driver.poll();
        }
        driver.port.channels[0] = Some(nunchuk_stick(-1.0, 0.0));
        assert_eq!(driver.poll().strafe, -STICK_SCALE);

        // The full window is available again.
        driver.port.channels[0] = None;
        for _ in 0..timeout - 1 {
            assert_eq!(driver.poll().strafe, -STICK_SCALE);
        }
        assert_eq!(driver.poll().strafe, 0);
    }

    #[test]
    fn test_probe_failure_feeds_countdown() {
        let mut driver = driver(MockConsolePort::default());

        driver.port.probe_ok[2] = true;
        driver.port.channels[2] = Some(nunchuk_stick(1.0, 0.0));
        driver.poll();

        // Probe failure behaves like an empty read: cache substitutes.
        driver.port.probe_ok[2] = false;
        assert_eq!(driver.poll().strafe, STICK_SCALE);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut driver = driver(MockConsolePort::default());

        driver.port.probe_ok = [true; SECONDARY_CHANNELS];
        driver.port.channels[0] = Some(nunchuk_stick(0.25, 0.0));
        driver.port.channels[3] = Some(nunchuk_stick(0.25, 0.0));
        assert_eq!(driver.poll().strafe, 2 * scaled(0.25));

        // Channel 3 drops out; channel 0 keeps reading fresh samples.
        driver.port.channels[3] = None;
        let timeout = driver.channel_timeout as usize;
        for _ in 0..timeout {
            driver.poll();
        }
        assert_eq!(driver.port.disconnects, vec![3]);
        assert_eq!(driver.poll().strafe, scaled(0.25));
    }

    #[test]
    fn test_timeout_of_one_disconnects_immediately() {
        let config = ConsoleConfig {
            channel_timeout: 1,
            ..ConsoleConfig::default()
        };
        let mut driver = ConsoleDriver::new(&config, MockConsolePort::default());

        driver.port.probe_ok[0] = true;
        driver.port.channels[0] = Some(nunchuk_stick(1.0, 0.0));
        driver.poll();

        driver.port.channels[0] = None;
        assert_eq!(driver.poll().strafe, 0);
        assert_eq!(driver.port.disconnects, vec![0]);
    }

    // ==================== Lifecycle Tests ====================

    #[test]
    fn test_shutdown_releases_port_once() {
        let mut driver = driver(MockConsolePort::default());
        driver.shutdown();
        driver.shutdown();
        assert_eq!(driver.port.shutdowns, 1);
    }

    #[test]
    fn test_axis_validity_against_merged_caps() {
        let driver = driver(MockConsolePort::default());
        assert!(driver.is_valid_axis(AxisId::real(3)));
        assert!(!driver.is_valid_axis(AxisId::real(4)));
        assert!(!driver.is_valid_axis(AxisId::hat(
            0,
            crate::axis::HatDirection::Horizontal
        )));
        assert!(driver.is_valid_axis(AxisId::button_pair(0, 1)));
    }
}
