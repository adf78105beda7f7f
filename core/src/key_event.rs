//! Key events as delivered by the host.
//!
//! A `KeyEvent` carries the raw keysym/keycode/state triple of one keystroke
//! plus accessors for the derived modifier flags. Keysym and modifier values
//! follow the X11 layout that desktop input-method frameworks use, declared
//! here as plain constants so no runtime name resolution is needed.

/// X11 keysym values for the keys the session dispatches on.
pub mod keysym {
    pub const SPACE: u32 = 0x0020;

    pub const KEY_0: u32 = 0x0030;
    pub const KEY_1: u32 = 0x0031;
    pub const KEY_2: u32 = 0x0032;
    pub const KEY_3: u32 = 0x0033;
    pub const KEY_4: u32 = 0x0034;
    pub const KEY_5: u32 = 0x0035;
    pub const KEY_6: u32 = 0x0036;
    pub const KEY_7: u32 = 0x0037;
    pub const KEY_8: u32 = 0x0038;
    pub const KEY_9: u32 = 0x0039;

    pub const UPPER_A: u32 = 0x0041;
    pub const UPPER_Z: u32 = 0x005a;
    pub const LOWER_A: u32 = 0x0061;
    pub const LOWER_Z: u32 = 0x007a;

    pub const BACKSPACE: u32 = 0xff08;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;

    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;

    pub const KP_ENTER: u32 = 0xff8d;
    pub const KP_LEFT: u32 = 0xff96;
    pub const KP_UP: u32 = 0xff97;
    pub const KP_RIGHT: u32 = 0xff98;
    pub const KP_DOWN: u32 = 0xff99;
    pub const KP_PAGE_UP: u32 = 0xff9a;
    pub const KP_PAGE_DOWN: u32 = 0xff9b;

    pub const KP_0: u32 = 0xffb0;
    pub const KP_1: u32 = 0xffb1;
    pub const KP_2: u32 = 0xffb2;
    pub const KP_3: u32 = 0xffb3;
    pub const KP_4: u32 = 0xffb4;
    pub const KP_5: u32 = 0xffb5;
    pub const KP_6: u32 = 0xffb6;
    pub const KP_7: u32 = 0xffb7;
    pub const KP_8: u32 = 0xffb8;
    pub const KP_9: u32 = 0xffb9;

    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CONTROL_R: u32 = 0xffe4;
    pub const CAPS_LOCK: u32 = 0xffe5;
    pub const ALT_L: u32 = 0xffe9;
    pub const ALT_R: u32 = 0xffea;
    pub const SUPER_L: u32 = 0xffeb;
}

/// Modifier state bits, matching the X11/IBus modifier mask layout.
pub mod modifier {
    pub const SHIFT_MASK: u32 = 1 << 0;
    pub const LOCK_MASK: u32 = 1 << 1;
    pub const CONTROL_MASK: u32 = 1 << 2;
    /// Alt.
    pub const MOD1_MASK: u32 = 1 << 3;
    pub const MOD4_MASK: u32 = 1 << 6;
    pub const SUPER_MASK: u32 = 1 << 26;
    pub const HYPER_MASK: u32 = 1 << 27;
    pub const META_MASK: u32 = 1 << 28;
    /// Set on key release events.
    pub const RELEASE_MASK: u32 = 1 << 30;
}

/// Selection keys 1..9 then 0, in lookup-table slot order.
pub const DIGIT_KEYS: [u32; 10] = [
    keysym::KEY_1,
    keysym::KEY_2,
    keysym::KEY_3,
    keysym::KEY_4,
    keysym::KEY_5,
    keysym::KEY_6,
    keysym::KEY_7,
    keysym::KEY_8,
    keysym::KEY_9,
    keysym::KEY_0,
];

/// Numeric-keypad equivalents of `DIGIT_KEYS`, same slot order.
pub const KEYPAD_DIGIT_KEYS: [u32; 10] = [
    keysym::KP_1,
    keysym::KP_2,
    keysym::KP_3,
    keysym::KP_4,
    keysym::KP_5,
    keysym::KP_6,
    keysym::KP_7,
    keysym::KP_8,
    keysym::KP_9,
    keysym::KP_0,
];

/// Map a digit keysym (top row or keypad) to its lookup-table slot.
pub fn digit_index(keyval: u32) -> Option<usize> {
    DIGIT_KEYS
        .iter()
        .position(|&k| k == keyval)
        .or_else(|| KEYPAD_DIGIT_KEYS.iter().position(|&k| k == keyval))
}

/// One keystroke as delivered by the host.
///
/// `keycode` is the hardware scan code; the session dispatches on `keyval`
/// and `state` only, but the code is kept for logging parity with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keyval: u32,
    pub keycode: u16,
    pub state: u32,
}

impl KeyEvent {
    pub fn new(keyval: u32, keycode: u16, state: u32) -> Self {
        Self {
            keyval,
            keycode,
            state,
        }
    }

    /// A plain press of `keyval` with no modifiers.
    pub fn press(keyval: u32) -> Self {
        Self::new(keyval, 0, 0)
    }

    /// A release of `keyval`.
    pub fn release(keyval: u32) -> Self {
        Self::new(keyval, 0, modifier::RELEASE_MASK)
    }

    /// A press of `keyval` with the given modifier state.
    pub fn with_state(keyval: u32, state: u32) -> Self {
        Self::new(keyval, 0, state)
    }

    pub fn is_release(&self) -> bool {
        self.state & modifier::RELEASE_MASK != 0
    }

    pub fn shift(&self) -> bool {
        self.state & modifier::SHIFT_MASK != 0
    }

    pub fn control(&self) -> bool {
        self.state & modifier::CONTROL_MASK != 0
    }

    pub fn alt(&self) -> bool {
        self.state & modifier::MOD1_MASK != 0
    }

    pub fn super_key(&self) -> bool {
        self.state & modifier::SUPER_MASK != 0
    }

    /// ASCII letter key, either case.
    pub fn is_letter(&self) -> bool {
        matches!(self.keyval, keysym::UPPER_A..=keysym::UPPER_Z)
            || matches!(self.keyval, keysym::LOWER_A..=keysym::LOWER_Z)
    }

    /// The ASCII character for keysyms in the ASCII range.
    pub fn to_char(&self) -> Option<char> {
        if self.keyval < 0x80 {
            char::from_u32(self.keyval)
        } else {
            None
        }
    }

    /// Letter keys folded to their lowercase character.
    pub fn lowercase_letter(&self) -> Option<char> {
        if self.is_letter() {
            self.to_char().map(|c| c.to_ascii_lowercase())
        } else {
            None
        }
    }
}
