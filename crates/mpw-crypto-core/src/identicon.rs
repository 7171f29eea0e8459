//! Identicon: a small visual fingerprint of a master key.
//!
//! Lets a user notice a mistyped master password before using any derived
//! result. It is display data only and never authenticates anything.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::seed::keyed_digest;
use crate::stretch::MasterKey;

/// Scope keyed with the master key to produce the identicon seed.
pub const IDENTICON_SCOPE: &str = "com.lyndir.masterpassword.identicon";

/// Number of (glyph, colour) pairs in an identicon.
pub const IDENTICON_LEN: usize = 4;

const LEFT_ARMS: [char; 4] = ['╔', '╚', '╰', '═'];
const BODIES: [char; 6] = ['█', '░', '▒', '▓', '☺', '☻'];
const RIGHT_ARMS: [char; 4] = ['╗', '╝', '╯', '═'];
const ACCESSORIES: [char; 57] = [
    '◈', '◎', '◐', '◑', '◒', '◓', '☀', '☁', '☂', '☃', '☄', '★', '☆', '☎', '☏', '⎈', '⌂', '☘', '☢',
    '☣', '☕', '⌚', '⌛', '⏰', '⚡', '⛄', '⛅', '☔', '♔', '♕', '♖', '♗', '♘', '♙', '♚', '♛', '♜',
    '♝', '♞', '♟', '♨', '♩', '♪', '♫', '⚐', '⚑', '⚔', '⚖', '⚙', '⚠', '⌘', '⏎', '✄', '✆', '✈',
    '✉', '✌',
];

/// Colour class of one identicon glyph. Rendering is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdenticonColor {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Magenta.
    Magenta,
    /// Cyan.
    Cyan,
    /// White.
    White,
}

const COLORS: [IdenticonColor; 7] = [
    IdenticonColor::Red,
    IdenticonColor::Green,
    IdenticonColor::Yellow,
    IdenticonColor::Blue,
    IdenticonColor::Magenta,
    IdenticonColor::Cyan,
    IdenticonColor::White,
];

/// One glyph of an identicon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdenticonPart {
    /// The text glyph.
    pub glyph: char,
    /// Its colour class.
    pub color: IdenticonColor,
}

/// Left arm, body, right arm, accessory. Not secret; may be cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identicon {
    /// The pairs in display order.
    pub parts: [IdenticonPart; IDENTICON_LEN],
}

impl fmt::Display for Identicon {
    /// The glyphs without colour, e.g. `╔█╗☃`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.parts
            .iter()
            .try_for_each(|part| write!(f, "{}", part.glyph))
    }
}

/// Derive the identicon of a master key.
///
/// Glyph `i` is chosen by `seed[i]`, its colour by `seed[4 + i]`.
#[must_use]
pub fn identicon(master_key: &MasterKey) -> Identicon {
    let seed = keyed_digest(master_key.expose(), IDENTICON_SCOPE.as_bytes());
    let bytes = seed.expose();
    let tables: [&[char]; IDENTICON_LEN] = [&LEFT_ARMS, &BODIES, &RIGHT_ARMS, &ACCESSORIES];

    let parts = std::array::from_fn(|i| {
        let glyph = select(tables[i], bytes[i]);
        let color = select(&COLORS, bytes[i.saturating_add(IDENTICON_LEN)]);
        IdenticonPart { glyph, color }
    });
    Identicon { parts }
}

fn select<T: Copy>(table: &[T], byte: u8) -> T {
    // Tables are frozen, non-empty constants.
    #[allow(clippy::arithmetic_side_effects)]
    let position = usize::from(byte) % table.len();
    table[position]
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
