//! Result types, character classes and the frozen template catalog.
//!
//! A template is a string of class tags (`C` upper-case consonant, `v`
//! lower-case vowel, `n` digit, ...). The encoder picks one template per
//! seed and fills every tag from that class's alphabet.
//!
//! # Append-only
//!
//! Template selection is positional (`seed[0] mod len`). Reordering or
//! removing an entry changes every password of that type, so catalogs may
//! only ever grow by introducing a new algorithm version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// How a result of a given type is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultTypeClass {
    /// Generated from a template and the site seed.
    Template,
    /// Literal content the user saved; the core never derives it.
    Stateful,
}

/// Category of secret to produce for a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultType {
    /// 20 characters, contains symbols.
    Maximum,
    /// Copy-friendly, 14 characters, symbols.
    Long,
    /// Copy-friendly, 8 characters, symbols.
    Medium,
    /// Copy-friendly, 4 characters, no symbols.
    Short,
    /// 8 characters, no symbols.
    Basic,
    /// 4 numbers.
    Pin,
    /// 9 letter name.
    Name,
    /// 20 character sentence.
    Phrase,
    /// Saved by the user, exported with the site.
    StoredPersonal,
    /// Saved by the user, never leaves the device.
    StoredDevicePrivate,
}

const CLASS_TEMPLATE: u32 = 1 << 4;
const CLASS_STATEFUL: u32 = 1 << 5;
const FEATURE_EXPORT_CONTENT: u32 = 1 << 10;
const FEATURE_DEVICE_PRIVATE: u32 = 1 << 11;

impl ResultType {
    /// Every result type, templates first.
    pub const ALL: [Self; 10] = [
        Self::Maximum,
        Self::Long,
        Self::Medium,
        Self::Short,
        Self::Basic,
        Self::Pin,
        Self::Name,
        Self::Phrase,
        Self::StoredPersonal,
        Self::StoredDevicePrivate,
    ];

    /// The class this type belongs to.
    #[must_use]
    pub const fn class(self) -> ResultTypeClass {
        match self {
            Self::StoredPersonal | Self::StoredDevicePrivate => ResultTypeClass::Stateful,
            _ => ResultTypeClass::Template,
        }
    }

    /// Returns `true` for types generated from templates.
    #[must_use]
    pub const fn is_generated(self) -> bool {
        matches!(self.class(), ResultTypeClass::Template)
    }

    /// Stable numeric identifier (class bits | feature bits | index).
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Maximum => CLASS_TEMPLATE,
            Self::Long => 0x1 | CLASS_TEMPLATE,
            Self::Medium => 0x2 | CLASS_TEMPLATE,
            Self::Short => 0x3 | CLASS_TEMPLATE,
            Self::Basic => 0x4 | CLASS_TEMPLATE,
            Self::Pin => 0x5 | CLASS_TEMPLATE,
            Self::Name => 0xE | CLASS_TEMPLATE,
            Self::Phrase => 0xF | CLASS_TEMPLATE,
            Self::StoredPersonal => CLASS_STATEFUL | FEATURE_EXPORT_CONTENT,
            Self::StoredDevicePrivate => 0x1 | CLASS_STATEFUL | FEATURE_DEVICE_PRIVATE,
        }
    }

    /// Look a type up by its numeric identifier.
    #[must_use]
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.value() == value)
    }

    /// One-character abbreviation.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Maximum => "x",
            Self::Long => "l",
            Self::Medium => "m",
            Self::Short => "s",
            Self::Basic => "b",
            Self::Pin => "i",
            Self::Name => "n",
            Self::Phrase => "p",
            Self::StoredPersonal => "P",
            Self::StoredDevicePrivate => "D",
        }
    }

    /// Full lower-case name.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::Long => "long",
            Self::Medium => "medium",
            Self::Short => "short",
            Self::Basic => "basic",
            Self::Pin => "pin",
            Self::Name => "name",
            Self::Phrase => "phrase",
            Self::StoredPersonal => "personal",
            Self::StoredDevicePrivate => "device",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for ResultType {
    type Err = CoreError;

    /// Accepts the short name (case-sensitive, `P` and `p` differ), the
    /// numeric value or the long name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.short_name() == s)
            .or_else(|| s.parse::<u32>().ok().and_then(Self::from_value))
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|t| t.long_name().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| CoreError::UnknownResultType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

/// A template tag and the alphabet it draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterClass {
    /// `V` upper-case vowel.
    VowelUpper,
    /// `C` upper-case consonant.
    ConsonantUpper,
    /// `v` lower-case vowel.
    Vowel,
    /// `c` lower-case consonant.
    Consonant,
    /// `A` upper-case letter.
    AlphaUpper,
    /// `a` alphanumeric class; its frozen alphabet holds letters of both cases.
    Alphanumeric,
    /// `n` digit.
    Numeric,
    /// `o` symbol.
    Symbol,
    /// `x` any printable character of the other classes.
    AnyPrintable,
    /// ` ` literal space; consumes no seed byte.
    Space,
}

impl CharacterClass {
    /// Parse a template tag.
    #[must_use]
    pub const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'V' => Some(Self::VowelUpper),
            'C' => Some(Self::ConsonantUpper),
            'v' => Some(Self::Vowel),
            'c' => Some(Self::Consonant),
            'A' => Some(Self::AlphaUpper),
            'a' => Some(Self::Alphanumeric),
            'n' => Some(Self::Numeric),
            'o' => Some(Self::Symbol),
            'x' => Some(Self::AnyPrintable),
            ' ' => Some(Self::Space),
            _ => None,
        }
    }

    /// The class's frozen alphabet. Never empty.
    #[must_use]
    pub const fn alphabet(self) -> &'static [u8] {
        match self {
            Self::VowelUpper => b"AEIOU",
            Self::ConsonantUpper => b"BCDFGHJKLMNPQRSTVWXYZ",
            Self::Vowel => b"aeiou",
            Self::Consonant => b"bcdfghjklmnpqrstvwxyz",
            Self::AlphaUpper => b"AEIOUBCDFGHJKLMNPQRSTVWXYZ",
            Self::Alphanumeric => b"AEIOUaeiouBCDFGHJKLMNPQRSTVWXYZbcdfghjklmnpqrstvwxyz",
            Self::Numeric => b"0123456789",
            Self::Symbol => b"@&%?,=[]_:-+*$#!'^~;()/.",
            Self::AnyPrintable => {
                b"AEIOUaeiouBCDFGHJKLMNPQRSTVWXYZbcdfghjklmnpqrstvwxyz0123456789!@#$%^&*()"
            }
            Self::Space => b" ",
        }
    }

    /// Returns `true` if filling this tag reads a seed byte.
    #[must_use]
    pub const fn consumes_seed(self) -> bool {
        !matches!(self, Self::Space)
    }
}

// ---------------------------------------------------------------------------
// Templates and catalogs
// ---------------------------------------------------------------------------

/// One frozen template: an ordered string of class tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template(&'static str);

impl Template {
    /// The raw tag string.
    #[must_use]
    pub const fn tags(self) -> &'static str {
        self.0
    }

    /// Resolve every tag to its class.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedTemplate`] on a tag with no class.
    pub fn classes(self) -> Result<Vec<CharacterClass>, CoreError> {
        self.0
            .chars()
            .map(|tag| CharacterClass::from_tag(tag).ok_or(CoreError::MalformedTemplate { tag }))
            .collect()
    }

    /// Seed bytes needed to fill this template, excluding the selector byte.
    #[must_use]
    pub fn seed_bytes_needed(self) -> usize {
        self.0.chars().filter(|&tag| tag != ' ').count()
    }
}

/// A version's template lists, one per template-class result type.
pub(crate) struct Catalog {
    maximum: &'static [Template],
    long: &'static [Template],
    medium: &'static [Template],
    short: &'static [Template],
    basic: &'static [Template],
    pin: &'static [Template],
    name: &'static [Template],
    phrase: &'static [Template],
}

impl Catalog {
    /// Templates for `result_type`, or `None` for stateful types.
    pub(crate) const fn templates(&self, result_type: ResultType) -> Option<&'static [Template]> {
        match result_type {
            ResultType::Maximum => Some(self.maximum),
            ResultType::Long => Some(self.long),
            ResultType::Medium => Some(self.medium),
            ResultType::Short => Some(self.short),
            ResultType::Basic => Some(self.basic),
            ResultType::Pin => Some(self.pin),
            ResultType::Name => Some(self.name),
            ResultType::Phrase => Some(self.phrase),
            ResultType::StoredPersonal | ResultType::StoredDevicePrivate => None,
        }
    }
}

/// The catalog introduced with V0. Every released version so far uses it.
pub(crate) const CATALOG_V0: Catalog = Catalog {
    maximum: &[
        Template("anoxxxxxxxxxxxxxxxxx"),
        Template("axxxxxxxxxxxxxxxxxno"),
    ],
    long: &[
        Template("CvcvnoCvcvCvcv"),
        Template("CvcvCvcvnoCvcv"),
        Template("CvcvCvcvCvcvno"),
        Template("CvccnoCvcvCvcv"),
        Template("CvccCvcvnoCvcv"),
        Template("CvccCvcvCvcvno"),
        Template("CvcvnoCvccCvcv"),
        Template("CvcvCvccnoCvcv"),
        Template("CvcvCvccCvcvno"),
        Template("CvcvnoCvcvCvcc"),
        Template("CvcvCvcvnoCvcc"),
        Template("CvcvCvcvCvccno"),
        Template("CvccnoCvccCvcv"),
        Template("CvccCvccnoCvcv"),
        Template("CvccCvccCvcvno"),
        Template("CvcvnoCvccCvcc"),
        Template("CvcvCvccnoCvcc"),
        Template("CvcvCvccCvccno"),
        Template("CvccnoCvcvCvcc"),
        Template("CvccCvcvnoCvcc"),
        Template("CvccCvcvCvccno"),
    ],
    medium: &[Template("CvcnoCvc"), Template("CvcCvcno")],
    short: &[Template("Cvcn")],
    basic: &[
        Template("aaanaaan"),
        Template("aannaaan"),
        Template("aaannaaa"),
    ],
    pin: &[Template("nnnn")],
    name: &[Template("cvccvcvcv")],
    phrase: &[
        Template("cvcc cvc cvccvcv cvc"),
        Template("cvc cvccvcvcv cvcv"),
        Template("cv cvccv cvc cvcvccv"),
    ],
};

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
