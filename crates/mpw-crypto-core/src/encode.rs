//! Template encoding: site seed → result text.
//!
//! `seed[0]` selects the template; every following tag that is not a
//! literal space reads the next seed byte and picks
//! `alphabet[index(byte) mod len(alphabet)]`. Spaces are emitted without
//! consuming a byte. `index` is the version's [`SeedByteRule`].
//!
//! [`SeedByteRule`]: crate::algorithm::SeedByteRule

use crate::algorithm::AlgorithmVersion;
use crate::error::CoreError;
use crate::seed::SiteSeed;
use crate::template::{CharacterClass, ResultType};

/// Encode a site seed as a result of `result_type`.
///
/// Deterministic: no randomness, no locale-dependent behaviour.
///
/// # Errors
///
/// - [`CoreError::UnsupportedResultType`] for stateful types
/// - [`CoreError::SeedExhausted`] / [`CoreError::MalformedTemplate`] if the
///   frozen tables are inconsistent (a defect, never user input)
pub fn encode(
    seed: &SiteSeed,
    result_type: ResultType,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    encode_bytes(seed.expose(), result_type, version)
}

pub(crate) fn encode_bytes(
    seed: &[u8],
    result_type: ResultType,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    let templates = version.templates(result_type)?;
    let rule = version.seed_byte_rule();

    let (&selector, mut remaining) = seed.split_first().ok_or(CoreError::SeedExhausted {
        needed: 1,
        available: 0,
    })?;
    // `AlgorithmVersion::templates` never returns an empty list.
    #[allow(clippy::arithmetic_side_effects)]
    let template = templates[rule.index(selector) % templates.len()];

    let needed = template.seed_bytes_needed().saturating_add(1);
    if needed > seed.len() {
        return Err(CoreError::SeedExhausted {
            needed,
            available: seed.len(),
        });
    }

    let mut out = String::with_capacity(template.tags().len());
    for class in template.classes()? {
        if !class.consumes_seed() {
            out.push(' ');
            continue;
        }
        let (&byte, rest) = remaining.split_first().ok_or(CoreError::SeedExhausted {
            needed,
            available: seed.len(),
        })?;
        remaining = rest;
        out.push(pick(class, rule.index(byte)));
    }
    Ok(out)
}

fn pick(class: CharacterClass, index: usize) -> char {
    let alphabet = class.alphabet();
    // Alphabets are frozen, non-empty constants.
    #[allow(clippy::arithmetic_side_effects)]
    let position = index % alphabet.len();
    char::from(alphabet[position])
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
