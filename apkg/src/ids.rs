//! Note/card id allocation and sort-field checksums.
//!
//! The target application treats id magnitude as a creation-order proxy, so
//! ids must increase in insertion order and every card id must sort above
//! every note id of the same export. [`IdAllocator`] guarantees both by
//! seeding the card counter at ten times the note seed.
//!
//! One allocator belongs to one export run. It is not `Clone` and is never
//! stored in a static.

use sha1::{Digest, Sha1};

use crate::error::{ExportError, Result};

/// Largest accepted allocator seed; card ids start at ten times the seed.
pub const MAX_SEED_MS: i64 = i64::MAX / 10;

/// Hands out strictly increasing note and card ids for one export run.
///
/// # Examples
///
/// ```
/// use deckpack_apkg::IdAllocator;
///
/// let mut ids = IdAllocator::new(1_700_000_000_000).unwrap();
/// let note = ids.next_note_id().unwrap();
/// let card = ids.next_card_id().unwrap();
/// assert_eq!(note, 1_700_000_000_000);
/// assert_eq!(card, 17_000_000_000_000);
/// assert!(ids.next_note_id().unwrap() > note);
/// assert!(card > note);
/// ```
#[derive(Debug)]
pub struct IdAllocator {
    next_note: i64,
    next_card: i64,
    card_seed: i64,
}

impl IdAllocator {
    /// Creates an allocator seeded from the export start time in
    /// milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTimestamp`] unless
    /// `1 <= seed_ms <= MAX_SEED_MS`.
    pub fn new(seed_ms: i64) -> Result<Self> {
        if !(1..=MAX_SEED_MS).contains(&seed_ms) {
            return Err(ExportError::InvalidTimestamp(seed_ms));
        }
        Ok(Self {
            next_note: seed_ms,
            next_card: seed_ms * 10,
            card_seed: seed_ms * 10,
        })
    }

    /// Returns the next note id.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::IdsExhausted`] once note ids would reach the
    /// first card id.
    pub fn next_note_id(&mut self) -> Result<i64> {
        let id = self.next_note;
        if id >= self.card_seed {
            return Err(ExportError::IdsExhausted);
        }
        self.next_note = id + 1;
        Ok(id)
    }

    /// Returns the next card id.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::IdsExhausted`] if the id would overflow.
    pub fn next_card_id(&mut self) -> Result<i64> {
        let id = self.next_card;
        self.next_card = id.checked_add(1).ok_or(ExportError::IdsExhausted)?;
        Ok(id)
    }
}

/// Computes the duplicate-detection checksum of a note's sort field.
///
/// This is the first 8 hex digits of the SHA-1 digest of the UTF-8 bytes,
/// read as an unsigned 32-bit number. Those 8 digits are exactly the first 4
/// digest bytes in big-endian order.
///
/// # Examples
///
/// ```
/// use deckpack_apkg::compute_csum;
///
/// assert_eq!(compute_csum("Q"), compute_csum("Q"));
/// assert_ne!(compute_csum("Q"), compute_csum("q"));
/// ```
pub fn compute_csum(sort_field: &str) -> i64 {
    let digest = Sha1::digest(sort_field.as_bytes());
    let prefix = [digest[0], digest[1], digest[2], digest[3]];
    i64::from(u32::from_be_bytes(prefix))
}

/// Creates a random, hyphen-free hex note guid.
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
