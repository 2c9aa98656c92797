//! Polyglot `.bin` opening books.
//!
//! A book is a flat array of 16-byte big-endian records, sorted by key:
//!
//! | Bytes  | Field  |
//! |--------|--------|
//! | 0..8   | key    |
//! | 8..10  | move   |
//! | 10..12 | weight |
//! | 12..16 | learn  |
//!
//! The key is Polyglot's Zobrist hash, which shakmaty's `Zobrist64` with
//! legal en passant reproduces, so [`position_key`] addresses the book
//! directly. Moves pack `to | from << 6 | promotion << 12`; castling is
//! written as the king capturing its own rook.

use std::fs;
use std::path::Path;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use shakmaty::{Chess, Move, Position, Role};

use crate::error::BookError;
use crate::search::position_key;

/// Size of one book record in bytes.
pub const ENTRY_SIZE: usize = 16;

/// One book record; the learn field is not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyglotEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
}

impl PolyglotEntry {
    fn read(record: &[u8]) -> Self {
        let mut key = [0; 8];
        key.copy_from_slice(&record[..8]);
        Self {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([record[8], record[9]]),
            weight: u16::from_be_bytes([record[10], record[11]]),
        }
    }
}

/// Polyglot encoding of a legal move.
pub fn encode_move(mv: Move) -> Option<u16> {
    let (from, to) = match mv {
        Move::Castle { king, rook } => (king, rook),
        _ => (mv.from()?, mv.to()),
    };
    let promotion = match mv.promotion() {
        Some(Role::Knight) => 1,
        Some(Role::Bishop) => 2,
        Some(Role::Rook) => 3,
        Some(Role::Queen) => 4,
        _ => 0,
    };
    Some(to as u16 | (from as u16) << 6 | promotion << 12)
}

/// An in-memory Polyglot book.
#[derive(Debug, Clone, Default)]
pub struct PolyglotBook {
    entries: Vec<PolyglotEntry>,
}

impl PolyglotBook {
    /// Read a `.bin` book.
    pub fn load(path: &Path) -> Result<Self, BookError> {
        let bytes = fs::read(path).map_err(|source| BookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    /// Decode raw book bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, BookError> {
        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(BookError::TruncatedPolyglot { len: bytes.len() });
        }
        let mut entries: Vec<_> = bytes.chunks_exact(ENTRY_SIZE).map(PolyglotEntry::read).collect();
        // Lookups binary-search; tolerate books written out of order
        entries.sort_by_key(|e| e.key);
        Ok(Self { entries })
    }

    /// All records stored for `key`.
    pub fn entries_for(&self, key: u64) -> &[PolyglotEntry] {
        let start = self.entries.partition_point(|e| e.key < key);
        let end = self.entries.partition_point(|e| e.key <= key);
        &self.entries[start..end]
    }

    /// Legal book moves for `pos` with their weights.
    pub fn candidates(&self, pos: &Chess) -> Vec<(Move, u16)> {
        let legal = pos.legal_moves();
        self.entries_for(position_key(pos))
            .iter()
            .filter_map(|entry| {
                let mv = legal
                    .iter()
                    .copied()
                    .find(|&mv| encode_move(mv) == Some(entry.raw_move & 0x7fff))?;
                Some((mv, entry.weight))
            })
            .collect()
    }

    /// Weighted random pick among the legal book moves for `pos`.
    ///
    /// Zero-weight records are never played.
    pub fn choose<R: Rng + ?Sized>(&self, pos: &Chess, rng: &mut R) -> Option<Move> {
        let candidates: Vec<_> = self
            .candidates(pos)
            .into_iter()
            .filter(|&(_, weight)| weight > 0)
            .collect();
        let dist = WeightedIndex::new(candidates.iter().map(|&(_, w)| u32::from(w))).ok()?;
        Some(candidates[dist.sample(rng)].0)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
