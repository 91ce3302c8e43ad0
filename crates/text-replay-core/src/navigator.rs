use rand::Rng;
use tracing::debug;

use crate::error::{Result, SessionError};

/// Rows shown (and tagged) at once.
pub const CHUNK_SIZE: usize = 25;

/// Number of chunks needed to show `len` rows. No trailing empty chunk.
pub fn sub_chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub group: usize,
    pub sub_chunk: usize,
}

impl Cursor {
    pub fn new(group: usize, sub_chunk: usize) -> Self {
        Self { group, sub_chunk }
    }
}

/// Row range `[start, end)` inside the group the cursor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub cursor: Cursor,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Chunk(ChunkSpan),
    /// No visible groups at all.
    Empty,
    /// The group index is past the visible list.
    EndOfData,
}

/// Outcome of a navigation action. Only `Moved` and `Jumped` change the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(Cursor),
    Jumped(Cursor),
    EndOfDataset,
    BeginningOfDataset,
    NoData,
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved(_) | Navigation::Jumped(_))
    }

    /// User-facing notice, if the action warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Navigation::Moved(_) => None,
            Navigation::Jumped(_) => Some("Jumped to a random selection!"),
            Navigation::EndOfDataset => Some("You have reached the end of the dataset."),
            Navigation::BeginningOfDataset => Some("You are at the beginning of the dataset."),
            Navigation::NoData => Some("No data to select from."),
        }
    }
}

/// Cursor over the sizes of the visible groups.
///
/// A navigator is built for one visible group list and starts at (0, 0);
/// recomputing the list means building a new navigator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkNavigator {
    group_sizes: Vec<usize>,
    cursor: Cursor,
}

impl ChunkNavigator {
    pub fn new(group_sizes: Vec<usize>) -> Self {
        Self {
            group_sizes,
            cursor: Cursor::default(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn last_sub_chunk(&self, group: usize) -> usize {
        sub_chunk_count(self.group_sizes[group]).saturating_sub(1)
    }

    pub fn position(&self) -> Position {
        if self.group_sizes.is_empty() {
            return Position::Empty;
        }
        let Some(&size) = self.group_sizes.get(self.cursor.group) else {
            return Position::EndOfData;
        };
        let start = (self.cursor.sub_chunk * CHUNK_SIZE).min(size);
        let end = (start + CHUNK_SIZE).min(size);
        Position::Chunk(ChunkSpan {
            cursor: self.cursor,
            start,
            end,
        })
    }

    pub fn next(&mut self) -> Navigation {
        if self.group_sizes.is_empty() {
            return Navigation::NoData;
        }
        let Cursor { group, sub_chunk } = self.cursor;
        let Some(&size) = self.group_sizes.get(group) else {
            return Navigation::EndOfDataset;
        };

        if (sub_chunk + 1) * CHUNK_SIZE < size {
            self.cursor.sub_chunk += 1;
        } else if group + 1 < self.group_sizes.len() {
            self.cursor = Cursor::new(group + 1, 0);
        } else {
            return Navigation::EndOfDataset;
        }
        debug!(cursor = ?self.cursor, "next chunk");
        Navigation::Moved(self.cursor)
    }

    pub fn previous(&mut self) -> Navigation {
        if self.group_sizes.is_empty() {
            return Navigation::NoData;
        }
        let Cursor { group, sub_chunk } = self.cursor;

        if sub_chunk > 0 && group < self.group_sizes.len() {
            self.cursor.sub_chunk -= 1;
        } else if group > 0 {
            let prev = (group - 1).min(self.group_sizes.len() - 1);
            self.cursor = Cursor::new(prev, self.last_sub_chunk(prev));
        } else {
            return Navigation::BeginningOfDataset;
        }
        debug!(cursor = ?self.cursor, "previous chunk");
        Navigation::Moved(self.cursor)
    }

    /// Jump to a uniformly chosen group, then a uniformly chosen chunk of it.
    pub fn random_jump<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Navigation {
        if self.group_sizes.is_empty() {
            return Navigation::NoData;
        }
        let group = rng.random_range(0..self.group_sizes.len());
        let sub_chunk = rng.random_range(0..=self.last_sub_chunk(group));
        self.cursor = Cursor::new(group, sub_chunk);
        debug!(cursor = ?self.cursor, "random jump");
        Navigation::Jumped(self.cursor)
    }

    /// Move straight to `cursor`. Out-of-range targets leave the cursor untouched.
    pub fn jump(&mut self, cursor: Cursor) -> Result<Navigation> {
        let in_range = self
            .group_sizes
            .get(cursor.group)
            .is_some_and(|&size| cursor.sub_chunk < sub_chunk_count(size));
        if !in_range {
            return Err(SessionError::OutOfRange {
                group: cursor.group,
                sub_chunk: cursor.sub_chunk,
            });
        }
        self.cursor = cursor;
        debug!(cursor = ?self.cursor, "jump");
        Ok(Navigation::Moved(cursor))
    }
}
