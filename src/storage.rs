//! Storage module for loading and saving the deck file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::codec;
use crate::models::Deck;

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("Failed to open file: {}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file: {}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No flashcards found in {}", path.display())]
    EmptyCollection { path: PathBuf },
}

/// Handles persistence of one deck file.
#[derive(Debug, Clone)]
pub struct DeckFile {
    path: PathBuf,
}

impl DeckFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole file.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Deck, DeckError> {
        let text = fs::read_to_string(&self.path).map_err(|source| DeckError::SourceUnreadable {
            path: self.path.clone(),
            source,
        })?;

        let deck = codec::parse(&text, now);
        log::info!("Loaded {} cards from {:?}", deck.cards.len(), self.path);
        Ok(deck)
    }

    /// Load the deck and refuse one without cards.
    pub fn load_nonempty(&self, now: DateTime<Utc>) -> Result<Deck, DeckError> {
        let deck = self.load(now)?;
        if deck.is_empty() {
            return Err(DeckError::EmptyCollection {
                path: self.path.clone(),
            });
        }
        Ok(deck)
    }

    /// Reorder the deck and replace the file with it.
    ///
    /// The new content goes to a temporary file next to the target first, so
    /// the old file stays intact if anything fails before the final rename.
    pub fn save(&self, deck: &mut Deck, now: DateTime<Utc>) -> Result<(), DeckError> {
        let text = codec::serialize(deck, now);
        self.write_atomic(text.as_bytes())
            .map_err(|source| DeckError::DestinationUnwritable {
                path: self.path.clone(),
                source,
            })?;

        log::info!("Saved {} cards to {:?}", deck.cards.len(), self.path);
        Ok(())
    }

    fn write_atomic(&self, contents: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;

        if let Ok(meta) = fs::metadata(&self.path) {
            if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
                log::warn!("Could not keep permissions of {:?}: {}", self.path, e);
            }
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
