//! # Censorship Lists
//!
//! Each group owns exactly one list of censored words. Words are stored
//! normalized (trimmed, lowercase) and each word appears at most once.

use crate::error::{GroupError, Result};
use moot_store::tx::{self, TxResult};
use moot_store::{Collection, Store, TransactionalTree};
use moot_types::WordListId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Collection name for censorship lists.
pub const WORD_LISTS: &str = "word_lists";

/// A group's censored words, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    pub id: WordListId,
    pub words: Vec<String>,
}

impl WordList {
    pub fn new(id: WordListId) -> Self {
        Self {
            id,
            words: Vec::new(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Replaces every whole-word, case-insensitive occurrence of a listed
    /// word with asterisks of the same length.
    pub fn mask(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut token = String::new();

        for ch in text.chars() {
            if ch.is_alphanumeric() {
                token.push(ch);
            } else {
                self.flush_token(&mut token, &mut out);
                out.push(ch);
            }
        }
        self.flush_token(&mut token, &mut out);
        out
    }

    fn flush_token(&self, token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }
        if self.contains(&token.to_lowercase()) {
            out.extend(std::iter::repeat('*').take(token.chars().count()));
        } else {
            out.push_str(token);
        }
        token.clear();
    }
}

/// Normalizes a word for storage and comparison.
///
/// # Errors
///
/// `InvalidWord` if the trimmed word is empty or contains anything other
/// than letters and digits.
pub fn normalize_word(word: &str) -> Result<String> {
    let trimmed = word.trim();
    if trimmed.is_empty() || !trimmed.chars().all(char::is_alphanumeric) {
        return Err(GroupError::InvalidWord(word.to_string()));
    }
    Ok(trimmed.to_lowercase())
}

/// Adds a normalized word inside a transaction. Returns `false` if it was
/// already listed.
pub fn add_word_in(tree: &TransactionalTree, list: &WordListId, word: &str) -> TxResult<bool, GroupError> {
    let Some(mut doc) = tx::get::<WordList, _, GroupError>(tree, list)? else {
        return tx::abort(GroupError::WordListNotFound(*list));
    };
    if doc.contains(word) {
        return Ok(false);
    }
    doc.words.push(word.to_string());
    tx::put(tree, list, &doc)?;
    Ok(true)
}

/// Removes a normalized word inside a transaction.
pub fn remove_word_in(tree: &TransactionalTree, list: &WordListId, word: &str) -> TxResult<(), GroupError> {
    let Some(mut doc) = tx::get::<WordList, _, GroupError>(tree, list)? else {
        return tx::abort(GroupError::WordListNotFound(*list));
    };
    if !doc.contains(word) {
        return tx::abort(GroupError::WordNotListed {
            list: *list,
            word: word.to_string(),
        });
    }
    doc.words.retain(|w| w != word);
    tx::put(tree, list, &doc)?;
    Ok(())
}

/// Store of every group's censorship list.
#[derive(Debug, Clone)]
pub struct WordLists {
    lists: Collection<WordList>,
}

impl WordLists {
    pub fn new(store: &Store) -> Result<Self> {
        Ok(Self {
            lists: store.collection(WORD_LISTS)?,
        })
    }

    /// The backing collection, for multi-tree transactions.
    pub fn collection(&self) -> &Collection<WordList> {
        &self.lists
    }

    /// Creates an empty list.
    pub fn create(&self) -> Result<WordList> {
        let list = WordList::new(WordListId::generate());
        self.lists.insert_new(&list.id, &list)?;
        Ok(list)
    }

    pub fn list(&self, id: &WordListId) -> Result<WordList> {
        self.lists
            .get(id)?
            .ok_or(GroupError::WordListNotFound(*id))
    }

    pub fn words(&self, id: &WordListId) -> Result<Vec<String>> {
        Ok(self.list(id)?.words)
    }

    pub fn contains(&self, id: &WordListId, word: &str) -> Result<bool> {
        let word = normalize_word(word)?;
        Ok(self.list(id)?.contains(&word))
    }

    /// Censors a word. Adding a listed word again is a no-op.
    ///
    /// Returns whether the word was newly added.
    pub fn add_word(&self, id: &WordListId, word: &str) -> Result<bool> {
        let word = normalize_word(word)?;
        let result = self
            .lists
            .tree()
            .transaction(|tree| add_word_in(tree, id, &word));
        let added = tx::commit(result)?;
        debug!(list = %id, word = %word, added, "word censored");
        Ok(added)
    }

    /// Lifts censorship of a word.
    ///
    /// # Errors
    ///
    /// `WordNotListed` if the word is not on the list.
    pub fn remove_word(&self, id: &WordListId, word: &str) -> Result<()> {
        let word = normalize_word(word)?;
        let result = self
            .lists
            .tree()
            .transaction(|tree| remove_word_in(tree, id, &word));
        tx::commit(result)?;
        debug!(list = %id, word = %word, "word uncensored");
        Ok(())
    }

    /// Masks censored words in `text`.
    pub fn mask(&self, id: &WordListId, text: &str) -> Result<String> {
        Ok(self.list(id)?.mask(text))
    }

    /// Deletes a list.
    pub fn delete(&self, id: &WordListId) -> Result<()> {
        self.lists
            .remove(id)?
            .map(|_| ())
            .ok_or(GroupError::WordListNotFound(*id))
    }
}
