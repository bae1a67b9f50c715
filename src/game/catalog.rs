//! Word categories
//!
//! Embeds the built-in category list at build time. The format is one
//! category per line, `name: word, word, ...`, with `#` comments.
//! A replacement list in the same format can be loaded from disk.

use crate::error::GameError;
use once_cell::sync::Lazy;
use rand::prelude::*;
use std::path::Path;

/// Embedded category list (22 categories)
static CATEGORIES_DATA: &str = include_str!("../../data/categories.txt");

/// Built-in catalog, parsed on first use
static BUILTIN: Lazy<CategoryCatalog> = Lazy::new(|| CategoryCatalog::parse(CATEGORIES_DATA));

/// A named set of candidate words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub words: Vec<String>,
}

/// Static mapping from category name to candidate words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

/// A drawn secret word and the category it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPick {
    pub category: Option<String>,
    pub word: String,
}

impl CategoryCatalog {
    /// The embedded catalog.
    pub fn builtin() -> &'static CategoryCatalog {
        &BUILTIN
    }

    /// Load a catalog file. Fails if it cannot be read or holds no categories.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&text);
        if catalog.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("no categories found in {}", path.display()),
            ));
        }
        Ok(catalog)
    }

    /// The catalog to play with: the file at `path` when one is given and
    /// loads, otherwise the built-in catalog plus the reason the file was
    /// not used.
    pub fn load_or_builtin(path: Option<&Path>) -> (Self, Option<std::io::Error>) {
        match path.map(Self::load) {
            Some(Ok(catalog)) => (catalog, None),
            Some(Err(e)) => (Self::builtin().clone(), Some(e)),
            None => (Self::builtin().clone(), None),
        }
    }

    /// Parse catalog text.
    ///
    /// Lines without a `:` are ignored, as are categories with no words.
    /// A repeated category name extends the earlier entry. Repeated words
    /// within a category are kept once.
    pub fn parse(text: &str) -> Self {
        let mut categories: Vec<Category> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, words)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                continue;
            }

            let words: Vec<&str> = words
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .collect();
            if words.is_empty() {
                continue;
            }

            let index = match categories.iter().position(|c| c.name == name) {
                Some(index) => index,
                None => {
                    categories.push(Category {
                        name,
                        words: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            let existing = &mut categories[index].words;
            for word in words {
                if !existing.iter().any(|w| w == word) {
                    existing.push(word.to_string());
                }
            }
        }

        Self { categories }
    }

    /// All category names in file order.
    pub fn list_categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        let name = name.to_lowercase();
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Draw a word uniformly at random.
    ///
    /// With a category, draws from that category. Without one, draws from
    /// every word in the catalog.
    pub fn pick_word<R: Rng + ?Sized>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> Result<WordPick, GameError> {
        match category {
            Some(name) => {
                let cat = self
                    .get(name)
                    .ok_or_else(|| GameError::UnknownCategory(name.to_string()))?;
                let word = cat
                    .words
                    .choose(rng)
                    .ok_or_else(|| GameError::UnknownCategory(name.to_string()))?;
                Ok(WordPick {
                    category: Some(cat.name.clone()),
                    word: word.clone(),
                })
            }
            None => {
                let total = self.word_count();
                if total == 0 {
                    return Err(GameError::UnknownCategory("any".to_string()));
                }
                let mut index = rng.random_range(0..total);
                for cat in &self.categories {
                    if index < cat.words.len() {
                        return Ok(WordPick {
                            category: None,
                            word: cat.words[index].clone(),
                        });
                    }
                    index -= cat.words.len();
                }
                Err(GameError::UnknownCategory("any".to_string()))
            }
        }
    }

    /// Total number of words across all categories.
    ///
    /// A word listed under two categories counts twice.
    pub fn word_count(&self) -> usize {
        self.categories.iter().map(|c| c.words.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
