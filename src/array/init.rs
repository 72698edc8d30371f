/*!
 * Initial Values
 * Ways to seed a device array at construction
 */

use crate::core::types::{Size, Word};

/// Initial contents of a new array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InitialValues {
    /// Leave device memory as the allocator returned it
    #[default]
    Uninitialized,
    /// Same value in every element
    Broadcast(Word),
    /// Element-wise copy, truncated to the array length
    Values(Vec<Word>),
    /// Each character's code point, truncated to the array length
    Text(String),
}

impl InitialValues {
    /// The (index, value) writes needed to seed an array of `length` elements
    ///
    /// Sequences shorter than the array only cover their own prefix.
    pub fn writes(&self, length: Size) -> Vec<(Size, Word)> {
        match self {
            InitialValues::Uninitialized => Vec::new(),
            InitialValues::Broadcast(value) => (0..length).map(|i| (i, *value)).collect(),
            InitialValues::Values(values) => {
                values.iter().copied().take(length).enumerate().collect()
            }
            InitialValues::Text(text) => text
                .chars()
                .map(|c| Word::from(u32::from(c)))
                .take(length)
                .enumerate()
                .collect(),
        }
    }
}

impl From<Word> for InitialValues {
    fn from(value: Word) -> Self {
        InitialValues::Broadcast(value)
    }
}

impl From<Vec<Word>> for InitialValues {
    fn from(values: Vec<Word>) -> Self {
        InitialValues::Values(values)
    }
}

impl From<&[Word]> for InitialValues {
    fn from(values: &[Word]) -> Self {
        InitialValues::Values(values.to_vec())
    }
}

impl<const N: usize> From<[Word; N]> for InitialValues {
    fn from(values: [Word; N]) -> Self {
        InitialValues::Values(values.to_vec())
    }
}

impl From<&str> for InitialValues {
    fn from(text: &str) -> Self {
        InitialValues::Text(text.to_string())
    }
}

impl From<String> for InitialValues {
    fn from(text: String) -> Self {
        InitialValues::Text(text)
    }
}

impl From<Option<InitialValues>> for InitialValues {
    fn from(values: Option<InitialValues>) -> Self {
        values.unwrap_or_default()
    }
}
