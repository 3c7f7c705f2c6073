use dataset::CountryId;

/// Outcome of a toggle request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
    /// The country has no rows under the current filter (or is unknown).
    Rejected,
}

impl Toggle {
    pub fn changed(&self) -> bool {
        !matches!(self, Toggle::Rejected)
    }
}

/// Countries chosen for comparison, as a bitset over `CountryId::index()`.
///
/// Ordering contract:
/// - Iteration yields `CountryId`s in ascending index order, which is also
///   ascending country-name order.
///
/// Equality compares members only, not the capacity of the bitset.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    words: Vec<u64>,
    len: usize,
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for SelectionSet {}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, country: CountryId) -> bool {
        let (word, bit) = word_bit(country.index());
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Inserts `country` into the set.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, country: CountryId) -> bool {
        let (word, bit) = word_bit(country.index());
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }

    /// Removes `country` from the set.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, country: CountryId) -> bool {
        let (word, bit) = word_bit(country.index());
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1u64 << bit;
        if (*w & mask) == 0 {
            return false;
        }
        *w &= !mask;
        self.len -= 1;
        true
    }

    /// Removes a member; otherwise adds it only when `has_data` holds.
    pub fn toggle(&mut self, country: CountryId, has_data: bool) -> Toggle {
        if self.remove(country) {
            Toggle::Deselected
        } else if has_data && self.insert(country) {
            Toggle::Selected
        } else {
            Toggle::Rejected
        }
    }

    /// Keeps only members for which `keep` holds; returns the removed ids in
    /// ascending order.
    pub fn retain(&mut self, mut keep: impl FnMut(CountryId) -> bool) -> Vec<CountryId> {
        let removed: Vec<CountryId> = self.iter().filter(|&c| !keep(c)).collect();
        for &c in &removed {
            self.remove(c);
        }
        removed
    }

    /// Iterates selected countries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = CountryId> + '_ {
        SelectionIter {
            words: &self.words,
            word_index: 0,
            current_word: 0,
            base_index: 0,
        }
    }
}

fn word_bit(index: u32) -> (usize, u32) {
    let word = (index / 64) as usize;
    let bit = index % 64;
    (word, bit)
}

struct SelectionIter<'a> {
    words: &'a [u64],
    word_index: usize,
    current_word: u64,
    base_index: u32,
}

impl Iterator for SelectionIter<'_> {
    type Item = CountryId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let tz = self.current_word.trailing_zeros();
                self.current_word &= !(1u64 << tz);
                return Some(CountryId::new(self.base_index + tz));
            }

            let w = *self.words.get(self.word_index)?;
            self.current_word = w;
            self.base_index = (self.word_index as u32) * 64;
            self.word_index += 1;
        }
    }
}
