/// Dense index of a country in a `Dataset`'s sorted country list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryId(u32);

impl CountryId {
    pub fn new(index: u32) -> Self {
        CountryId(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}
