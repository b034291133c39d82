use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed set of household expense categories, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Grocery,
    Hotel,
    Laundry,
    College,
    Bus,
    Dewa,
    Gas,
    Etisalat,
    Elife,
    Petrol,
    Misc,
}

impl Category {
    pub const COUNT: usize = 11;

    /// Every category in the order the ledger columns use.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Grocery,
        Category::Hotel,
        Category::Laundry,
        Category::College,
        Category::Bus,
        Category::Dewa,
        Category::Gas,
        Category::Etisalat,
        Category::Elife,
        Category::Petrol,
        Category::Misc,
    ];

    /// Column header used for this category.
    pub fn name(self) -> &'static str {
        match self {
            Category::Grocery => "Grocery",
            Category::Hotel => "Hotel",
            Category::Laundry => "Laundry",
            Category::College => "College",
            Category::Bus => "Bus",
            Category::Dewa => "Dewa",
            Category::Gas => "Gas",
            Category::Etisalat => "Etisalat",
            Category::Elife => "Elife",
            Category::Petrol => "Petrol",
            Category::Misc => "Misc",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not match any [`Category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One amount per [`Category`]. Amounts are always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryAmounts([f64; Category::COUNT]);

impl CategoryAmounts {
    pub fn get(&self, category: Category) -> f64 {
        self.0[category.index()]
    }

    /// Sets the amount for `category`. Negative or non-finite values are stored as zero.
    pub fn set(&mut self, category: Category, amount: f64) {
        self.0[category.index()] = if amount.is_finite() && amount > 0.0 {
            amount
        } else {
            0.0
        };
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Sum over all categories.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub(crate) fn accumulate(&mut self, other: &CategoryAmounts) {
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value;
        }
    }
}

impl FromIterator<(Category, f64)> for CategoryAmounts {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        let mut amounts = CategoryAmounts::default();
        for (category, amount) in iter {
            amounts.set(category, amount);
        }
        amounts
    }
}

impl Serialize for CategoryAmounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, amount) in self.iter() {
            map.serialize_entry(category.name(), &amount)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("grocery".parse::<Category>().unwrap(), Category::Grocery);
        assert_eq!(" ETISALAT ".parse::<Category>().unwrap(), Category::Etisalat);
        assert!("Rent".parse::<Category>().is_err());
    }

    #[test]
    fn set_clamps_invalid_amounts() {
        let mut amounts = CategoryAmounts::default();
        amounts.set(Category::Bus, -4.0);
        amounts.set(Category::Gas, f64::NAN);
        amounts.set(Category::Misc, 2.5);
        assert_eq!(amounts.get(Category::Bus), 0.0);
        assert_eq!(amounts.get(Category::Gas), 0.0);
        assert_eq!(amounts.total(), 2.5);
    }

    #[test]
    fn serializes_as_named_map() {
        let amounts: CategoryAmounts = [(Category::Hotel, 12.0)].into_iter().collect();
        let json = serde_json::to_value(amounts).unwrap();
        assert_eq!(json["Hotel"], 12.0);
        assert_eq!(json["Grocery"], 0.0);
        assert_eq!(json.as_object().unwrap().len(), Category::COUNT);
    }
}
