use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Atom label '{0}' has no leading species symbol")]
    MissingSpecies(String),
    #[error("Atom label '{0}' has no trailing index (expected e.g. 'Fe3')")]
    MissingIndex(String),
    #[error("Atom label '{0}' contains unexpected characters after the index")]
    TrailingGarbage(String),
    #[error("Atom label '{0}' has index 0; site indices are 1-based")]
    ZeroIndex(String),
}

/// Identifies one atom site: a species symbol plus its 1-based position
/// within that species' coordinate list.
///
/// Parsed from the compact `<species><index>` form used in structure files
/// and on the command line ("O12", "Fe3"). The grammar is explicit: a leading
/// run of alphabetic characters is the species, a trailing run of digits is
/// the index, and nothing else is permitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteLabel {
    pub species: String,
    pub index: usize,
}

impl SiteLabel {
    pub fn new(species: impl Into<String>, index: usize) -> Self {
        Self {
            species: species.into(),
            index,
        }
    }
}

impl FromStr for SiteLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let species: String = s.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        if species.is_empty() {
            return Err(LabelError::MissingSpecies(s.to_string()));
        }
        let rest = &s[species.len()..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(LabelError::MissingIndex(s.to_string()));
        }
        if digits.len() != rest.len() {
            return Err(LabelError::TrailingGarbage(s.to_string()));
        }
        let index: usize = digits
            .parse()
            .map_err(|_| LabelError::MissingIndex(s.to_string()))?;
        if index == 0 {
            return Err(LabelError::ZeroIndex(s.to_string()));
        }
        Ok(Self { species, index })
    }
}

impl fmt::Display for SiteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.species, self.index)
    }
}
