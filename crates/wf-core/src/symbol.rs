//! Symbol definitions and symbol sets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WfError, WfResult};

/// Symbol tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolTier {
    /// High paying picture symbol
    High,
    /// Low paying symbol
    Low,
}

/// A reel symbol
///
/// Declaration order is the evaluation order used by the ways evaluator,
/// which is also the iteration order of result maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Symbol {
    High1 = 0,
    High2 = 1,
    High3 = 2,
    Low1 = 3,
    Low2 = 4,
    Low3 = 5,
    Low4 = 6,
}

impl Symbol {
    /// Every symbol, in evaluation order
    pub const ALL: [Symbol; 7] = [
        Symbol::High1,
        Symbol::High2,
        Symbol::High3,
        Symbol::Low1,
        Symbol::Low2,
        Symbol::Low3,
        Symbol::Low4,
    ];

    /// Asset/texture name (e.g. "high1")
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::High1 => "high1",
            Symbol::High2 => "high2",
            Symbol::High3 => "high3",
            Symbol::Low1 => "low1",
            Symbol::Low2 => "low2",
            Symbol::Low3 => "low3",
            Symbol::Low4 => "low4",
        }
    }

    pub fn tier(&self) -> SymbolTier {
        match self {
            Symbol::High1 | Symbol::High2 | Symbol::High3 => SymbolTier::High,
            _ => SymbolTier::Low,
        }
    }

    /// Position in [`Symbol::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = WfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::ALL
            .iter()
            .copied()
            .find(|sym| sym.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WfError::UnknownSymbol(s.to_string()))
    }
}

/// Ordered, duplicate-free set of symbols a random fill draws from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    /// Create a set, rejecting an empty list. Duplicates are dropped,
    /// keeping the first occurrence.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> WfResult<Self> {
        let mut unique: Vec<Symbol> = Vec::new();
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        if unique.is_empty() {
            return Err(WfError::EmptySymbolSet);
        }
        Ok(Self { symbols: unique })
    }

    /// All seven symbols
    pub fn full() -> Self {
        Self {
            symbols: Symbol::ALL.to_vec(),
        }
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed set
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Symbol at index (wraps around)
    pub fn get_wrapped(&self, index: usize) -> Symbol {
        self.symbols[index % self.symbols.len()]
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::full()
    }
}

impl TryFrom<Vec<Symbol>> for SymbolSet {
    type Error = WfError;

    fn try_from(value: Vec<Symbol>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SymbolSet> for Vec<Symbol> {
    fn from(value: SymbolSet) -> Self {
        value.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_names_roundtrip() {
        for symbol in Symbol::ALL {
            assert_eq!(symbol.as_str().parse::<Symbol>().unwrap(), symbol);
        }
        assert_eq!("HIGH3".parse::<Symbol>().unwrap(), Symbol::High3);
        assert!(matches!(
            "wild".parse::<Symbol>(),
            Err(WfError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_symbol_order_matches_all() {
        for (i, symbol) in Symbol::ALL.iter().enumerate() {
            assert_eq!(symbol.index(), i);
        }
        assert!(Symbol::High1 < Symbol::Low4);
        assert_eq!(Symbol::High2.tier(), SymbolTier::High);
        assert_eq!(Symbol::Low1.tier(), SymbolTier::Low);
    }

    #[test]
    fn test_symbol_set_dedup_and_empty() {
        let set = SymbolSet::new([Symbol::Low1, Symbol::High1, Symbol::Low1]).unwrap();
        assert_eq!(set.as_slice(), &[Symbol::Low1, Symbol::High1]);
        assert_eq!(set.get_wrapped(3), Symbol::High1);
        assert!(matches!(SymbolSet::new([]), Err(WfError::EmptySymbolSet)));
    }

    #[test]
    fn test_symbol_set_serde() {
        let set: SymbolSet = serde_json::from_str(r#"["high1","low4"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Symbol::Low4));
        assert!(serde_json::from_str::<SymbolSet>("[]").is_err());
    }
}
