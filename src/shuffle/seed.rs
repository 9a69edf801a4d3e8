//! Shuffle seeds.
//!
//! A seed is either a number or a string. Strings fold to a number by
//! summing their UTF-16 code units, which keeps seeds reproducible across
//! processes. Distinct strings may collide; that only means two shuffles
//! agree, never that one is wrong.

use serde::{Deserialize, Serialize};

use crate::core::StackId;

/// Seed parameterizing a reproducible permutation.
///
/// Serializes untagged, so JSON holds either `7` or `"seed-x"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u32),
    Text(String),
}

impl Seed {
    /// Reduce the seed to the generator's 32-bit state.
    ///
    /// ```
    /// use card_tabletop::shuffle::Seed;
    ///
    /// // 'a' + 'b' = 97 + 98
    /// assert_eq!(Seed::from("ab").fold(), 195);
    /// assert_eq!(Seed::from(195u32).fold(), 195);
    /// ```
    #[must_use]
    pub fn fold(&self) -> u32 {
        match self {
            Seed::Number(n) => *n,
            Seed::Text(s) => s
                .encode_utf16()
                .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit))),
        }
    }

    /// Derive the per-stack seed ("seed + stack id").
    ///
    /// Numbers add the raw stack id; text appends its decimal form. Stacks of
    /// equal length shuffled by one call therefore get different permutations.
    #[must_use]
    pub fn combine(&self, stack: StackId) -> Seed {
        match self {
            Seed::Number(n) => Seed::Number(n.wrapping_add(stack.raw())),
            Seed::Text(s) => Seed::Text(format!("{s}{}", stack.raw())),
        }
    }
}

impl From<u32> for Seed {
    fn from(n: u32) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_owned())
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Seed::Text(s)
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{n}"),
            Seed::Text(s) => write!(f, "{s:?}"),
        }
    }
}
