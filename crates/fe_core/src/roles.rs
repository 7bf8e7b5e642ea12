//! Player roles with a fixed canonical order (P → D → C → A).
//!
//! `Role` derives `Ord` in declaration order, so every `BTreeMap<Role, _>` in the
//! engine iterates goalkeepers first and attackers last. Draw order in the
//! allocator depends on this.

use crate::errors::CoreError;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// Goalkeeper (portiere).
    #[cfg_attr(feature = "serde", serde(rename = "P"))]
    P,
    /// Defender (difensore).
    #[cfg_attr(feature = "serde", serde(rename = "D"))]
    D,
    /// Midfielder (centrocampista).
    #[cfg_attr(feature = "serde", serde(rename = "C"))]
    C,
    /// Attacker (attaccante).
    #[cfg_attr(feature = "serde", serde(rename = "A"))]
    A,
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 4] = [Role::P, Role::D, Role::C, Role::A];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::P => "P",
            Role::D => "D",
            Role::C => "C",
            Role::A => "A",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of the single-letter code (case-insensitive). Free-text labels
/// ("Difensore", "Punta") are resolved by the normalizer, not here.
impl FromStr for Role {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" | "p" => Ok(Role::P),
            "D" | "d" => Ok(Role::D),
            "C" | "c" => Ok(Role::C),
            "A" | "a" => Ok(Role::A),
            _ => Err(CoreError::UnknownRole),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_p_d_c_a() {
        let mut v = vec![Role::A, Role::C, Role::P, Role::D];
        v.sort();
        assert_eq!(v, Role::ALL.to_vec());
    }

    #[test]
    fn parse_codes() {
        assert_eq!("p".parse::<Role>().unwrap(), Role::P);
        assert_eq!(" A ".parse::<Role>().unwrap(), Role::A);
        assert_eq!("X".parse::<Role>(), Err(CoreError::UnknownRole));
        assert_eq!("Por".parse::<Role>(), Err(CoreError::UnknownRole));
    }
}
