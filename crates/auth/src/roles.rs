use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric privilege tier.
///
/// The hierarchy is inverted: a strictly lower number grants strictly more
/// capability (`1` is the super-admin, `4` a plain user). `PartialOrd`/`Ord`
/// are deliberately not derived; compare with
/// [`RoleLevel::at_least_as_privileged_as`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoleLevel(u8);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role level {0} (expected 1..=4)")]
pub struct UnknownRoleLevel(pub u8);

impl RoleLevel {
    pub const SUPER_ADMIN: RoleLevel = RoleLevel(1);
    pub const FINANCE: RoleLevel = RoleLevel(2);
    pub const MARKETER: RoleLevel = RoleLevel(3);
    pub const USER: RoleLevel = RoleLevel(4);

    pub const ALL: [RoleLevel; 4] = [
        RoleLevel::SUPER_ADMIN,
        RoleLevel::FINANCE,
        RoleLevel::MARKETER,
        RoleLevel::USER,
    ];

    pub fn from_level(level: u8) -> Result<Self, UnknownRoleLevel> {
        match level {
            1..=4 => Ok(Self(level)),
            other => Err(UnknownRoleLevel(other)),
        }
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    /// `true` iff `self` may perform an operation that requires `required`.
    pub fn at_least_as_privileged_as(self, required: RoleLevel) -> bool {
        self.0 <= required.0
    }

    /// `true` iff `self` grants strictly more capability than `other`.
    pub fn strictly_more_privileged_than(self, other: RoleLevel) -> bool {
        self.0 < other.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "super_admin",
            2 => "finance",
            3 => "marketer",
            _ => "user",
        }
    }
}

impl Default for RoleLevel {
    fn default() -> Self {
        RoleLevel::USER
    }
}

impl TryFrom<u8> for RoleLevel {
    type Error = UnknownRoleLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_level(value)
    }
}

impl From<RoleLevel> for u8 {
    fn from(value: RoleLevel) -> Self {
        value.0
    }
}

impl core::fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}
