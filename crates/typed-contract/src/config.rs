//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matcher::Matcher;

/// How `Type[X]` decides whether a type value satisfies `X`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeReferenceRule {
    /// The denoted type must satisfy `X`: a subclass of a nominal `X`, a
    /// member of a union, anything for an unconstrained `X`.
    #[default]
    Subtype,
    /// The type value itself is matched against `X`. Only `Type[type]`,
    /// `Type[Type]` and `Type[Object]`-like declarations can succeed.
    Legacy,
}

/// Configuration for a [`ContractEngine`](crate::ContractEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Wrap callables returned under a `Callable[...]` declaration (default: true)
    pub auto_wrap_returned_callables: bool,
    /// Rule applied to `Type[X]` declarations (default: subtype)
    pub type_reference_rule: TypeReferenceRule,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            auto_wrap_returned_callables: true,
            type_reference_rule: TypeReferenceRule::Subtype,
        }
    }
}

impl ContractConfig {
    /// Parse a TOML fragment. Missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.type_reference_rule)
    }
}
