//! Built-in engine member tables
//!
//! Two fixed tables: members of `cc.Component` (offered after `this.`) and
//! members of `cc.Node` (offered after `.node.`). They are configuration
//! data, not derived from source. A default set ships with the crate; a
//! replacement can be loaded from a TOML file with the same layout.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUNDLED: &str = include_str!("builtins.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Functions and properties of one engine type, in suggestion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinTable {
    #[serde(default)]
    pub functions: Vec<BuiltinMember>,
    #[serde(default)]
    pub properties: Vec<BuiltinMember>,
}

impl BuiltinTable {
    pub fn len(&self) -> usize {
        self.functions.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinTables {
    #[serde(default)]
    pub component: BuiltinTable,
    #[serde(default)]
    pub node: BuiltinTable,
}

impl BuiltinTables {
    /// The tables shipped with the crate
    pub fn bundled() -> Result<Self, toml::de::Error> {
        toml::from_str(BUNDLED)
    }

    /// Load tables from a TOML file
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::Builtins {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| EngineError::Builtins {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load from `path` when given, otherwise use the bundled tables
    pub fn load_or_bundled(path: Option<&Path>) -> EngineResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled().map_err(|e| EngineError::Builtins {
                path: Path::new("<bundled>").to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}
