use serde::{Deserialize, Serialize};

use crate::{codegen::MAX_PRINTF_OPERANDS, IrError, Result};

/// Smallest cap a single-element print fits in: three pid arguments, the prefix, the element.
pub const MIN_PRINTF_OPERANDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringOptions {
    /// Forces hex output on or off regardless of what each print asks for.
    pub hex_override: Option<bool>,
    /// Argument cap for a single printf. Targets may lower it, never raise it past 32.
    pub max_printf_operands: usize,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            hex_override: None,
            max_printf_operands: MAX_PRINTF_OPERANDS,
        }
    }
}

impl LoweringOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| IrError::ConfigError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_PRINTF_OPERANDS..=MAX_PRINTF_OPERANDS).contains(&self.max_printf_operands) {
            return Err(IrError::ConfigError(format!(
                "max_printf_operands must be between {} and {}, got {}",
                MIN_PRINTF_OPERANDS, MAX_PRINTF_OPERANDS, self.max_printf_operands
            )));
        }
        Ok(())
    }
}
