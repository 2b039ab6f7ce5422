//! crates/rpt_core/src/theme.rs
//! Report-level accent colours. Values are CSS hex colours (`#rgb` / `#rrggbb`).

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    #[serde(default)]
    pub accent_background_color: Option<String>,
    #[serde(default)]
    pub accent_font_color: Option<String>,
}

impl Theme {
    pub fn with_background(mut self, color: impl Into<String>) -> Result<Self, CoreError> {
        self.accent_background_color = Some(color.into());
        self.validate()?;
        Ok(self)
    }

    pub fn with_font(mut self, color: impl Into<String>) -> Result<Self, CoreError> {
        self.accent_font_color = Some(color.into());
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("accent_background_color", &self.accent_background_color),
            ("accent_font_color", &self.accent_font_color),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                if !is_hex_color(v) {
                    return Err(CoreError::InvalidColor { field, value: v.clone() });
                }
            }
        }
        Ok(())
    }
}
