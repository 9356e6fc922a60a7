//! services/api/src/adapters/prompt_files.rs
//!
//! Loads the baseline GeoGebra prompt blocks from the prompts directory,
//! falling back to the built-in text for any file that is absent.

use std::io::ErrorKind;
use std::path::Path;

use geogebra_assistant_core::BaselinePrompts;
use tracing::info;

use crate::error::ApiError;

pub const COMMAND_PROMPT_FILE: &str = "command.txt";
pub const GEOGEBRA_RULES_FILE: &str = "geogebra_rules.txt";
pub const NAMING_RULES_FILE: &str = "naming_rules.txt";

pub fn load_baseline_prompts(dir: &Path) -> Result<BaselinePrompts, ApiError> {
    let defaults = BaselinePrompts::default();
    Ok(BaselinePrompts {
        command: read_or(dir, COMMAND_PROMPT_FILE, defaults.command)?,
        geogebra_rules: read_or(dir, GEOGEBRA_RULES_FILE, defaults.geogebra_rules)?,
        naming_rules: read_or(dir, NAMING_RULES_FILE, defaults.naming_rules)?,
    })
}

fn read_or(dir: &Path, file_name: &str, default: String) -> Result<String, ApiError> {
    let path = dir.join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("Loaded prompt override from {}", path.display());
            Ok(text.trim().to_string())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(default),
        Err(e) => Err(e.into()),
    }
}
