//! Rendering the resolved dependency list.

mod json;
mod table;

pub use json::render_json;
pub use table::render_table;

use crate::error::Result;
use crate::model::PackageDependency;

/// Output format for the resolved dependency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Single line of Debian `Depends` field syntax
    #[default]
    Oneline,
    /// One dependency per line
    Multiline,
    /// JSON array for programmatic use
    Json,
    /// Human-readable table
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oneline" => Ok(OutputFormat::Oneline),
            "multiline" => Ok(OutputFormat::Multiline),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!(
                "Unknown format: {}. Use 'oneline', 'multiline', 'json', or 'table'",
                s
            )),
        }
    }
}

/// Renders the dependency list in the requested format. The oneline and
/// multiline renderings of an empty list are the empty string.
pub fn render(dependencies: &[PackageDependency], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Oneline => Ok(display_forms(dependencies).join(", ")),
        OutputFormat::Multiline => Ok(display_forms(dependencies).join("\n")),
        OutputFormat::Json => render_json(dependencies),
        OutputFormat::Table => Ok(render_table(dependencies)),
    }
}

fn display_forms(dependencies: &[PackageDependency]) -> Vec<String> {
    dependencies.iter().map(ToString::to_string).collect()
}
