use tabled::{settings::Style, Table, Tabled};

use crate::model::PackageDependency;

#[derive(Tabled)]
struct DependencyRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Constraint")]
    constraint: String,
}

/// Human-oriented rendering: one row per dependency, then a summary count.
pub fn render_table(dependencies: &[PackageDependency]) -> String {
    if dependencies.is_empty() {
        return "No package dependencies found.".to_string();
    }

    let rows: Vec<DependencyRow> = dependencies
        .iter()
        .map(|dependency| DependencyRow {
            package: dependency.name.clone(),
            constraint: match &dependency.version_constraints {
                Some(constraints) => constraints
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                None => "-".to_string(),
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!(
        "{}\n\nSummary:\n  Package dependencies: {}",
        table,
        dependencies.len()
    )
}
