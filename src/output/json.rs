use crate::error::Result;
use crate::model::PackageDependency;

/// Compact JSON array of the dependency list, in resolution order.
pub fn render_json(dependencies: &[PackageDependency]) -> Result<String> {
    Ok(serde_json::to_string(dependencies)?)
}

#[cfg(test)]
mod tests {
    use crate::model::VersionConstraint;

    use super::*;

    #[test]
    fn test_json_array_shape() {
        let dependencies = vec![
            PackageDependency::new("libc6", Some(vec![VersionConstraint::new(">=", "2.28")])),
            PackageDependency::new("libgcc-s1", None),
        ];
        assert_eq!(
            render_json(&dependencies).unwrap(),
            r#"[{"name":"libc6","version_constraints":[{"operator":">=","version":"2.28"}]},{"name":"libgcc-s1"}]"#
        );
    }

    #[test]
    fn test_empty_list_is_an_empty_array() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }
}
