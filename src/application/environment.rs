//! Environment scoping for instance execution.
//!
//! Variables aimed at the root instance keep their key. Variables aimed at
//! any other instance get the key `cellmesh_env_<instance>.<key>` so the
//! runtime can route them without clashing with the root's own variables.

use std::path::Path;

use serde::Serialize;

use crate::domain::id::InstanceName;
use crate::domain::link::EnvironmentVariable;

/// Variable pointing the runtime at the extracted image.
pub const IMAGE_DIR_VARIABLE: &str = "CELLMESH_IMAGE_DIR";

const SCOPED_PREFIX: &str = "cellmesh_env_";

/// One variable as handed to the instance executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedVariable {
    pub key: String,
    pub value: String,
}

impl ScopedVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn into_pair(self) -> (String, String) {
        (self.key, self.value)
    }
}

/// Scope `vars` for an execution of `root` from `image_dir`.
///
/// The image directory variable always comes first; user variables follow in
/// input order. Repeated keys are kept, so the last one wins at the runtime.
#[must_use]
pub fn scope_environment(
    vars: &[EnvironmentVariable],
    root: &InstanceName,
    image_dir: &Path,
) -> Vec<ScopedVariable> {
    let mut scoped = Vec::with_capacity(vars.len() + 1);
    scoped.push(ScopedVariable::new(
        IMAGE_DIR_VARIABLE,
        image_dir.display().to_string(),
    ));

    scoped.extend(vars.iter().map(|var| match &var.instance {
        Some(instance) if instance != root => ScopedVariable::new(
            format!("{SCOPED_PREFIX}{instance}.{}", var.key),
            var.value.clone(),
        ),
        _ => ScopedVariable::new(var.key.clone(), var.value.clone()),
    }));

    scoped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::link::parse_env_vars;

    fn root() -> InstanceName {
        InstanceName::new("hr-inst")
    }

    #[test]
    fn image_dir_comes_first_even_without_user_variables() {
        let scoped = scope_environment(&[], &root(), Path::new("/tmp/hr"));
        assert_eq!(scoped, vec![ScopedVariable::new(IMAGE_DIR_VARIABLE, "/tmp/hr")]);
    }

    #[test]
    fn non_root_variables_are_prefixed_in_input_order() {
        let vars = parse_env_vars(
            &["LOG=debug", "employee-inst:DB_URL=mysql://db", "hr-inst:PORT=8080"],
            &root(),
        )
        .unwrap();

        let scoped = scope_environment(&vars, &root(), Path::new("/tmp/hr"));

        let keys: Vec<_> = scoped.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                IMAGE_DIR_VARIABLE,
                "LOG",
                "cellmesh_env_employee-inst.DB_URL",
                "PORT"
            ]
        );
        assert_eq!(scoped[2].value, "mysql://db");
    }

    #[test]
    fn repeated_keys_are_kept() {
        let vars = parse_env_vars(&["A=1", "A=2"], &root()).unwrap();
        let scoped = scope_environment(&vars, &root(), Path::new("/img"));
        assert_eq!(scoped.len(), 3);
        assert_eq!(scoped[2].value, "2");
    }
}
