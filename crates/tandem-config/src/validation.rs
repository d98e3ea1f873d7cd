//! Configuration validation.
//!
//! Every check runs; problems are collected rather than returned one at a
//! time so a user can fix a configuration in one pass.

use indexmap::IndexSet;

use crate::config::{PackageConfig, TandemConfig};
use crate::error::{ConfigError, ConfigIssue, Result};

impl TandemConfig {
    /// Every problem with this configuration, in package order.
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut seen: IndexSet<&str> = IndexSet::new();

        if self.packages.is_empty() {
            issues.push(ConfigIssue::new("packages", "no packages configured"));
        }

        for (index, package) in self.packages.iter().enumerate() {
            let at = |field: &str| format!("packages[{index}].{field}");

            let name = package.name.trim();
            if name.is_empty() {
                issues.push(ConfigIssue::new(at("name"), "package name is empty"));
            } else if !seen.insert(name) {
                issues.push(ConfigIssue::new(
                    at("name"),
                    format!("duplicate package name `{name}`"),
                ));
            }

            check_version(package, &at("version"), &mut issues);

            if package.entries.is_empty() {
                issues.push(ConfigIssue::new(at("entries"), "no entry points"));
            }
            for (i, entry) in package.entries.iter().enumerate() {
                if entry.import.as_os_str().is_empty() {
                    issues.push(ConfigIssue::new(
                        at(&format!("entries[{i}].import")),
                        "entry path is empty",
                    ));
                }
            }

            for (i, include) in package.include.iter().enumerate() {
                if include.as_os_str().is_empty() {
                    issues.push(ConfigIssue::new(
                        at(&format!("include[{i}]")),
                        "include path is empty",
                    ));
                }
            }

            for (field, names) in [
                ("dependencies", &package.dependencies),
                ("peer_dependencies", &package.peer_dependencies),
            ] {
                for (i, dependency) in names.iter().enumerate() {
                    if dependency.trim().is_empty() {
                        issues.push(ConfigIssue::new(
                            at(&format!("{field}[{i}]")),
                            "dependency name is blank",
                        ));
                    }
                }
            }
        }

        issues
    }

    /// Fail with [`ConfigError::Invalid`] listing every issue.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { issues })
        }
    }
}

fn check_version(package: &PackageConfig, field: &str, issues: &mut Vec<ConfigIssue>) {
    let version = package.version.trim();
    if version.is_empty() {
        issues.push(ConfigIssue::new(field, "version is empty"));
    } else if let Err(e) = semver::Version::parse(version) {
        issues.push(ConfigIssue::new(
            field,
            format!("`{version}` is not a valid semver version: {e}"),
        ));
    }
}
