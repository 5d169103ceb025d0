//! Requirement reports for display.

use std::fmt;

use crate::dependency::{DependencyKind, Explanation, Severity};
use crate::manifest::{Manifest, Requirements};
use crate::version::ModVersion;

/// One unsatisfied constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequirement {
    pub kind: DependencyKind,
    pub package_id: String,
    pub severity: Severity,
    pub explanation: Explanation,
}

/// Requirement status of a single mod.
#[derive(Debug, Clone)]
pub struct RequirementReport {
    pub package_id: String,
    pub name: String,
    pub version: ModVersion,
    /// Missing requirements, most severe first.
    pub missing: Vec<MissingRequirement>,
    pub met: usize,
}

impl RequirementReport {
    pub fn new(manifest: &Manifest, requirements: &Requirements) -> Self {
        let mut missing: Vec<MissingRequirement> = requirements
            .missing
            .iter()
            .map(|d| MissingRequirement {
                kind: d.kind,
                package_id: d.package_id.clone(),
                severity: d.severity(),
                explanation: d.explanation(),
            })
            .collect();
        missing.sort_by(|a, b| b.severity.cmp(&a.severity));
        Self {
            package_id: manifest.package_id.clone(),
            name: manifest.name.clone(),
            version: manifest
                .resolved_version()
                .cloned()
                .unwrap_or(ModVersion::ZERO),
            missing,
            met: requirements.met.len(),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// Highest severity among missing requirements.
    pub fn worst(&self) -> Severity {
        self.missing
            .first()
            .map(|m| m.severity)
            .unwrap_or(Severity::Satisfied)
    }
}

impl fmt::Display for RequirementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing.is_empty() {
            return write!(f, "{} ({}): all {} requirements met", self.name, self.package_id, self.met);
        }
        writeln!(
            f,
            "{} ({}): {} missing, {} met",
            self.name,
            self.package_id,
            self.missing.len(),
            self.met
        )?;
        for m in &self.missing {
            writeln!(
                f,
                "  [{}] {} {}: {}",
                m.severity.level(),
                m.kind,
                m.package_id,
                m.explanation
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for MissingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.package_id, self.explanation)
    }
}
