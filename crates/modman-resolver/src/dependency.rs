//! A single constraint between the owning mod and a target mod.
//!
//! Dependency lines come in three shapes:
//!
//! ```text
//! author.mod                  any version
//! author.mod >=1.2.0          operator attached to the version
//! author.mod >= 1.2.0         operator and version as separate tokens
//! ```
//!
//! Satisfaction is computed from a [`TargetSnapshot`] captured when the
//! target was last resolved against the host registry.

use std::fmt;

use modman_core::package_id;
use modman_core::registry::{ModIdentity, ModRegistry};
use modman_util::errors::ModmanError;

use crate::version::{ModVersion, VersionRange};

/// What the owner wants from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    DependsOn,
    Incompatible,
    LoadBefore,
    LoadAfter,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::DependsOn,
        DependencyKind::Incompatible,
        DependencyKind::LoadBefore,
        DependencyKind::LoadAfter,
    ];

    /// The manifest element name for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::DependsOn => "dependsOn",
            Self::Incompatible => "incompatibleWith",
            Self::LoadBefore => "loadBefore",
            Self::LoadAfter => "loadAfter",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal urgency of a constraint, lowest first.
///
/// `Notice` is part of the scale but no rule currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Satisfied = 0,
    Notice = 1,
    WrongVersion = 2,
    Unsatisfied = 3,
}

impl Severity {
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// The target's state at the time it was last resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub package_id: String,
    pub name: String,
    pub active: bool,
    /// `None` when the target has no version above `0.0`.
    pub version: Option<ModVersion>,
}

impl TargetSnapshot {
    pub fn of(identity: &ModIdentity, version: Option<ModVersion>) -> Self {
        Self {
            package_id: identity.package_id.clone(),
            name: identity.name.clone(),
            active: identity.active,
            version: version.filter(ModVersion::is_known),
        }
    }
}

/// Human-readable account of a constraint's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    NotFound {
        name: String,
    },
    NotActive {
        name: String,
    },
    WrongVersion {
        name: String,
        version: Option<ModVersion>,
        range: VersionRange,
    },
    Met {
        name: String,
    },
    Conflict {
        name: String,
    },
    Unexpected,
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "{name} is not installed"),
            Self::NotActive { name } => write!(f, "{name} is installed but not active"),
            Self::WrongVersion {
                name,
                version: Some(v),
                range,
            } => write!(f, "{name} v{v} does not satisfy {range}"),
            Self::WrongVersion {
                name,
                version: None,
                range,
            } => write!(f, "{name} has no known version (requires {range})"),
            Self::Met { name } => write!(f, "{name} is active"),
            Self::Conflict { name } => write!(f, "{name} is active and incompatible"),
            Self::Unexpected => f.write_str("Something unexpected happened"),
        }
    }
}

/// A constraint declared by `owner` against `package_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub owner: String,
    pub package_id: String,
    pub display_name: Option<String>,
    pub range: VersionRange,
    /// The legacy alias this constraint was written with, if any.
    pub declared_as: Option<String>,
    target: Option<TargetSnapshot>,
}

impl Dependency {
    /// An unresolved constraint accepting any version of `package_id`.
    pub fn new(kind: DependencyKind, owner: &str, package_id: &str) -> Self {
        Self {
            kind,
            owner: owner.to_string(),
            package_id: package_id::normalize(package_id),
            display_name: None,
            range: VersionRange::any(),
            declared_as: None,
            target: None,
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_range(mut self, range: VersionRange) -> Self {
        self.range = range;
        self
    }

    /// Parse a dependency line and resolve its target against `registry`.
    ///
    /// Ids that don't match the package-id format are looked up as legacy
    /// mod names or identifiers before giving up.
    pub fn parse<R>(
        text: &str,
        kind: DependencyKind,
        owner: &str,
        registry: &R,
    ) -> Result<Self, ModmanError>
    where
        R: ModRegistry + ?Sized,
    {
        let malformed = || ModmanError::MalformedDependency {
            line: text.to_string(),
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(malformed());
        }

        let parts: Vec<&str> = text.split(' ').collect();
        let (raw_id, range) = match parts.as_slice() {
            [id] => (*id, VersionRange::any()),
            [id, range] => (*id, VersionRange::parse(range).map_err(|_| malformed())?),
            [id, op, version] => (
                *id,
                VersionRange::parse(&format!("{op}{version}")).map_err(|_| malformed())?,
            ),
            _ => return Err(malformed()),
        };

        let (id, declared_as) = if package_id::is_valid(raw_id) {
            (package_id::normalize(raw_id), None)
        } else if let Some(id) = registry.package_id_for_alias(raw_id) {
            (id, Some(raw_id.to_string()))
        } else {
            return Err(ModmanError::InvalidPackageId {
                id: raw_id.to_string(),
            });
        };

        let mut dep = Self::new(kind, owner, &id).with_range(range);
        dep.declared_as = declared_as;
        dep.resolve_target(registry);
        Ok(dep)
    }

    /// Look the target up again. The snapshot carries no version; use
    /// [`Dependency::set_target`] when the target's version is known.
    pub fn resolve_target<R>(&mut self, registry: &R)
    where
        R: ModRegistry + ?Sized,
    {
        self.target = if self.package_id.is_empty() {
            None
        } else {
            registry
                .find_by_package_id(&self.package_id)
                .map(|m| TargetSnapshot::of(m, None))
        };
    }

    pub fn set_target(&mut self, target: Option<TargetSnapshot>) {
        self.target = if self.package_id.is_empty() {
            None
        } else {
            target
        };
    }

    pub fn target(&self) -> Option<&TargetSnapshot> {
        self.target.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.target.as_ref().is_some_and(|t| t.active)
    }

    /// Whether the target's version satisfies the range. A target without
    /// a known version only satisfies the unconstrained range.
    pub fn is_in_range(&self) -> bool {
        match &self.target {
            None => false,
            Some(_) if self.range.is_any() => true,
            Some(t) => t.version.as_ref().is_some_and(|v| self.range.matches(v)),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        if self.package_id.is_empty() {
            return false;
        }
        match self.kind {
            DependencyKind::Incompatible => !self.is_active(),
            DependencyKind::DependsOn | DependencyKind::LoadBefore | DependencyKind::LoadAfter => {
                self.is_available() && self.is_active() && self.is_in_range()
            }
        }
    }

    pub fn severity(&self) -> Severity {
        if self.is_satisfied() {
            Severity::Satisfied
        } else if self.is_active() && !self.is_in_range() {
            Severity::WrongVersion
        } else {
            Severity::Unsatisfied
        }
    }

    /// Name to show for the target: declared display name, then the
    /// target's own name, then the package id.
    pub fn target_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.target.as_ref().map(|t| t.name.as_str()))
            .unwrap_or(&self.package_id)
    }

    pub fn explanation(&self) -> Explanation {
        let name = self.target_name().to_string();
        if !self.is_available() {
            Explanation::NotFound { name }
        } else if !self.is_active() {
            Explanation::NotActive { name }
        } else if !self.is_in_range() {
            Explanation::WrongVersion {
                name,
                version: self.target.as_ref().and_then(|t| t.version.clone()),
                range: self.range.clone(),
            }
        } else if self.is_satisfied() {
            Explanation::Met { name }
        } else if self.kind == DependencyKind::Incompatible {
            Explanation::Conflict { name }
        } else {
            Explanation::Unexpected
        }
    }

    pub fn tooltip(&self) -> String {
        self.explanation().to_string()
    }

    /// The constraint in dependency-line form (`<packageId>[ <op><version>]`).
    pub fn to_line(&self) -> String {
        if self.range.is_any() {
            self.package_id.clone()
        } else {
            format!("{} {}", self.package_id, self.range)
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.to_line())
    }
}
