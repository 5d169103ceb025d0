//! Mod versions and single-comparator version ranges.
//!
//! Mod authors write versions in the `major.minor[.build[.revision]]`
//! shape of assembly versions, so parsing is looser than semver: two to
//! four numeric components are accepted. The revision orders versions and
//! decides whether one is known, but ranges compare only the first three
//! components.
//! Ranges are a single comparison (`=`, `>`, `>=`, `<`, `<=`) against a
//! version, backed by [`semver::Comparator`].

use std::fmt;
use std::str::FromStr;

use modman_util::errors::ModmanError;
use semver::{Comparator, Op, Prerelease, Version};

/// A resolved mod version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModVersion {
    version: Version,
    revision: u64,
}

impl ModVersion {
    /// The "no version" sentinel (`0.0`).
    pub const ZERO: ModVersion = ModVersion::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: Version::new(major, minor, patch),
            revision: 0,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Strict parse: two to four dot-separated numeric components.
    pub fn parse(input: &str) -> Result<Self, ModmanError> {
        let err = || ModmanError::VersionParse {
            input: input.to_string(),
        };
        let mut components = [0u64; 4];
        let parts: Vec<&str> = input.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(err());
        }
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            components[i] = part.parse().map_err(|_| err())?;
        }
        Ok(Self::new(components[0], components[1], components[2]).with_revision(components[3]))
    }

    /// Strict parse, retried once with every character other than digits
    /// and dots stripped (`v1.2.3-beta` becomes `1.2.3`).
    pub fn parse_lenient(input: &str) -> Result<Self, ModmanError> {
        Self::parse(input).or_else(|_| {
            let stripped: String = input
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            Self::parse(&stripped).map_err(|_| ModmanError::VersionParse {
                input: input.to_string(),
            })
        })
    }

    /// Lenient parse falling back to [`ModVersion::ZERO`] with a warning.
    pub fn parse_or_zero(input: &str, mod_name: &str) -> Self {
        match Self::parse_lenient(input) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to parse version string for {mod_name}: {e}");
                Self::ZERO
            }
        }
    }

    /// Whether this is a real version (strictly above `0.0`).
    pub fn is_known(&self) -> bool {
        *self > Self::ZERO
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The first three components.
    pub fn as_semver(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        if self.revision != 0 {
            write!(f, ".{}", self.revision)?;
        }
        Ok(())
    }
}

impl FromStr for ModVersion {
    type Err = ModmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for ModVersion {
    fn from(v: Version) -> Self {
        Self::new(v.major, v.minor, v.patch)
    }
}

/// A predicate over mod versions: one operator and one reference version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    comparator: Comparator,
}

impl VersionRange {
    /// The unconstrained range, `>=0.0.0`.
    pub fn any() -> Self {
        Self::from_parts(Op::GreaterEq, &ModVersion::ZERO)
    }

    fn from_parts(op: Op, version: &ModVersion) -> Self {
        Self {
            comparator: Comparator {
                op,
                major: version.major(),
                minor: Some(version.minor()),
                patch: Some(version.patch()),
                pre: Prerelease::EMPTY,
            },
        }
    }

    /// Parse `<op><version>`, e.g. `>=1.2.0`. Whitespace between the
    /// operator and the version is ignored; a bare version means `=`.
    pub fn parse(input: &str) -> Result<Self, ModmanError> {
        let compact: String = input.split_whitespace().collect();
        let (op, rest) = split_operator(&compact);
        let version = ModVersion::parse(rest).map_err(|_| ModmanError::VersionParse {
            input: input.to_string(),
        })?;
        Ok(Self::from_parts(op, &version))
    }

    /// Whether `version` lies inside the range.
    pub fn matches(&self, version: &ModVersion) -> bool {
        self.comparator.matches(version.as_semver())
    }

    /// Whether this range accepts every version.
    pub fn is_any(&self) -> bool {
        *self == Self::any()
    }

    pub fn op(&self) -> Op {
        self.comparator.op
    }

    /// The reference version the operator compares against.
    pub fn version(&self) -> ModVersion {
        ModVersion::new(
            self.comparator.major,
            self.comparator.minor.unwrap_or(0),
            self.comparator.patch.unwrap_or(0),
        )
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

fn split_operator(s: &str) -> (Op, &str) {
    for (prefix, op) in [
        (">=", Op::GreaterEq),
        ("<=", Op::LessEq),
        (">", Op::Greater),
        ("<", Op::Less),
        ("=", Op::Exact),
    ] {
        if let Some(rest) = s.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (Op::Exact, s)
}

fn op_str(op: Op) -> &'static str {
    match op {
        Op::GreaterEq => ">=",
        Op::LessEq => "<=",
        Op::Greater => ">",
        Op::Less => "<",
        _ => "=",
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", op_str(self.op()), self.version())
    }
}

impl FromStr for VersionRange {
    type Err = ModmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
