use std::fmt::{self, Display};
use std::str::FromStr;

use serde::Serialize;

use super::error::ConfigurationError;


/// The configuration format this crate understands.
pub const SUPPORTED_FORMAT_VERSION: &str = "2.0";


/// A `MAJOR.MINOR` configuration format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// A document written for `self` can be read by a loader supporting `supported`
    /// when the major versions are equal and the minor version is not older.
    pub fn is_compatible_with(&self, supported: &FormatVersion) -> bool {
        self.major == supported.major && self.minor >= supported.minor
    }
}

impl FromStr for FormatVersion {
    type Err = ();

    /// Components after the minor one (e.g. the `3` in `2.1.3`) are ignored.
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let mut components = version.trim().split('.');

        let major = components.next().and_then(parse_component).ok_or(())?;
        let minor = components.next().and_then(parse_component).ok_or(())?;

        Ok(Self { major, minor })
    }
}

/// Plain decimal digits without sign or leading zeros (`0` itself is fine).
fn parse_component(component: &str) -> Option<u32> {
    let is_canonical = !component.is_empty()
        && component.bytes().all(|byte| byte.is_ascii_digit())
        && (component == "0" || !component.starts_with('0'));

    if !is_canonical {
        return None;
    }

    component.parse().ok()
}

impl Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}


/// Checks a document's `format_version` string against [`SUPPORTED_FORMAT_VERSION`].
pub fn check_format_version(version: &str) -> Result<FormatVersion, ConfigurationError> {
    check_format_version_against(version, SUPPORTED_FORMAT_VERSION)
}

pub(crate) fn check_format_version_against(
    version: &str,
    supported: &'static str,
) -> Result<FormatVersion, ConfigurationError> {
    let unsupported = || ConfigurationError::UnsupportedVersion {
        found: version.to_owned(),
        supported,
    };

    let supported_version = supported.parse::<FormatVersion>().map_err(|_| unsupported())?;
    let document_version = version.parse::<FormatVersion>().map_err(|_| unsupported())?;

    if !document_version.is_compatible_with(&supported_version) {
        return Err(unsupported());
    }

    Ok(document_version)
}
