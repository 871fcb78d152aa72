//! Version helpers.
//!
//! The registry publishes each package's versions in ascending order, so
//! "latest" is picked positionally rather than by parsing and comparing.

/// The literal accepted in place of a concrete version
pub const LATEST: &str = "latest";

/// Check if a version string carries a prerelease label (`1.0.0-beta.1`)
pub fn is_prerelease(version: &str) -> bool {
    let core = version.split('+').next().unwrap_or(version);
    core.contains('-')
}

/// Newest stable version, or the newest prerelease when nothing is stable.
///
/// `versions` must be sorted ascending.
pub fn select_latest(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .rev()
        .find(|v| !is_prerelease(v))
        .or_else(|| versions.last())
        .map(String::as_str)
}

/// Find `requested` in `versions`, ignoring case and build metadata
pub fn find_version<'a>(versions: &'a [String], requested: &str) -> Option<&'a str> {
    let wanted = strip_metadata(requested);
    versions
        .iter()
        .find(|v| strip_metadata(v).eq_ignore_ascii_case(wanted))
        .map(String::as_str)
}

fn strip_metadata(version: &str) -> &str {
    version.split('+').next().unwrap_or(version)
}
