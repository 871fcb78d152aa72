//! Repository URL parsing
//!
//! Project URLs published with packages come in many shapes. Recognized forms,
//! all yielding `owner/repo`:
//!
//! - `https://github.com/owner/repo`
//! - `https://github.com/owner/repo.git`
//! - `https://github.com/owner/repo/tree/main/src` (extra segments ignored)
//! - `git+https://github.com/owner/repo.git`
//! - `git://github.com/owner/repo.git`
//! - `git@github.com:owner/repo.git`

use url::Url;

use nuquery_registry::RepoCoordinates;

/// Extract owner and repository name from a URL pointing at `domain`.
///
/// Returns `None` for other hosts and for URLs without two path segments.
pub fn parse_repository_url(raw: &str, domain: &str) -> Option<RepoCoordinates> {
    let raw = raw.trim();

    // scp-like SSH syntax is not a URL
    if let Some(rest) = raw.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        if !host_matches(host, domain) {
            return None;
        }
        return coordinates_from_path(path);
    }

    let normalized = raw.strip_prefix("git+").unwrap_or(raw);
    let url = Url::parse(normalized).ok()?;
    if !host_matches(url.host_str()?, domain) {
        return None;
    }

    coordinates_from_path(url.path())
}

fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.eq_ignore_ascii_case(domain)
}

fn coordinates_from_path(path: &str) -> Option<RepoCoordinates> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if repo.is_empty() {
        return None;
    }
    Some(RepoCoordinates::new(owner, repo))
}
