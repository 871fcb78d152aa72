//! Terminal output formatting.
//!
//! Command results go to stdout; status messages go to stderr so that piping
//! `nuquery content` into a file captures only the document.

pub mod colors;
pub mod errors;

use std::fmt::Write as _;

use nuquery_core::types::DependencyGroup;
use nuquery_service::{ContentResponse, InfoResponse, SearchResponse};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn with_colors(colors: colors::ColorSupport) -> Self {
        Self { colors }
    }

    /// Print a command result
    pub fn print(&self, text: &str) {
        println!("{}", text.trim_end());
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", self.colors.dim(message));
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// The resolved document, followed by where it came from
    pub fn render_content(&self, response: &ContentResponse) -> String {
        let mut out = String::new();
        out.push_str(response.content.trim_end());
        out.push('\n');

        if let Some(source) = response.content_source {
            let _ = write!(
                out,
                "\n{}",
                self.colors.dim(&format!(
                    "{} {} ({} content, {} examples)",
                    response.package_id,
                    response.version,
                    source,
                    response.examples.len()
                ))
            );
            out.push('\n');
        }
        out
    }

    pub fn render_info(&self, response: &InfoResponse) -> String {
        if !response.exists {
            return format!("{}\n", response.description);
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}{}",
            self.colors.bold(&response.package_id),
            response.latest_version,
            if response.verified { " ✓" } else { "" }
        );
        if !response.description.is_empty() {
            let _ = writeln!(out, "{}", response.description);
        }
        out.push('\n');

        self.field(&mut out, "authors", &response.authors.join(", "));
        self.field(&mut out, "license", response.license.as_deref().unwrap_or("-"));
        self.field(&mut out, "tags", &response.tags.join(", "));
        self.field(&mut out, "downloads", &response.downloads.to_string());
        self.field(&mut out, "versions", &response.versions_count.to_string());
        if let Some(url) = &response.project_url {
            self.field(&mut out, "project", url);
        }
        self.field(&mut out, "install", &response.installation.dotnet_cli);

        if let Some(groups) = &response.dependencies {
            self.dependency_section(&mut out, "Dependencies", groups);
        }
        if let Some(groups) = &response.dev_dependencies {
            self.dependency_section(&mut out, "Development dependencies", groups);
        }
        out
    }

    pub fn render_search(&self, response: &SearchResponse) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} result(s) for '{}'",
            response.total_count, response.query
        );

        for hit in &response.results {
            let _ = writeln!(
                out,
                "\n{} {} {}",
                self.colors.bold(&hit.package_id),
                hit.version,
                self.colors.dim(&format!(
                    "({} downloads, quality {:.2}, popularity {:.2})",
                    hit.total_downloads, hit.quality_score, hit.popularity_score
                ))
            );
            if !hit.description.is_empty() {
                let _ = writeln!(out, "  {}", hit.description);
            }
        }
        out
    }

    fn field(&self, out: &mut String, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let _ = writeln!(out, "{:<10} {}", self.colors.dim(name), value);
    }

    fn dependency_section(&self, out: &mut String, title: &str, groups: &[DependencyGroup]) {
        let _ = writeln!(out, "\n{}", self.colors.bold(title));
        if groups.iter().all(|g| g.dependencies.is_empty()) {
            out.push_str("  (none)\n");
            return;
        }

        for group in groups {
            let _ = writeln!(
                out,
                "  {}",
                group.target_framework.as_deref().unwrap_or("any framework")
            );
            for dependency in &group.dependencies {
                let _ = writeln!(
                    out,
                    "    {} {}",
                    dependency.id,
                    dependency.range.as_deref().unwrap_or("")
                );
            }
        }
    }
}
