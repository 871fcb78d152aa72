//! Markdown documents built from package metadata
//!
//! Used when no README exists anywhere. Both builders are pure.

use nuquery_core::types::{dotnet_add_command, PackageManifest, PackageMetadata};

/// Minimal document from baseline metadata; never empty
pub fn document_from_metadata(metadata: &PackageMetadata) -> String {
    let mut sections = vec![format!("# {}", metadata.display_title())];

    let description = metadata.description_text();
    if !description.is_empty() {
        sections.push(description.to_string());
    }

    sections.push(installation_section(&metadata.id));
    push_people_and_tags(&mut sections, &metadata.authors, &metadata.tags);

    if let Some(url) = metadata.project_url.as_deref().filter(|u| !u.trim().is_empty()) {
        sections.push(format!("## Links\n\n- [Project site]({})", url.trim()));
    }

    finish(sections)
}

/// Document from the registry's full manifest
pub fn document_from_manifest(manifest: &PackageManifest) -> String {
    let mut sections = vec![format!("# {}", manifest.display_title())];

    if let Some(summary) = present(manifest.summary.as_deref()) {
        sections.push(format!("> {}", summary));
    }

    let description = manifest.description_text();
    if !description.is_empty() {
        sections.push(description.to_string());
    }

    sections.push(installation_section(&manifest.id));
    push_people_and_tags(&mut sections, &manifest.authors, &manifest.tags);

    if let Some(notes) = present(manifest.release_notes.as_deref()) {
        sections.push(format!("## Release Notes\n\n{}", notes));
    }

    if let Some(license) = manifest.license() {
        sections.push(format!("## License\n\n{}", license));
    }

    if let Some(url) = present(manifest.project_url.as_deref()) {
        sections.push(format!("## Links\n\n- [Project site]({})", url));
    }

    finish(sections)
}

fn installation_section(package_id: &str) -> String {
    format!("## Installation\n\n```bash\n{}\n```", dotnet_add_command(package_id))
}

fn push_people_and_tags(sections: &mut Vec<String>, authors: &[String], tags: &[String]) {
    if !authors.is_empty() {
        sections.push(format!("## Authors\n\n{}", authors.join(", ")));
    }

    if !tags.is_empty() {
        let tags: Vec<String> = tags.iter().map(|t| format!("`{}`", t)).collect();
        sections.push(format!("## Tags\n\n{}", tags.join(" ")));
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn finish(sections: Vec<String>) -> String {
    let mut document = sections.join("\n\n");
    document.push('\n');
    document
}
