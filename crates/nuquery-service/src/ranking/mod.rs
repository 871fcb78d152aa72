//! Search result scoring, filtering and ordering

use nuquery_core::types::PackageMetadata;

use crate::responses::SearchHit;

const VERIFIED_WEIGHT: f64 = 0.4;
const AUTHORS_WEIGHT: f64 = 0.3;
const DESCRIPTION_WEIGHT: f64 = 0.3;

/// Quality in 0..=1 from the verified flag, listed authors and a description
pub fn quality_score(metadata: &PackageMetadata) -> f64 {
    let mut score = 0.0;
    if metadata.verified {
        score += VERIFIED_WEIGHT;
    }
    if metadata.authors.iter().any(|a| !a.trim().is_empty()) {
        score += AUTHORS_WEIGHT;
    }
    if !metadata.description_text().is_empty() {
        score += DESCRIPTION_WEIGHT;
    }
    score.min(1.0)
}

/// Map registry hits, apply thresholds, and sort by downloads (descending).
///
/// Popularity is relative to the most downloaded hit in `results`, measured
/// before any filtering.
pub fn rank_results(
    results: Vec<PackageMetadata>,
    quality: Option<f64>,
    popularity: Option<f64>,
) -> Vec<SearchHit> {
    let max_downloads = results.iter().map(|m| m.total_downloads).max().unwrap_or(0);

    let mut hits: Vec<SearchHit> = results
        .into_iter()
        .map(|metadata| {
            let popularity_score = if max_downloads == 0 {
                0.0
            } else {
                metadata.total_downloads as f64 / max_downloads as f64
            };
            SearchHit {
                quality_score: quality_score(&metadata),
                popularity_score,
                description: metadata.description_text().to_string(),
                package_id: metadata.id,
                version: metadata.version,
                authors: metadata.authors,
                tags: metadata.tags,
                total_downloads: metadata.total_downloads,
                verified: metadata.verified,
                project_url: metadata.project_url,
            }
        })
        .filter(|hit| quality.map_or(true, |min| hit.quality_score >= min))
        .filter(|hit| popularity.map_or(true, |min| hit.popularity_score >= min))
        .collect();

    // stable: equal download counts keep registry order
    hits.sort_by(|a, b| b.total_downloads.cmp(&a.total_downloads));
    hits
}
