//! Vertex AI resource helpers.

use mobius_config::constants::DEFAULT_VERTEX_REGION;

/// Region that serves a Vertex resource.
///
/// Index endpoints are regional: the `locations/<r>/` segment of the resource
/// name wins, then the configured location, then `us-central1`.
pub fn region_for_resource(resource: &str, configured_location: Option<&str>) -> String {
    if let Some(region) = location_segment(resource) {
        return region.to_string();
    }
    configured_location
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
        .unwrap_or(DEFAULT_VERTEX_REGION)
        .to_string()
}

// Requires a following '/', so a trailing `locations/x` does not count.
fn location_segment(resource: &str) -> Option<&str> {
    let start = resource.find("/locations/")? + "/locations/".len();
    let rest = &resource[start..];
    let end = rest.find('/')?;
    let region = &rest[..end];
    (!region.is_empty()).then_some(region)
}

/// Regional API host for a Vertex region.
pub fn regional_base_url(region: &str) -> String {
    format!("https://{region}-aiplatform.googleapis.com")
}
