//! Container image name sanitation and allow-listing.

/// Strip shell metacharacters the launch helper must never see and trim
/// surrounding whitespace. The helper receives the image as a positional
/// argument, so `;` and `&` are removed outright rather than rejected.
pub fn sanitize_image(raw: &str) -> String {
    raw.replace([';', '&'], "").trim().to_owned()
}

/// Membership check against the allowed-images list.
///
/// An empty list admits any image (absent or empty `allowed_images.txt`).
pub fn image_allowed(allowed: &[String], image: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == image)
}
