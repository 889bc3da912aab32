//! Pre-placement admission: everything that can reject a request before
//! any agent is touched.

use deskpool_domain::image::{image_allowed, sanitize_image};
use deskpool_domain::role::UserRole;
use deskpool_wire::execute::ExecuteRequest;

use crate::error::ControllerError;

/// Validate limits, image and role ceiling. Returns the sanitized image
/// the dispatch should carry.
pub fn admit(
    request: &ExecuteRequest,
    role: UserRole,
    allowed_images: &[String],
) -> Result<String, ControllerError> {
    if request.cpu_limit < 1 {
        return Err(ControllerError::Validation(
            "cpu_limit must be at least 1".to_owned(),
        ));
    }
    if request.memory_limit_mb < 256 {
        return Err(ControllerError::Validation(
            "memory_limit_mb must be at least 256".to_owned(),
        ));
    }

    let image = sanitize_image(&request.image);
    if image.is_empty() {
        return Err(ControllerError::Validation(
            "image must be non-empty".to_owned(),
        ));
    }
    if !image_allowed(allowed_images, &image) {
        return Err(ControllerError::ImageNotAllowed(image));
    }

    let limits = role.limits();
    if request.cpu_limit > limits.max_cpu {
        return Err(ControllerError::QuotaExceeded(format!(
            "cpu_limit {} exceeds the {} ceiling of {}",
            request.cpu_limit,
            role.as_str(),
            limits.max_cpu
        )));
    }
    if request.memory_limit_mb > limits.max_ram_mb() {
        return Err(ControllerError::QuotaExceeded(format!(
            "memory_limit_mb {} exceeds the {} ceiling of {}",
            request.memory_limit_mb,
            role.as_str(),
            limits.max_ram_mb()
        )));
    }

    Ok(image)
}
