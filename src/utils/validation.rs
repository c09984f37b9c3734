use crate::utils::error::{ReframeError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> ReframeError {
    ReframeError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

/// The grid is saved under `file_name`, so the URL must point at that file.
pub fn validate_grid_url(field: &str, value: &str, file_name: &str) -> Result<()> {
    let url = parse_http_url(field, value)?;
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    if last_segment != file_name {
        return Err(invalid(
            field,
            value,
            format!("URL must end in the grid file name '{}'", file_name),
        ));
    }
    Ok(())
}

/// Base URL of the REFRAME service; direction paths and query are appended.
pub fn validate_service_endpoint(field: &str, value: &str) -> Result<()> {
    let url = parse_http_url(field, value)?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, value, "Endpoint must not carry a query or fragment"));
    }
    Ok(())
}

/// A directory the grid can be read from or written to.
pub fn validate_directory(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Directory cannot be empty"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value, "Path contains null bytes"));
    }
    if std::path::Path::new(value).is_file() {
        return Err(invalid(field, value, "Expected a directory, found a file"));
    }
    Ok(())
}

/// A bare file name, no directory components.
pub fn validate_file_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(field, name, "File name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(invalid(field, name, "Expected a file name, not a path"));
    }
    if name == "." || name == ".." {
        return Err(invalid(field, name, "Expected a file name"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_grid_url() {
        let name = "chenyx06etrs.gsb";
        assert!(validate_grid_url("grid.url", "https://grids.example.com/chenyx06etrs.gsb", name).is_ok());
        assert!(validate_grid_url("grid.url", "http://localhost:8080/a/b/chenyx06etrs.gsb?x=1", name).is_ok());
        assert!(validate_grid_url("grid.url", "", name).is_err());
        assert!(validate_grid_url("grid.url", "invalid-url", name).is_err());
        assert!(validate_grid_url("grid.url", "ftp://example.com/chenyx06etrs.gsb", name).is_err());

        // Landing pages are not grids
        let err = validate_grid_url("grid.url", "https://www.swisstopo.admin.ch/en/download", name).unwrap_err();
        assert!(err.to_string().contains("chenyx06etrs.gsb"));
        assert!(validate_grid_url("grid.url", "https://example.com/", name).is_err());
    }

    #[test]
    fn test_validate_service_endpoint() {
        assert!(validate_service_endpoint("rest.endpoint", "https://geodesy.geo.admin.ch/reframe").is_ok());
        assert!(validate_service_endpoint("rest.endpoint", "http://127.0.0.1:9000/").is_ok());
        assert!(validate_service_endpoint("rest.endpoint", "").is_err());
        assert!(validate_service_endpoint("rest.endpoint", "ftp://example.com").is_err());
        assert!(validate_service_endpoint("rest.endpoint", "https://example.com/reframe?format=json").is_err());
        assert!(validate_service_endpoint("rest.endpoint", "https://example.com/reframe#top").is_err());
    }

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("grid.gsb");
        std::fs::write(&file, b"x").unwrap();

        assert!(validate_directory("grid.local_dir", temp_dir.path().to_str().unwrap()).is_ok());
        assert!(validate_directory("grid.local_dir", "grids/not-yet-created").is_ok());
        assert!(validate_directory("grid.local_dir", "").is_err());
        assert!(validate_directory("grid.local_dir", file.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("grid.file_name", "chenyx06etrs.gsb").is_ok());
        assert!(validate_file_name("grid.file_name", "").is_err());
        assert!(validate_file_name("grid.file_name", "..").is_err());
        assert!(validate_file_name("grid.file_name", "grids/chenyx06etrs.gsb").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("rest.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("rest.timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_range("rest.timeout_seconds", 601u64, 1, 600).is_err());
    }
}
