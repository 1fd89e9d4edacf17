use std::ffi::OsStr;

/// Return true if the file name ends with `suffix`. The match is exact and
/// case-sensitive, so `.geojson` does not match `REGION.GEOJSON`.
pub fn has_suffix(file_name: &OsStr, suffix: &str) -> bool {
    file_name.to_string_lossy().ends_with(suffix)
}
