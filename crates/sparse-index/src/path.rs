use crate::error::IndexError;

/// Relative path of a package's index file, following the Cargo index layout:
/// `1/a`, `2/ab`, `3/a/abc`, `se/rd/serde`.
///
/// Names are lowercased. Registry names are ASCII alphanumerics, `-` and `_`;
/// anything else is rejected rather than bucketed.
pub fn index_path(package_name: &str) -> Result<String, IndexError> {
    let is_registry_name = !package_name.is_empty()
        && package_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !is_registry_name {
        return Err(IndexError::InvalidName(package_name.to_string()));
    }

    let name = package_name.to_ascii_lowercase();
    let path = match name.len() {
        len @ (1 | 2) => format!("{len}/{name}"),
        3 => format!("3/{}/{name}", &name[..1]),
        _ => format!("{}/{}/{name}", &name[..2], &name[2..4]),
    };
    Ok(path)
}
