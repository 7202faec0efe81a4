pub mod enterprise;
pub mod phyto_analysis;
pub mod species;
pub mod specimen;
pub mod user;

/// Coerce empty strings to absent. Optional record fields must not collapse
/// "empty" and "missing" at the storage boundary; normalization happens once,
/// before search and before create.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_become_absent() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(String::new())), None);
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional(Some("x".to_string())),
            Some("x".to_string())
        );
    }
}
