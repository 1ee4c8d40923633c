//! Seed parser with validation
//!
//! Parses YAML and validates the schema version and taxon code uniqueness

use crate::errors::{seed_validation, Result};
use crate::seed::format::TaxonomySeed;
use navtree_core::taxonomy::TaxonTree;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<TaxonomySeed> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file: {}", e)))?;

    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<TaxonomySeed> {
    let seed: TaxonomySeed = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed)?;

    Ok(seed)
}

fn validate_seed(seed: &TaxonomySeed) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    if seed.taxonomies.is_empty() {
        return Err(seed_validation("Seed contains no taxonomies"));
    }

    // Codes are unique across every tree in the file
    let mut codes = HashSet::new();
    for tree in &seed.taxonomies {
        check_codes(tree, &mut codes)?;
    }

    Ok(())
}

fn check_codes<'a>(tree: &'a TaxonTree, codes: &mut HashSet<&'a str>) -> Result<()> {
    if tree.code.trim().is_empty() {
        return Err(seed_validation(&format!(
            "Empty taxon code (name '{}')",
            tree.name
        )));
    }
    if !codes.insert(tree.code.as_str()) {
        return Err(seed_validation(&format!(
            "Duplicate taxon code {}",
            tree.code
        )));
    }
    for child in &tree.children {
        check_codes(child, codes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_seed() {
        let seed = parse_seed_str(
            r#"
schema_version: 0
taxonomies:
  - code: catalog
    name: Catalog
"#,
        )
        .unwrap();

        assert_eq!(seed.taxonomies.len(), 1);
        assert!(seed.taxonomies[0].children.is_empty());
    }

    #[test]
    fn test_wrong_schema_version() {
        let err = parse_seed_str("schema_version: 1\ntaxonomies: [{code: a, name: A}]")
            .unwrap_err();
        assert!(err.message().contains("schema_version"));
    }

    #[test]
    fn test_duplicate_code_across_trees() {
        let err = parse_seed_str(
            r#"
schema_version: 0
taxonomies:
  - code: a
    name: A
  - code: b
    name: B
    children:
      - code: a
        name: Again
"#,
        )
        .unwrap_err();
        assert!(err.message().contains("Duplicate taxon code a"));
    }
}
