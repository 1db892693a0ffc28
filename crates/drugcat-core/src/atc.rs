//! ATC code hierarchy decomposition.

use std::sync::LazyLock;

use regex::Regex;

use drugcat_model::{AtcNode, CatalogEntry};

/// Full 7-character codes, the 5-character chemical subgroup and the 3-character group.
static ATC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][0-9]{2}(?:[A-Z][A-Z0-9](?:[0-9]{2})?)?$").expect("Invalid ATC regex")
});

/// Character length at which each of the first four levels becomes available.
const LEVEL_LENGTHS: [usize; 4] = [1, 3, 4, 5];
/// Level 5 is only populated by a complete code.
const FULL_CODE_LEN: usize = 7;

pub fn normalize_atc(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn is_valid_atc(code: &str) -> bool {
    ATC_PATTERN.is_match(code)
}

/// The five level prefixes of a normalized code; too-short levels are empty.
pub fn decompose_atc(code: &str) -> [String; 5] {
    let chars: Vec<char> = code.chars().collect();
    let prefix = |len: usize| -> String {
        if chars.len() >= len {
            chars[..len].iter().collect()
        } else {
            String::new()
        }
    };
    let [l1, l2, l3, l4] = LEVEL_LENGTHS.map(prefix);
    let l5 = if chars.len() >= FULL_CODE_LEN {
        code.to_string()
    } else {
        String::new()
    };
    [l1, l2, l3, l4, l5]
}

pub fn atc_node(product_id: &str, raw_code: &str) -> AtcNode {
    let atc_code = normalize_atc(raw_code);
    let [level1, level2, level3, level4, level5] = decompose_atc(&atc_code);
    AtcNode {
        product_id: product_id.to_string(),
        valid: is_valid_atc(&atc_code),
        atc_code,
        level1,
        level2,
        level3,
        level4,
        level5,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtcStats {
    pub nodes: usize,
    pub empty: usize,
    /// Non-empty codes failing the shape check.
    pub invalid: usize,
}

/// One node per catalog entry, in catalog order.
pub fn build_atc_nodes(catalog: &[CatalogEntry]) -> (Vec<AtcNode>, AtcStats) {
    let nodes: Vec<AtcNode> = catalog
        .iter()
        .map(|entry| atc_node(&entry.product_id, &entry.atc_code))
        .collect();
    let empty = nodes.iter().filter(|n| n.atc_code.is_empty()).count();
    let invalid = nodes
        .iter()
        .filter(|n| !n.atc_code.is_empty() && !n.valid)
        .count();
    let stats = AtcStats {
        nodes: nodes.len(),
        empty,
        invalid,
    };
    (nodes, stats)
}
