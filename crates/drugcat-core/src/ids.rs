//! Product identifier synthesis.
//!
//! Rows carrying an explicit id keep it. Rows without one get
//! `pid_` + the first `digest_len` hex characters of
//! `sha256(trade_name | dosage_form | pack)` over the canonical values, so the
//! same product always receives the same id. A `|` or `\` inside a value is
//! escaped with `\` before joining, keeping distinct triples distinct. Truncation
//! makes collisions between distinct triples possible; a longer digest makes
//! them rarer.

use sha2::{Digest, Sha256};

use crate::error::PipelineError;

pub const PRODUCT_ID_PREFIX: &str = "pid_";
pub const ID_SEPARATOR: char = '|';
const ESCAPE: char = '\\';
pub const DEFAULT_DIGEST_LEN: usize = 16;
pub const MIN_DIGEST_LEN: usize = 8;
/// Full SHA-256 in hex.
pub const MAX_DIGEST_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSynthesizer {
    digest_len: usize,
}

impl IdSynthesizer {
    pub fn new(digest_len: usize) -> Result<Self, PipelineError> {
        if !(MIN_DIGEST_LEN..=MAX_DIGEST_LEN).contains(&digest_len) {
            return Err(PipelineError::InvalidOptions(format!(
                "digest length {digest_len} outside {MIN_DIGEST_LEN}..={MAX_DIGEST_LEN}"
            )));
        }
        Ok(Self { digest_len })
    }

    /// Deterministic id for a canonical `(trade_name, dosage_form, pack)` triple.
    pub fn synthesize(&self, trade_name: &str, dosage_form: &str, pack: &str) -> String {
        let mut joined = String::new();
        for (index, field) in [trade_name, dosage_form, pack].into_iter().enumerate() {
            if index > 0 {
                joined.push(ID_SEPARATOR);
            }
            push_escaped(&mut joined, field);
        }
        let digest = Sha256::digest(joined.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(self.digest_len);
        format!("{PRODUCT_ID_PREFIX}{hex}")
    }

    /// The trimmed explicit id when present, otherwise a synthesized one.
    pub fn resolve(
        &self,
        explicit: &str,
        trade_name: &str,
        dosage_form: &str,
        pack: &str,
    ) -> ProductId {
        let explicit = explicit.trim();
        if explicit.is_empty() {
            ProductId::Synthesized(self.synthesize(trade_name, dosage_form, pack))
        } else {
            ProductId::Explicit(explicit.to_string())
        }
    }
}

fn push_escaped(out: &mut String, field: &str) {
    for c in field.chars() {
        if c == ID_SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

impl Default for IdSynthesizer {
    fn default() -> Self {
        Self {
            digest_len: DEFAULT_DIGEST_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductId {
    Explicit(String),
    Synthesized(String),
}

impl ProductId {
    pub fn is_synthesized(&self) -> bool {
        matches!(self, Self::Synthesized(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Explicit(id) | Self::Synthesized(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn explicit_ids_are_kept_verbatim() {
        let ids = IdSynthesizer::default();
        assert_eq!(
            ids.resolve("  4607001234567 ", "A", "B", "C"),
            ProductId::Explicit("4607001234567".to_string())
        );
    }

    #[test]
    fn synthesized_id_shape() {
        let ids = IdSynthesizer::default();
        let id = ids.synthesize("Нурофен", "таблетки", "№10");
        assert!(id.starts_with(PRODUCT_ID_PREFIX));
        assert_eq!(id.len(), PRODUCT_ID_PREFIX.len() + DEFAULT_DIGEST_LEN);
        assert!(id[PRODUCT_ID_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn separator_keeps_fields_apart() {
        let ids = IdSynthesizer::default();
        assert_ne!(ids.synthesize("ab", "c", ""), ids.synthesize("a", "bc", ""));
    }

    #[test]
    fn separator_inside_a_value_does_not_collide() {
        let ids = IdSynthesizer::default();
        assert_ne!(ids.synthesize("A|B", "C", ""), ids.synthesize("A", "B|C", ""));
        assert_ne!(ids.synthesize("A\\", "|B", ""), ids.synthesize("A\\|", "B", ""));
    }

    #[test]
    fn plain_values_hash_the_joined_triple() {
        let ids = IdSynthesizer::new(MAX_DIGEST_LEN).unwrap();
        let expected = hex::encode(Sha256::digest("Нурофен|таблетки|№10".as_bytes()));
        assert_eq!(
            ids.synthesize("Нурофен", "таблетки", "№10"),
            format!("{PRODUCT_ID_PREFIX}{expected}")
        );
    }

    #[test]
    fn shorter_digest_is_a_prefix_of_longer() {
        let short = IdSynthesizer::new(8).unwrap().synthesize("A", "B", "C");
        let long = IdSynthesizer::new(MAX_DIGEST_LEN).unwrap().synthesize("A", "B", "C");
        assert!(long.starts_with(&short));
    }

    #[test]
    fn digest_len_is_bounded() {
        assert!(IdSynthesizer::new(4).is_err());
        assert!(IdSynthesizer::new(65).is_err());
    }

    proptest! {
        #[test]
        fn synthesis_is_deterministic(trade in ".{0,24}", form in ".{0,16}", pack in ".{0,16}") {
            let a = IdSynthesizer::default();
            let b = IdSynthesizer::new(DEFAULT_DIGEST_LEN).unwrap();
            prop_assert_eq!(
                a.synthesize(&trade, &form, &pack),
                b.synthesize(&trade, &form, &pack)
            );
        }
    }
}
