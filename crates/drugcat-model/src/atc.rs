use serde::{Deserialize, Serialize};

/// ATC hierarchy of one catalog entry. Levels the code is too short for stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtcNode {
    pub product_id: String,
    pub atc_code: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub level4: String,
    pub level5: String,
    pub valid: bool,
}

impl AtcNode {
    pub fn levels(&self) -> [&str; 5] {
        [
            &self.level1,
            &self.level2,
            &self.level3,
            &self.level4,
            &self.level5,
        ]
    }
}
