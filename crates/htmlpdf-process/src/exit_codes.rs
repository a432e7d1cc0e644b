use std::collections::BTreeSet;

/// wkhtmltopdf exits 1 when the document rendered but some assets failed to
/// load.
pub const MISSING_ASSETS_EXIT_CODE: i32 = 1;

/// Exit codes treated as success. Always contains 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptableExitCodes {
    codes: BTreeSet<i32>,
}

impl Default for AcceptableExitCodes {
    fn default() -> Self {
        Self {
            codes: BTreeSet::from([0]),
        }
    }
}

impl AcceptableExitCodes {
    /// Build from an arbitrary list; 0 is added if missing.
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        let mut set = Self::default();
        set.codes.extend(codes);
        set
    }

    pub fn insert(&mut self, code: i32) {
        self.codes.insert(code);
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }

    pub fn allow_missing_assets(&mut self) {
        self.insert(MISSING_ASSETS_EXIT_CODE);
    }

    pub fn allows_missing_assets(&self) -> bool {
        self.contains(MISSING_ASSETS_EXIT_CODE)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.codes.iter().copied()
    }
}
