use std::env;

/// Environment variable read by [`Limits::from_env`].
pub const MAX_DEPTH_VAR: &str = "SEXPR_MAX_DEPTH";

/// Resource limits shared by the parser and the evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Deepest nesting of parentheses/quotes the parser accepts, and deepest
    /// chain of nested applications the evaluator will follow.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_depth: 512 }
    }
}

impl Limits {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Defaults, overridden by `SEXPR_MAX_DEPTH` when it is set.
    pub fn from_env() -> Result<Self, String> {
        let mut limits = Limits::default();
        match env::var(MAX_DEPTH_VAR) {
            Ok(raw) => {
                limits.max_depth = raw.trim().parse().map_err(|_| {
                    format!("{} must be a non-negative integer, got {:?}", MAX_DEPTH_VAR, raw)
                })?;
            }
            Err(env::VarError::NotPresent) => {}
            Err(e) => return Err(format!("{}: {}", MAX_DEPTH_VAR, e)),
        }
        Ok(limits)
    }
}
