use serde::Deserialize;

/// Which diagnostic producers run.
///
/// ```toml
/// [diagnostics]
/// enabled = true
/// block_tags = true
/// inline_comments = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Master switch; when off no diagnostics are published at all.
    pub enabled: bool,
    /// Unclosed, orphaned, crossed and misplaced block tags.
    pub block_tags: bool,
    /// `#` comments that swallow a closing delimiter.
    pub inline_comments: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            block_tags: true,
            inline_comments: true,
        }
    }
}

impl DiagnosticsSettings {
    #[must_use]
    pub fn block_tags_enabled(&self) -> bool {
        self.enabled && self.block_tags
    }

    #[must_use]
    pub fn inline_comments_enabled(&self) -> bool {
        self.enabled && self.inline_comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_switch_wins() {
        let settings = DiagnosticsSettings {
            enabled: false,
            ..Default::default()
        };
        assert!(!settings.block_tags_enabled());
        assert!(!settings.inline_comments_enabled());
    }

    #[test]
    fn test_partial_table() {
        let settings: DiagnosticsSettings = toml::from_str("inline_comments = false").unwrap();
        assert!(settings.block_tags_enabled());
        assert!(!settings.inline_comments_enabled());
    }
}
