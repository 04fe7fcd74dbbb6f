/*!
 * Ordered literal text replacement over subtitle cues.
 *
 * Each rule replaces every occurrence of a literal pattern. Matching is
 * case-insensitive unless the rule says otherwise.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::Track;

/// One (pattern, replacement) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeRule {
    /// Literal text to look for
    pub pattern: String,

    /// Text written in its place
    pub replacement: String,

    /// Ignore letter case when matching
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
}

impl SanitizeRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            case_insensitive: true,
        }
    }

    /// Match letter case exactly
    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Compiled rule set, applied in order
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    rules: Vec<(Regex, String)>,
}

impl Sanitizer {
    /// Compile the rules; empty patterns are ignored
    pub fn new(rules: &[SanitizeRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules.iter().filter(|r| !r.pattern.is_empty()) {
            let regex = RegexBuilder::new(&regex::escape(&rule.pattern))
                .case_insensitive(rule.case_insensitive)
                .build()
                .with_context(|| format!("Invalid sanitize pattern: {}", rule.pattern))?;
            compiled.push((regex, rule.replacement.clone()));
        }

        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to one piece of text
    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, (regex, replacement)| {
            regex.replace_all(&acc, NoExpand(replacement.as_str())).into_owned()
        })
    }

    /// Rewrite each cue's text once; returns how many cues changed
    pub fn apply_to_track(&self, track: &mut Track) -> usize {
        let mut changed = 0;
        for cue in &mut track.cues {
            let sanitized = self.apply(&cue.text);
            if sanitized != cue.text {
                cue.text = sanitized;
                changed += 1;
            }
        }
        changed
    }

    /// Sanitize a track file in place
    pub fn sanitize_file(&self, path: &Path) -> Result<usize> {
        let mut track = Track::load(path)
            .with_context(|| format!("Failed to load subtitles for sanitizing: {}", path.display()))?;
        let changed = self.apply_to_track(&mut track);
        if changed > 0 {
            track.save(path)?;
        }
        debug!("Sanitized {} cue(s) in {}", changed, path.display());
        Ok(changed)
    }
}
