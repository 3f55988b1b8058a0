use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};

/// Include pattern meaning "match everything"
pub const MATCH_ALL: &str = "*";

/// Include/exclude glob rules restricting which relative paths take part in a sync
///
/// A pattern is one of:
/// - a bare filename glob (`*.proto`, `README*`), tested against the final path segment
/// - a path glob containing `/` (`api/*/v1.proto`), tested against the whole relative path
/// - an extension shorthand (`*.ext`), additionally tested by extension equality
///
/// `*` never crosses a `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    /// Patterns a file must match to be included
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Patterns that remove a file (or a whole directory) regardless of `include`
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec![MATCH_ALL.to_string()]
}

impl Default for PatternSet {
    fn default() -> Self {
        PatternSet {
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

impl PatternSet {
    /// Create a pattern set from include and exclude lists
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        PatternSet { include, exclude }
    }

    /// Compile the patterns once for repeated matching
    pub fn matcher(&self) -> PatternMatcher {
        PatternMatcher::new(self)
    }

    /// Exclusion first, then inclusion
    pub fn allows(&self, path: &str) -> bool {
        self.matcher().allows(path)
    }
}

/// One compiled pattern
#[derive(Debug, Clone)]
struct CompiledPattern {
    /// `None` when the glob failed to compile; such a pattern matches nothing
    glob: Option<GlobMatcher>,
    /// Pattern contains a separator and is also tested against the full path
    has_separator: bool,
    /// `.ext` part of a `*.ext` pattern
    extension: Option<String>,
}

impl CompiledPattern {
    fn compile(pattern: &str) -> Self {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map(|g| g.compile_matcher())
            .map_err(|e| log::debug!("Ignoring malformed pattern '{pattern}': {e}"))
            .ok();

        let extension = pattern
            .strip_prefix('*')
            .filter(|rest| rest.starts_with('.'))
            .map(str::to_string);

        CompiledPattern {
            glob,
            has_separator: pattern.contains('/'),
            extension,
        }
    }

    /// Base-name glob or full-path glob (exclusion uses only these two)
    fn matches_glob(&self, path: &str) -> bool {
        let Some(glob) = &self.glob else {
            return false;
        };

        if glob.is_match(base_name(path)) {
            return true;
        }

        self.has_separator && glob.is_match(path)
    }

    /// Any of the three include tests
    fn matches_include(&self, path: &str) -> bool {
        if self.matches_glob(path) {
            return true;
        }

        match &self.extension {
            Some(ext) => extension(path) == Some(ext.as_str()),
            None => false,
        }
    }
}

/// Pre-compiled form of a [`PatternSet`]
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    include: Vec<CompiledPattern>,
    exclude: Vec<CompiledPattern>,
    match_all: bool,
}

impl PatternMatcher {
    /// Compile every pattern of the set
    pub fn new(patterns: &PatternSet) -> Self {
        PatternMatcher {
            include: patterns
                .include
                .iter()
                .map(|p| CompiledPattern::compile(p))
                .collect(),
            exclude: patterns
                .exclude
                .iter()
                .map(|p| CompiledPattern::compile(p))
                .collect(),
            match_all: is_match_all(&patterns.include),
        }
    }

    /// Whether the path satisfies the include patterns
    pub fn is_included(&self, path: &str) -> bool {
        self.match_all || self.include.iter().any(|p| p.matches_include(path))
    }

    /// Whether the path is removed by the exclude patterns
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches_glob(path))
    }

    /// Exclusion short-circuits before inclusion is evaluated
    pub fn allows(&self, path: &str) -> bool {
        !self.is_excluded(path) && self.is_included(path)
    }
}

/// Check whether a relative path matches any include pattern
///
/// An empty list, or a list holding only `*`, matches every path.
pub fn matches(path: &str, include_patterns: &[String]) -> bool {
    if is_match_all(include_patterns) {
        return true;
    }

    include_patterns
        .iter()
        .any(|p| CompiledPattern::compile(p).matches_include(path))
}

/// Check whether a relative path matches any exclude pattern
pub fn is_excluded(path: &str, exclude_patterns: &[String]) -> bool {
    exclude_patterns
        .iter()
        .any(|p| CompiledPattern::compile(p).matches_glob(path))
}

fn is_match_all(include_patterns: &[String]) -> bool {
    include_patterns.is_empty() || (include_patterns.len() == 1 && include_patterns[0] == MATCH_ALL)
}

/// Final `/`-separated segment of a relative path
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the final segment including the leading dot
fn extension(path: &str) -> Option<&str> {
    let name = base_name(path);
    name.rfind('.').map(|idx| &name[idx..])
}

/// Split a comma-separated pattern list, dropping blanks
pub fn parse_pattern_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
