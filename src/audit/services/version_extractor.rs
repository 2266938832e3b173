//! Recovers the concrete version a yarn lock file pinned for a package.
//!
//! The lock file is indexed once into blocks (one header line with one or
//! more comma-separated specifiers, followed by indented fields). Extraction
//! then locates the block(s) for a package and runs the strategies in
//! [`ExtractionStrategy::ORDERED`] until one yields a concrete version.

use thiserror::Error;

/// Extraction failures. Both are fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no lock file entry found for \"{name}\"")]
    BlockNotFound { name: String },

    #[error("lock file entry for \"{name}\" does not pin a concrete version")]
    VersionNotFound { name: String },
}

/// One lock file entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockBlock {
    specifiers: Vec<String>,
    fields: Vec<String>,
}

impl LockBlock {
    fn from_lines(header: &str, body: &[&str]) -> Self {
        let header = header.trim_end();
        let header = header.strip_suffix(':').unwrap_or(header);
        let specifiers = header
            .split(',')
            .map(|spec| spec.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|spec| !spec.is_empty())
            .collect();

        // Only top-level fields; nested maps such as `dependencies:` are indented deeper.
        let top_indent = body.iter().map(|line| indentation(line)).min().unwrap_or(0);
        let fields = body
            .iter()
            .filter(|line| indentation(line) == top_indent)
            .map(|line| line.trim().to_string())
            .collect();

        Self { specifiers, fields }
    }

    pub fn specifiers(&self) -> &[String] {
        &self.specifiers
    }

    /// Range part of each specifier naming `name` (`lodash@^4.0.0` -> `^4.0.0`).
    fn ranges_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.specifiers
            .iter()
            .filter_map(move |spec| specifier_range(spec, name))
    }

    fn names(&self, name: &str) -> bool {
        self.ranges_for(name).next().is_some()
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| {
            let rest = field.trim_start_matches('"').strip_prefix(key)?;
            let rest = rest.strip_prefix('"').unwrap_or(rest);
            if !(rest.starts_with(':') || rest.starts_with(' ')) {
                return None;
            }
            Some(rest.trim_start_matches(':').trim())
        })
    }
}

/// Read-only view over lock file text, built once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFileIndex {
    blocks: Vec<LockBlock>,
}

impl LockFileIndex {
    pub fn parse(content: &str) -> Self {
        let mut blocks = Vec::new();
        let mut header: Option<&str> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in content.lines() {
            let is_indented = line.starts_with(' ') || line.starts_with('\t');
            if is_indented && header.is_some() && !line.trim().is_empty() {
                body.push(line);
                continue;
            }

            if let Some(done) = header.take() {
                blocks.push(LockBlock::from_lines(done, &body));
                body.clear();
            }

            let trimmed = line.trim_end();
            if !is_indented && !trimmed.starts_with('#') && trimmed.ends_with(':') {
                header = Some(trimmed);
            }
        }
        if let Some(done) = header {
            blocks.push(LockBlock::from_lines(done, &body));
        }

        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks whose header names `name`, in file order.
    pub fn blocks_for(&self, name: &str) -> Vec<&LockBlock> {
        self.blocks.iter().filter(|block| block.names(name)).collect()
    }
}

/// Named version matchers, tried in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `resolution: "name@npm:1.2.3"`.
    Resolution,
    /// `version "1.2.3"` (classic) or `version: 1.2.3` (berry).
    VersionField,
    /// Version embedded in the header specifier, e.g. `name@npm:1.2.3` or `name@<git-url>#v1.2.3`.
    SpecEmbedded,
}

impl ExtractionStrategy {
    pub const ORDERED: [ExtractionStrategy; 3] = [
        ExtractionStrategy::Resolution,
        ExtractionStrategy::VersionField,
        ExtractionStrategy::SpecEmbedded,
    ];

    pub fn apply(&self, name: &str, block: &LockBlock) -> Option<String> {
        match self {
            ExtractionStrategy::Resolution => {
                let locator = unquote(block.field("resolution")?);
                let reference = specifier_range(locator, name)?;
                reference_version(reference)
            }
            ExtractionStrategy::VersionField => {
                let value = unquote(block.field("version")?);
                concrete_version(value)
            }
            ExtractionStrategy::SpecEmbedded => {
                block.ranges_for(name).find_map(reference_version)
            }
        }
    }
}

/// Extracts the resolved version of `name` from the lock file.
///
/// When several blocks name the package, the one whose specifier matches the
/// effective range (override if present, declared otherwise) is used, then a
/// block whose extracted version equals that range, then the first block.
pub fn extract(
    index: &LockFileIndex,
    name: &str,
    declared_range: &str,
    override_range: Option<&str>,
) -> Result<String, ExtractError> {
    let candidates = index.blocks_for(name);
    if candidates.is_empty() {
        return Err(ExtractError::BlockNotFound {
            name: name.to_string(),
        });
    }

    let effective = override_range
        .map(|range| decode_patch_range(range).unwrap_or_else(|| range.to_string()))
        .unwrap_or_else(|| declared_range.to_string());

    let block = select_block(&candidates, name, &effective);
    ExtractionStrategy::ORDERED
        .iter()
        .find_map(|strategy| {
            let version = strategy.apply(name, block)?;
            tracing::debug!(package = name, ?strategy, %version, "resolved from lock file");
            Some(version)
        })
        .ok_or_else(|| ExtractError::VersionNotFound {
            name: name.to_string(),
        })
}

fn select_block<'a>(candidates: &[&'a LockBlock], name: &str, range: &str) -> &'a LockBlock {
    let wanted = strip_npm_protocol(range);

    candidates
        .iter()
        .find(|block| {
            block.ranges_for(name).any(|spec_range| {
                let spec_range = strip_npm_protocol(spec_range);
                spec_range == wanted
                    || (spec_range.starts_with("patch:")
                        && reference_version(spec_range).as_deref() == Some(wanted))
            })
        })
        .or_else(|| {
            candidates.iter().find(|block| {
                ExtractionStrategy::ORDERED
                    .iter()
                    .find_map(|strategy| strategy.apply(name, block))
                    .as_deref()
                    == Some(wanted)
            })
        })
        .copied()
        .unwrap_or(candidates[0])
}

/// Decodes `patch:name@npm%3A1.2.3#./patches/...` into `1.2.3`.
pub fn decode_patch_range(range: &str) -> Option<String> {
    if !range.starts_with("patch:") {
        return None;
    }
    let (_, encoded) = range.split_once("@npm%3A")?;
    let version = encoded.split('#').next()?;
    concrete_version(version)
}

/// Range part of `spec` when it names `name`, tolerating a `patch:` prefix.
fn specifier_range<'a>(spec: &'a str, name: &str) -> Option<&'a str> {
    let spec = spec.strip_prefix("patch:").unwrap_or(spec);
    spec.strip_prefix(name)?.strip_prefix('@')
}

/// Concrete version carried by a specifier reference, if any.
fn reference_version(reference: &str) -> Option<String> {
    let reference = strip_npm_protocol(reference);

    if reference.starts_with("patch:") {
        return decode_patch_range(reference);
    }

    if let Some((location, fragment)) = reference.split_once('#') {
        if location.contains("://") || location.starts_with("git") {
            return concrete_version(fragment);
        }
    }

    // npm alias: `npm:other-package@1.2.3`
    if !reference.starts_with(|c: char| c.is_ascii_digit() || c == 'v') {
        if let Some((_, aliased)) = reference.rsplit_once('@') {
            return concrete_version(aliased);
        }
    }

    concrete_version(reference)
}

/// Takes the leading version token of `raw` when it is an exact version.
///
/// Accepts `1.2.3`, `v1.2.3`, `4.0.0-beta.0`, `7.0.0-dev.20250703.1`, `6.1.4-1`,
/// and ignores trailing `&hash=...` or `#...` suffixes. Ranges are rejected.
fn concrete_version(raw: &str) -> Option<String> {
    let raw = match raw.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => raw,
    };
    if !raw.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let end = raw
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(raw.len());
    let token = raw[..end].trim_end_matches(['.', '-']);
    let tail = &raw[end..];

    let tail_ok = tail.is_empty()
        || tail.starts_with(['"', '\'', ',', ':', '#', '&'])
        || tail.trim().is_empty();
    let is_range = token
        .split('.')
        .any(|segment| matches!(segment, "x" | "X" | "*"));

    (tail_ok && !is_range && token.contains('.')).then(|| token.to_string())
}

fn strip_npm_protocol(reference: &str) -> &str {
    reference.strip_prefix("npm:").unwrap_or(reference)
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
