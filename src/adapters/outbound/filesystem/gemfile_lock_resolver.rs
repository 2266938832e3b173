use crate::audit::domain::Group;
use crate::ports::outbound::{NativeResolution, NativeResolver, ResolvedSpec};
use crate::shared::error::AuditError;
use crate::shared::security::read_regular_file;
use crate::shared::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

const GEMFILE: &str = "Gemfile";
const GEMFILE_LOCK: &str = "Gemfile.lock";
const LOCAL_REMOTE_PREFIXES: [&str; 3] = ["file:", "./", "../"];

/// Where the gems of one lock file section come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Registry,
    Git { local: bool },
    Path,
}

impl SourceKind {
    fn is_local(self) -> bool {
        matches!(self, SourceKind::Path | SourceKind::Git { local: true })
    }
}

/// Installed gems and direct declarations read from `Gemfile.lock`.
#[derive(Debug, Default, PartialEq)]
struct LockedGems {
    /// name -> (version, source)
    specs: HashMap<String, (String, SourceKind)>,
    /// Direct dependencies in file order with their constraint (empty when unconstrained).
    dependencies: Vec<(String, String)>,
}

impl LockedGems {
    fn parse(content: &str) -> Self {
        let mut locked = LockedGems::default();
        let mut section = "";
        let mut source = SourceKind::Registry;
        let mut remote = String::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with(' ') {
                section = line.trim();
                source = match section {
                    "PATH" => SourceKind::Path,
                    "GIT" => SourceKind::Git { local: false },
                    _ => SourceKind::Registry,
                };
                remote.clear();
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            let text = line.trim();
            match (section, indent) {
                ("GIT" | "PATH" | "GEM", 2) => {
                    if let Some(value) = text.strip_prefix("remote:") {
                        remote = value.trim().to_string();
                        if source == (SourceKind::Git { local: false }) {
                            let local = LOCAL_REMOTE_PREFIXES
                                .iter()
                                .any(|prefix| remote.starts_with(prefix));
                            source = SourceKind::Git { local };
                        }
                    }
                }
                ("GIT" | "PATH" | "GEM", 4) => {
                    if let Some((name, version)) = split_name_and_parens(text) {
                        locked
                            .specs
                            .entry(name.to_string())
                            .or_insert((strip_platform(version).to_string(), source));
                    }
                }
                ("DEPENDENCIES", 2) => {
                    let (name, constraint) = match split_name_and_parens(text) {
                        Some((name, constraint)) => (name, constraint),
                        None => (text, ""),
                    };
                    let name = name.trim_end_matches('!');
                    locked
                        .dependencies
                        .push((name.to_string(), constraint.to_string()));
                }
                _ => {}
            }
        }

        locked
    }
}

/// `rails (7.1.3)` -> `("rails", "7.1.3")`
fn split_name_and_parens(text: &str) -> Option<(&str, &str)> {
    let (name, rest) = text.split_once(" (")?;
    let inner = rest.strip_suffix(')')?;
    Some((name.trim(), inner.trim()))
}

/// `1.16.0-x86_64-linux` -> `1.16.0`; Ruby pre-releases use `.` so `-` only starts a platform.
fn strip_platform(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

/// Group membership declared in a `Gemfile`, keyed by gem name.
///
/// Understands `group :a, :b do ... end` blocks and inline `group:` /
/// `groups:` / `:group =>` options. Other `do ... end` blocks are tracked
/// only so their `end` is not mistaken for the end of a group.
fn parse_gemfile_groups(content: &str) -> HashMap<String, BTreeSet<String>> {
    let mut groups: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut blocks: Vec<Vec<String>> = Vec::new();

    for line in content.lines() {
        let code = line.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        if code == "end" || code.starts_with("end ") {
            blocks.pop();
            continue;
        }

        if let Some(rest) = code.strip_prefix("group ").or_else(|| code.strip_prefix("group(")) {
            if let Some(args) = rest.rsplit_once(" do").map(|(args, _)| args) {
                blocks.push(group_names(args));
                continue;
            }
        }

        if let Some(name) = gem_name(code) {
            let entry = groups.entry(name.to_string()).or_default();
            entry.extend(blocks.iter().flatten().cloned());
            entry.extend(inline_groups(code));
            continue;
        }

        if code.ends_with(" do") || code.contains(" do |") {
            blocks.push(Vec::new());
        }
    }

    groups
}

/// Name of the gem declared by a `gem 'name', ...` line.
fn gem_name(code: &str) -> Option<&str> {
    let rest = code
        .strip_prefix("gem ")
        .or_else(|| code.strip_prefix("gem("))?
        .trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = &rest[1..];
    inner.split(quote).next().filter(|name| !name.is_empty())
}

fn inline_groups(code: &str) -> Vec<String> {
    ["groups:", "group:", ":groups =>", ":group =>"]
        .iter()
        .find_map(|marker| code.split_once(marker).map(|(_, rest)| rest.trim_start()))
        .map(|rest| {
            let value = if rest.starts_with('[') || rest.starts_with("%i[") || rest.starts_with("%w[") {
                rest.split(']').next().unwrap_or(rest)
            } else {
                rest.split(',').next().unwrap_or(rest)
            };
            group_names(value)
        })
        .unwrap_or_default()
}

/// `:development, :test` or `%i[development test]` -> `["development", "test"]`
fn group_names(args: &str) -> Vec<String> {
    args.trim_start_matches("%i")
        .trim_start_matches("%w")
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|token| token.trim_matches(|c: char| matches!(c, ':' | '\'' | '"' | '[' | ']' | '(' | ')')))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// `development` and `test` are development groups; anything else counts as default.
fn to_groups(names: Option<&BTreeSet<String>>) -> BTreeSet<Group> {
    let Some(names) = names.filter(|names| !names.is_empty()) else {
        return BTreeSet::from([Group::Default]);
    };
    names
        .iter()
        .map(|name| match name.as_str() {
            "development" | "test" => Group::Development,
            _ => Group::Default,
        })
        .collect()
}

/// GemfileLockResolver adapter reading the installed set bundler wrote
///
/// Implements the NativeResolver port without resolving anything itself:
/// direct dependencies come from `DEPENDENCIES`, versions from the `specs:`
/// sections, groups from the `Gemfile`. Gems from `PATH` sections and local
/// git checkouts are not audited.
pub struct GemfileLockResolver;

impl GemfileLockResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GemfileLockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeResolver for GemfileLockResolver {
    fn resolve_manifest(&self, project_path: &Path) -> Result<NativeResolution> {
        let gemfile_path = project_path.join(GEMFILE);
        let lockfile_path = project_path.join(GEMFILE_LOCK);

        if !gemfile_path.exists() {
            return Err(AuditError::ManifestNotFound {
                manifest: GEMFILE,
                path: gemfile_path,
                suggestion: "Please run in the root directory of a bundler project.".to_string(),
            }
            .into());
        }
        if !lockfile_path.exists() {
            return Err(AuditError::LockfileNotFound {
                path: lockfile_path,
                suggestion: "Run `bundle install` to generate Gemfile.lock".to_string(),
            }
            .into());
        }

        let read = |path: &Path, description: &str| {
            read_regular_file(path, description).map_err(|e| AuditError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })
        };
        let locked = LockedGems::parse(&read(&lockfile_path, GEMFILE_LOCK)?);
        let gemfile_groups = parse_gemfile_groups(&read(&gemfile_path, GEMFILE)?);

        let mut specs = BTreeMap::new();
        let mut declared = Vec::with_capacity(locked.dependencies.len());
        for (name, constraint) in &locked.dependencies {
            declared.push(name.clone());

            // Gems restricted to other platforms have no locked spec.
            let Some((version, source)) = locked.specs.get(name) else {
                tracing::debug!(gem = %name, "skipping gem with no spec for the locked platforms");
                continue;
            };
            if source.is_local() {
                tracing::debug!(gem = %name, "skipping local gem");
                continue;
            }

            specs.insert(
                name.clone(),
                ResolvedSpec::new(name, constraint, version, to_groups(gemfile_groups.get(name))),
            );
        }

        Ok(NativeResolution {
            specs: specs.into_values().collect(),
            declared,
        })
    }
}
