/// Resolution tests against complete yarn lock files
use package_audit::audit::services::version_extractor::extract;
use package_audit::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> (PathBuf, LockFileIndex) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/yarn")
        .join(name);
    let content = std::fs::read_to_string(&path).unwrap();
    (path, LockFileIndex::parse(&content))
}

fn versions(dependencies: &[Dependency]) -> HashMap<&str, &str> {
    dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.resolved_version.as_str()))
        .collect()
}

#[test]
fn test_classic_lockfile_resolves_every_declaration() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new()
        .with_dependency("@babel/core", "^7.22.0")
        .with_dependency("lodash", "4.17.0")
        .with_dependency("react", "^17.0.0")
        .with_dependency("react-dom", "^17.0.0")
        .with_dependency(
            "aviary-tokens",
            "https://github.com/example/aviary-tokens.git#v1.3.1",
        )
        .with_dependency(
            "object-types",
            "https://github.com/example/object-types.git#2.0.0",
        )
        .with_dev_dependency("typescript", "7.0.0-dev.20250703.1")
        .with_dev_dependency("webpack", "^4.0.0-beta.0")
        .with_dev_dependency("graphql", "1.0.0-rc.12")
        .with_dev_dependency("moment", "6.1.4-1")
        .with_dependency("shared-ui", "file:../shared-ui");

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();
    let versions = versions(&resolved);

    assert_eq!(resolved.len(), 10, "local packages are not audited");
    assert_eq!(versions["@babel/core"], "7.22.9");
    assert_eq!(versions["lodash"], "4.17.0");
    assert_eq!(versions["react"], "17.0.0");
    assert_eq!(versions["react-dom"], "17.0.2");
    assert_eq!(versions["aviary-tokens"], "1.3.1");
    assert_eq!(versions["object-types"], "2.0.0");
    assert_eq!(versions["typescript"], "7.0.0-dev.20250703.1");
    assert_eq!(versions["webpack"], "4.0.0-beta.0");
    assert_eq!(versions["graphql"], "1.0.0-rc.12");
    assert_eq!(versions["moment"], "6.1.4-1");
    assert!(!versions.contains_key("shared-ui"));
}

#[test]
fn test_lodash_scenario() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new().with_dependency("lodash", "4.17.0");

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();

    assert_eq!(resolved.len(), 1);
    let lodash = &resolved[0];
    assert_eq!(lodash.resolved_version, "4.17.0");
    assert_eq!(lodash.technology, Technology::Node);
    // Runtime declarations count for both groups.
    assert_eq!(
        lodash.groups,
        BTreeSet::from([Group::Default, Group::Development])
    );
}

#[test]
fn test_dev_only_declaration_is_development_group() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new().with_dev_dependency("webpack", "^4.0.0-beta.0");

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();
    assert_eq!(resolved[0].groups, BTreeSet::from([Group::Development]));
}

#[test]
fn test_react_override_scenario() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new()
        .with_dependency("react", "^17.0.0")
        .with_resolution("react", "17.0.2");

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();
    assert_eq!(resolved[0].resolved_version, "17.0.2");
    assert_eq!(resolved[0].declared_range, "^17.0.0");
}

#[test]
fn test_glob_resolution_key() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new()
        .with_dependency("react", "^17.0.0")
        .with_resolution("**/react", "17.0.2");

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();
    assert_eq!(resolved[0].resolved_version, "17.0.2");
}

#[test]
fn test_missing_package_is_fatal() {
    let (path, index) = fixture("classic.lock");
    let manifest = ManifestDeclarations::new()
        .with_dependency("lodash", "4.17.0")
        .with_dependency("left-pad", "^1.3.0");

    let err = LockfileResolver::resolve(&manifest, &index, &path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("left-pad"));
    assert!(message.contains("classic.lock"));
}

#[test]
fn test_berry_lockfile() {
    let (path, index) = fixture("berry.lock");
    let manifest = ManifestDeclarations::new()
        .with_dependency("express", "~4.17.0")
        .with_dependency("@apollo/client", "^3.12.0")
        .with_dev_dependency("code-complexity", "^4.4.0")
        .with_resolution(
            "code-complexity",
            "patch:code-complexity@npm%3A4.4.4#./.yarn/patches/code-complexity-npm-4.4.4-0a1b2c.patch",
        );

    let resolved = LockfileResolver::resolve(&manifest, &index, &path).unwrap();
    let versions = versions(&resolved);

    assert_eq!(versions["express"], "4.17.3");
    assert_eq!(versions["@apollo/client"], "3.12.5");
    assert_eq!(versions["code-complexity"], "4.4.4");
}

#[test]
fn test_scoped_name_from_berry_resolution() {
    let (_, index) = fixture("berry.lock");
    assert_eq!(
        extract(&index, "@apollo/client", "^3.10.0", None).unwrap(),
        "3.11.0"
    );
    assert!(extract(&index, "@apollo", "^3.10.0", None).is_err());
}
