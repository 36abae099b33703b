//! Project manifest (`*.csproj`) reading and discovery.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// File extension of project manifests.
pub const MANIFEST_EXTENSION: &str = "csproj";

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap_or_else(|_| panic!("Invalid Regex")));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z_][\w.:-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bInclude\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Declared inter-project references and external packages of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Project name (manifest file stem).
    pub name: String,
    /// Manifest location.
    pub path: PathBuf,
    /// Referenced project names.
    pub references: Vec<String>,
    /// Referenced package names.
    pub packages: Vec<String>,
}

impl ProjectManifest {
    /// Reads a manifest from disk.
    ///
    /// A missing or malformed manifest yields a manifest with no references
    /// and no packages; this never fails.
    #[must_use]
    pub fn read(path: &Path) -> Self {
        let name = project_name_from_path(&path.to_string_lossy());
        let (references, packages) = match std::fs::read_to_string(path) {
            Ok(content) => parse_manifest(&content).unwrap_or_else(|| {
                warn!("Malformed manifest {}, treating as empty", path.display());
                (Vec::new(), Vec::new())
            }),
            Err(e) => {
                debug!("Cannot read manifest {}: {e}", path.display());
                (Vec::new(), Vec::new())
            }
        };

        Self {
            name,
            path: path.to_path_buf(),
            references,
            packages,
        }
    }

    /// Returns true when nothing is referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.packages.is_empty()
    }
}

/// Parses manifest text into `(project references, package names)`.
///
/// Returns `None` when the document is not a well-formed `<Project>` document.
#[must_use]
pub fn parse_manifest(content: &str) -> Option<(Vec<String>, Vec<String>)> {
    let content = COMMENT_RE.replace_all(content, "");
    let mut stack: Vec<&str> = Vec::new();
    let mut saw_root = false;
    let mut references = Vec::new();
    let mut packages = Vec::new();

    for caps in TAG_RE.captures_iter(&content) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();
        let tag = caps.get(2)?.as_str();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if closing {
            if stack.pop() != Some(tag) {
                return None;
            }
            continue;
        }

        if stack.is_empty() {
            if saw_root || tag != "Project" {
                return None;
            }
            saw_root = true;
        }

        match tag {
            "ProjectReference" => references.extend(include_items(attrs).map(project_name_from_path)),
            "PackageReference" => packages.extend(include_items(attrs).map(String::from)),
            _ => {}
        }

        if !self_closing {
            stack.push(tag);
        }
    }

    (saw_root && stack.is_empty()).then_some((references, packages))
}

/// Items of an `Include` attribute; `;` separates several items.
///
/// `Update` and `Remove` items carry no `Include` and yield nothing.
fn include_items(attrs: &str) -> impl Iterator<Item = &str> {
    INCLUDE_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map_or("", |m| m.as_str())
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Turns a manifest path into a bare project name.
///
/// Strips the directory (either separator style) and the extension:
/// `..\Sales.Orders.Domain\Sales.Orders.Domain.csproj` becomes `Sales.Orders.Domain`.
#[must_use]
pub fn project_name_from_path(path: &str) -> String {
    let file = path.trim().rsplit(['\\', '/']).next().unwrap_or_default();
    let stem = match file.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(MANIFEST_EXTENSION) => stem,
        _ => file,
    };
    stem.to_string()
}

/// Discovers all manifests under `root`, keyed by project name.
///
/// Honors `.gitignore`, skips `bin/` and `obj/` build output and any path
/// matching one of the `exclude` glob patterns. When two manifests share a
/// name the first one found (in sorted path order) wins.
#[must_use]
pub fn discover_manifests(root: &Path, exclude: &[String]) -> BTreeMap<String, PathBuf> {
    let patterns: Vec<glob::Pattern> = exclude
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Ignoring invalid exclude pattern {p:?}: {e}");
                None
            }
        })
        .collect();

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);
    builder.filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        !(entry.file_type().is_some_and(|t| t.is_dir()) && (name == "bin" || name == "obj"))
    });

    let mut found: Vec<PathBuf> = builder
        .build()
        .filter_map(Result::ok)
        .map(ignore::DirEntry::into_path)
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
        })
        .filter(|path| {
            let rel = path.strip_prefix(root).unwrap_or(path);
            !patterns
                .iter()
                .any(|p| p.matches_path(path) || p.matches_path(rel))
        })
        .collect();
    found.sort();

    let mut manifests: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in found {
        let name = project_name_from_path(&path.to_string_lossy());
        if let Some(existing) = manifests.get(&name) {
            warn!(
                "Duplicate manifest for {name}: keeping {}, ignoring {}",
                existing.display(),
                path.display()
            );
            continue;
        }
        manifests.insert(name, path);
    }

    debug!("Discovered {} manifests under {}", manifests.len(), root.display());
    manifests
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <!-- <ProjectReference Include="..\Commented.Out\Commented.Out.csproj" /> -->
  <ItemGroup>
    <ProjectReference Include="..\Sales.Orders.Domain\Sales.Orders.Domain.csproj" />
    <ProjectReference Include="../Shared.BuildingBlocks.Core/Shared.BuildingBlocks.Core.csproj"></ProjectReference>
  </ItemGroup>
  <ItemGroup>
    <PackageReference Version="8.0.0" Include="Microsoft.Extensions.Logging" />
  </ItemGroup>
</Project>"#;

    #[test]
    fn parses_references_and_packages() {
        let (refs, packages) = parse_manifest(MANIFEST).expect("well-formed");
        assert_eq!(refs, vec!["Sales.Orders.Domain", "Shared.BuildingBlocks.Core"]);
        assert_eq!(packages, vec!["Microsoft.Extensions.Logging"]);
    }

    #[test]
    fn malformed_manifest_yields_nothing() {
        assert!(parse_manifest("<Project><ItemGroup></Project>").is_none());
        assert!(parse_manifest("not xml at all").is_none());
        assert!(parse_manifest("<Other></Other>").is_none());
        assert!(parse_manifest("<Project></Project><Project></Project>").is_none());
    }

    #[test]
    fn items_without_include_are_skipped() {
        let content = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <ProjectReference Include="..\A.B.Domain.Entities\A.B.Domain.Entities.csproj" />
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <PackageReference Update="Microsoft.SourceLink.GitHub" PrivateAssets="all" />
    <ProjectReference Remove="..\A.B.Legacy\A.B.Legacy.csproj" />
    <ProjectReference />
  </ItemGroup>
</Project>"#;
        let (refs, packages) = parse_manifest(content).expect("well-formed");
        assert_eq!(refs, vec!["A.B.Domain.Entities"]);
        assert_eq!(packages, vec!["Newtonsoft.Json"]);
    }

    #[test]
    fn include_lists_expand_to_every_item() {
        let content = r#"<Project>
  <ItemGroup>
    <ProjectReference Include="..\A.B.Domain\A.B.Domain.csproj; ..\A.B.Api\A.B.Api.csproj;" />
    <PackageReference Include="Polly;Serilog" />
  </ItemGroup>
</Project>"#;
        let (refs, packages) = parse_manifest(content).expect("well-formed");
        assert_eq!(refs, vec!["A.B.Domain", "A.B.Api"]);
        assert_eq!(packages, vec!["Polly", "Serilog"]);
    }

    #[test]
    fn xml_declaration_is_tolerated() {
        let content = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Project></Project>";
        assert_eq!(parse_manifest(content), Some((vec![], vec![])));
    }

    #[test]
    fn project_name_strips_directory_and_extension() {
        assert_eq!(project_name_from_path(r"..\A.B.Api\A.B.Api.csproj"), "A.B.Api");
        assert_eq!(project_name_from_path("src/A.B.Domain.csproj"), "A.B.Domain");
        assert_eq!(project_name_from_path("A.B.Domain"), "A.B.Domain");
        assert_eq!(project_name_from_path("src/A.B.Api/A.B.Api.CSPROJ"), "A.B.Api");
    }

    #[test]
    fn read_missing_file_is_empty() {
        let manifest = ProjectManifest::read(Path::new("/nonexistent/A.B.Api.csproj"));
        assert_eq!(manifest.name, "A.B.Api");
        assert!(manifest.is_empty());
    }

    #[test]
    fn discovers_manifests_and_skips_build_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for rel in [
            "src/A.B.Api/A.B.Api.csproj",
            "src/A.B.Api/obj/A.B.Api.csproj",
            "tests/A.B.Tests/A.B.Tests.csproj",
        ] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            std::fs::write(&path, "<Project></Project>").expect("write");
        }

        let all = discover_manifests(root, &[]);
        assert_eq!(all.len(), 2);
        assert!(all["A.B.Api"].ends_with("src/A.B.Api/A.B.Api.csproj"));

        let filtered = discover_manifests(root, &["tests/**".to_string()]);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["A.B.Api"]);
    }
}
