//! Symbol model: read-only queries over a compiled project's declared types.
//!
//! The compiler front-end is not part of this crate. Anything that can list
//! a project's types with their namespace, transitive base types, transitive
//! interfaces and members implements [`CompiledUnit`]; [`SymbolTable`] is the
//! serde-backed implementation loaded from pre-built JSON symbol tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name suffix of JSON symbol tables (`<Project>.symbols.json`).
pub const SYMBOL_TABLE_SUFFIX: &str = ".symbols.json";

/// Declared accessibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible everywhere.
    Public,
    /// Visible inside the declaring project.
    #[default]
    Internal,
    /// Visible to derived types.
    Protected,
    /// Visible to the declaring type only.
    Private,
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A class.
    #[default]
    Class,
    /// An interface.
    Interface,
    /// A value type.
    Struct,
    /// An enumeration.
    Enum,
    /// A record.
    Record,
    /// A delegate type.
    Delegate,
}

/// Kind of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// A method.
    #[default]
    Method,
    /// A constructor.
    Constructor,
    /// A property.
    Property,
    /// A field.
    Field,
    /// An event.
    Event,
}

/// A member of a declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSymbol {
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Declared accessibility.
    pub visibility: Visibility,
    /// Whether the member is static.
    pub is_static: bool,
    /// Whether the first parameter is an extension receiver.
    pub is_extension: bool,
    /// Parameter types in declaration order.
    pub parameters: Vec<String>,
    /// Return, property or field type.
    pub return_type: Option<String>,
}

impl MemberSymbol {
    /// Creates a public instance method with no parameters.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    /// Marks the member static.
    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Adds a parameter type.
    #[must_use]
    pub fn param(mut self, type_name: impl Into<String>) -> Self {
        self.parameters.push(type_name.into());
        self
    }

    /// Makes this a static extension method on `receiver`.
    #[must_use]
    pub fn extending(mut self, receiver: impl Into<String>) -> Self {
        self.is_static = true;
        self.is_extension = true;
        self.parameters.insert(0, receiver.into());
        self
    }

    /// The extension receiver type, if this is an extension method.
    #[must_use]
    pub fn receiver(&self) -> Option<&str> {
        if self.is_extension {
            self.parameters.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// A declared type with its hierarchy and members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeSymbol {
    /// Simple name.
    pub name: String,
    /// Containing namespace.
    pub namespace: String,
    /// Type kind.
    pub kind: TypeKind,
    /// Declared accessibility.
    pub visibility: Visibility,
    /// `static` modifier.
    pub is_static: bool,
    /// `sealed` modifier.
    pub is_sealed: bool,
    /// `abstract` modifier.
    pub is_abstract: bool,
    /// Transitive base-type chain, nearest first.
    pub base_types: Vec<String>,
    /// Transitive set of implemented (or, for interfaces, extended) interfaces.
    pub interfaces: Vec<String>,
    /// Declared members.
    pub members: Vec<MemberSymbol>,
}

impl TypeSymbol {
    /// Creates a public class.
    #[must_use]
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: TypeKind::Class,
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    /// Creates a public interface.
    #[must_use]
    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(namespace, name)
        }
    }

    /// Sets the accessibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the type static.
    #[must_use]
    pub fn static_type(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the type sealed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Marks the type abstract.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Appends base types, nearest first.
    #[must_use]
    pub fn extends<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_types.extend(bases.into_iter().map(Into::into));
        self
    }

    /// Adds implemented interfaces.
    #[must_use]
    pub fn implements<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces.extend(interfaces.into_iter().map(Into::into));
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, member: MemberSymbol) -> Self {
        self.members.push(member);
        self
    }

    /// Namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns true for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Returns true for non-abstract, non-static classes and records.
    #[must_use]
    pub fn is_concrete_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Record)
            && !self.is_abstract
            && !self.is_static
    }

    /// Returns true when the type is static or declares members that are all
    /// static. Constructors do not count as members here.
    #[must_use]
    pub fn is_static_only(&self) -> bool {
        let mut members = self
            .members
            .iter()
            .filter(|m| m.kind != MemberKind::Constructor)
            .peekable();
        self.is_static || (members.peek().is_some() && members.all(|m| m.is_static))
    }

    /// Finds a member by exact name.
    #[must_use]
    pub fn find_member(&self, name: &str) -> Option<&MemberSymbol> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Strips namespace qualification, generic arguments and arity from a type name.
///
/// `Microsoft.Extensions.DependencyInjection.IServiceCollection` and
/// ``IRepository`1`` / `IRepository<Order>` become `IServiceCollection` and
/// `IRepository`.
#[must_use]
pub fn simple_name(type_name: &str) -> &str {
    let head = type_name.split(['<', '`', '[']).next().unwrap_or(type_name);
    let head = head.trim().trim_end_matches('?').trim_start_matches("global::");
    head.rsplit('.').next().unwrap_or(head)
}

/// Opaque capability exposing one compiled project's declared types.
pub trait CompiledUnit: Send + Sync {
    /// Name of the project the unit was compiled from.
    fn project_name(&self) -> &str;

    /// Declared types of the project.
    fn types(&self) -> &[TypeSymbol];
}

/// Type alias for boxed `CompiledUnit` trait objects.
pub type CompiledUnitBox = Box<dyn CompiledUnit>;

/// Errors loading symbol tables.
#[derive(Debug, thiserror::Error)]
pub enum SymbolLoadError {
    /// IO error reading a symbol table.
    #[error("Failed to read symbol table {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// JSON error in a symbol table.
    #[error("Failed to parse symbol table {path}: {source}")]
    Json {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// A pre-built symbol table for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Project name.
    pub project: String,
    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
}

impl SymbolTable {
    /// Creates a symbol table.
    #[must_use]
    pub fn new(project: impl Into<String>, types: Vec<TypeSymbol>) -> Self {
        Self {
            project: project.into(),
            types,
        }
    }

    /// Loads a JSON symbol table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a symbol table.
    pub fn from_file(path: &Path) -> Result<Self, SymbolLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| SymbolLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SymbolLoadError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads every `*.symbols.json` table in a directory, keyed by project.
    ///
    /// Tables that fail to load are skipped with a warning so one broken
    /// table does not hide the other projects.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory itself cannot be read.
    pub fn load_dir(dir: &Path) -> Result<BTreeMap<String, CompiledUnitBox>, SymbolLoadError> {
        let entries = std::fs::read_dir(dir).map_err(|e| SymbolLoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(SYMBOL_TABLE_SUFFIX))
            })
            .collect();
        paths.sort();

        let mut units: BTreeMap<String, CompiledUnitBox> = BTreeMap::new();
        for path in paths {
            match Self::from_file(&path) {
                Ok(table) => {
                    debug!("Loaded {} types for {}", table.types.len(), table.project);
                    units.insert(table.project.clone(), Box::new(table));
                }
                Err(e) => warn!("{e}"),
            }
        }
        Ok(units)
    }
}

impl CompiledUnit for SymbolTable {
    fn project_name(&self) -> &str {
        &self.project
    }

    fn types(&self) -> &[TypeSymbol] {
        &self.types
    }
}

/// Query surface over one compiled unit.
#[derive(Clone, Copy)]
pub struct SymbolModel<'a> {
    unit: &'a dyn CompiledUnit,
}

impl std::fmt::Debug for SymbolModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolModel")
            .field("project", &self.unit.project_name())
            .field("types", &self.unit.types().len())
            .finish()
    }
}

impl<'a> SymbolModel<'a> {
    /// Wraps a compiled unit.
    #[must_use]
    pub fn new(unit: &'a dyn CompiledUnit) -> Self {
        Self { unit }
    }

    /// Project the unit was compiled from.
    #[must_use]
    pub fn project_name(&self) -> &'a str {
        self.unit.project_name()
    }

    /// All declared types.
    #[must_use]
    pub fn types(&self) -> &'a [TypeSymbol] {
        self.unit.types()
    }

    /// Finds a declared type by simple name.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&'a TypeSymbol> {
        let wanted = simple_name(name);
        self.types().iter().find(|t| t.name == wanted)
    }

    /// Types declared directly in `namespace`.
    pub fn types_in_namespace<'n>(
        &self,
        namespace: &'n str,
    ) -> impl Iterator<Item = &'a TypeSymbol> + 'n
    where
        'a: 'n,
    {
        self.types().iter().filter(move |t| t.namespace == namespace)
    }

    /// Interfaces declared directly in `namespace`.
    pub fn interfaces_in_namespace<'n>(
        &self,
        namespace: &'n str,
    ) -> impl Iterator<Item = &'a TypeSymbol> + 'n
    where
        'a: 'n,
    {
        self.types_in_namespace(namespace)
            .filter(|t| t.is_interface())
    }

    /// Whether `ty`'s base-type chain or interface set includes `target`.
    ///
    /// Chains are transitive already; when a declared type of this unit sits
    /// in the chain its own chain is followed too, so partially resolved
    /// tables still answer correctly.
    #[must_use]
    pub fn inherits_from(&self, ty: &TypeSymbol, target: &str) -> bool {
        let target = simple_name(target);
        let mut pending: Vec<&TypeSymbol> = vec![ty];
        let mut visited: Vec<&str> = Vec::new();

        while let Some(current) = pending.pop() {
            if visited.contains(&current.name.as_str()) {
                continue;
            }
            visited.push(&current.name);

            for parent in current.base_types.iter().chain(&current.interfaces) {
                let parent = simple_name(parent);
                if parent == target {
                    return true;
                }
                if let Some(declared) = self.find_type(parent) {
                    pending.push(declared);
                }
            }
        }
        false
    }

    /// Whether `ty`'s base-type chain (classes only) includes `target`.
    #[must_use]
    pub fn derives_from_class(&self, ty: &TypeSymbol, target: &str) -> bool {
        let target = simple_name(target);
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(t) = current {
            if t.base_types.iter().any(|b| simple_name(b) == target) {
                return true;
            }
            depth += 1;
            if depth > self.types().len() {
                break;
            }
            current = t
                .base_types
                .first()
                .and_then(|b| self.find_type(b))
                .filter(|b| b.name != t.name);
        }
        false
    }

    /// Whether some member of `ty` names `type_name` as a parameter type,
    /// including the receiver of an extension method.
    #[must_use]
    pub fn references_in_signature(&self, ty: &TypeSymbol, type_name: &str) -> bool {
        !self.signature_references(ty, type_name).is_empty()
    }

    /// Members of `ty` whose signature names `type_name` as a parameter or receiver.
    #[must_use]
    pub fn signature_references<'t>(
        &self,
        ty: &'t TypeSymbol,
        type_name: &str,
    ) -> Vec<&'t MemberSymbol> {
        let wanted = simple_name(type_name);
        ty.members
            .iter()
            .filter(|m| {
                m.receiver().is_some_and(|r| simple_name(r) == wanted)
                    || m.parameters.iter().any(|p| simple_name(p) == wanted)
            })
            .collect()
    }
}
