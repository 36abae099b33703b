//! Layer classification: maps project names to architecture layers.

use serde::{Deserialize, Serialize};

/// A canonical architecture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// HTTP/transport entry point.
    Api,
    /// Use-case orchestration.
    Application,
    /// Domain services.
    Domain,
    /// Domain entities and value objects.
    DomainEntities,
    /// Persistence adapters.
    InfraData,
    /// Persistence technology bindings.
    InfraDataTech,
    /// Cross-cutting configuration.
    Configuration,
    /// Composition root.
    Bootstrapper,
    /// The name does not end with any known suffix.
    Unknown,
}

/// Project name suffixes, most specific first.
///
/// A suffix that extends another one (`.Infra.Data.Technology` extends
/// `.Infra.Data`) must appear before it.
pub const SUFFIX_TABLE: &[(&str, Layer)] = &[
    (".Infra.CrossCutting.Configuration", Layer::Configuration),
    (".Infra.Data.Technology", Layer::InfraDataTech),
    (".Domain.Entities", Layer::DomainEntities),
    (".Infra.Data", Layer::InfraData),
    (".Application", Layer::Application),
    (".Bootstrapper", Layer::Bootstrapper),
    (".Domain", Layer::Domain),
    (".Api", Layer::Api),
];

impl Layer {
    /// All known layers, in architectural order.
    pub const KNOWN: [Layer; 8] = [
        Layer::Api,
        Layer::Application,
        Layer::Domain,
        Layer::DomainEntities,
        Layer::InfraData,
        Layer::InfraDataTech,
        Layer::Configuration,
        Layer::Bootstrapper,
    ];

    /// Classifies a project by name.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        matched_suffix(name).map_or(Self::Unknown, |(_, layer)| layer)
    }

    /// Returns the bounded-context prefix of a project name.
    ///
    /// `Sales.Orders.Api` yields `Sales.Orders`; `Orders.Api` yields `None`
    /// because the remainder has no internal separator.
    #[must_use]
    pub fn bc_prefix(name: &str) -> Option<&str> {
        let (suffix, _) = matched_suffix(name)?;
        let prefix = &name[..name.len() - suffix.len()];
        let inner = prefix.trim_matches('.');
        (inner.len() == prefix.len() && prefix.contains('.')).then_some(prefix)
    }

    /// The project name suffix of this layer.
    #[must_use]
    pub fn suffix(self) -> Option<&'static str> {
        SUFFIX_TABLE
            .iter()
            .find(|(_, layer)| *layer == self)
            .map(|(suffix, _)| *suffix)
    }

    /// Returns true for every layer except [`Layer::Unknown`].
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Api => "Api",
            Self::Application => "Application",
            Self::Domain => "Domain",
            Self::DomainEntities => "Domain.Entities",
            Self::InfraData => "Infra.Data",
            Self::InfraDataTech => "Infra.Data.Technology",
            Self::Configuration => "Infra.CrossCutting.Configuration",
            Self::Bootstrapper => "Bootstrapper",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

fn matched_suffix(name: &str) -> Option<(&'static str, Layer)> {
    SUFFIX_TABLE
        .iter()
        .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
        .copied()
}

/// Returns true when both projects belong to the same bounded context.
///
/// Projects without a bounded context never share one.
#[must_use]
pub fn same_bounded_context(a: &str, b: &str) -> bool {
    match (Layer::bc_prefix(a), Layer::bc_prefix(b)) {
        (Some(pa), Some(pb)) => pa == pb,
        _ => false,
    }
}
