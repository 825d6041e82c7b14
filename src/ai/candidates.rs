use std::fmt;
use std::str::FromStr;

/// Gemini REST API versions, newest surface first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1Beta,
    V1,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 2] = [ApiVersion::V1Beta, ApiVersion::V1];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1Beta => "v1beta",
            ApiVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1beta" => Ok(ApiVersion::V1Beta),
            "v1" => Ok(ApiVersion::V1),
            other => Err(format!("unknown API version '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
    pub api_version: ApiVersion,
}

impl fmt::Display for ModelCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.name)
    }
}

pub const DEFAULT_PRIORITY_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

pub const DEFAULT_FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
    "gemini-1.0-pro",
];

/// Model names the cascade is allowed to try, kept as configuration because
/// provider model names churn between releases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCatalog {
    /// Known-good names, always tried first and in this order.
    pub priority: Vec<String>,
    /// Used in place of discovery when the model listing fails or is empty.
    pub fallback: Vec<String>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY_MODELS.iter().map(|s| s.to_string()).collect(),
            fallback: DEFAULT_FALLBACK_MODELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ModelCatalog {
    /// Ordered, deduplicated model names: the priority list first, then every
    /// discovered name (or the fallback list when nothing was discovered) in
    /// its original order.
    pub fn ordered_names(&self, discovered: &[String]) -> Vec<String> {
        let rest: &[String] = if discovered.is_empty() {
            &self.fallback
        } else {
            discovered
        };

        let mut names: Vec<String> = Vec::with_capacity(self.priority.len() + rest.len());
        for name in self.priority.iter().chain(rest.iter()) {
            let name = name.trim();
            if name.is_empty() || names.iter().any(|existing| existing == name) {
                continue;
            }
            names.push(name.to_string());
        }
        names
    }
}

/// Expands names into (version, model) pairs, version-major.
pub fn expand_candidates(names: &[String], versions: &[ApiVersion]) -> Vec<ModelCandidate> {
    versions
        .iter()
        .flat_map(|version| {
            names.iter().map(move |name| ModelCandidate {
                name: name.clone(),
                api_version: *version,
            })
        })
        .collect()
}
