/// Named entity template resolved by the host's asset system.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefab {
    pub name: String,
}

impl Prefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Resolves prefab names to templates.
pub trait PrefabResolver {
    /// Returns `None` if no prefab with this name exists.
    fn resolve_prefab(&self, name: &str) -> Option<Prefab>;
}
