//! Identity-lookup collaborator consumed by the reconciler.
//!
//! The reconciler only ever asks one question of the surrounding system:
//! "is an entity with this stable external reference already known, and
//! under which identifier". Absence of a match is the normal new-entity
//! branch, never an error.

use thiserror::Error;

/// Technical failure raised by a lookup implementation (storage
/// unavailable, transport error, ...). Propagated through the reconciler
/// unchanged and never retried.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct LookupError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl LookupError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// An already-known root entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRef {
    pub id: String,
}

/// An already-known child entity (plan or page) with its external reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    pub cross_id: Option<String>,
}

/// Lookup of existing entities by their stable external reference.
pub trait IdentityLookup {
    /// The root entity known under `cross_id` within an environment, if any.
    fn find_api_by_cross_id(
        &self,
        environment_id: &str,
        cross_id: &str,
    ) -> Result<Option<ApiRef>, LookupError>;

    /// Every plan of an already-resolved root entity.
    fn find_plans_by_api(&self, api_id: &str) -> Result<Vec<EntityRef>, LookupError>;

    /// Every page of an already-resolved root entity, as a flat list; the
    /// reconciler reconstructs the hierarchy from the incoming document.
    fn find_pages_by_api(
        &self,
        environment_id: &str,
        api_id: &str,
    ) -> Result<Vec<EntityRef>, LookupError>;
}
