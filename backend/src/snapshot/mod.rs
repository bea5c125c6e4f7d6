//! Previously published artifact and change detection.
//!
//! Fetching the prior artifact never fails the run: an unreachable server,
//! an error status or an unreadable body all mean [`PriorArtifact::NotFound`],
//! and the next artifact starts a fresh version line.

use crate::models::{PublishedArtifact, Shelter};

/// Outcome of looking up the previously published artifact
#[derive(Debug, Clone)]
pub enum PriorArtifact {
    /// The artifact currently being served
    Found(PublishedArtifact),
    /// Nothing usable was published, with the reason
    NotFound(String),
}

impl PriorArtifact {
    pub fn found(&self) -> Option<&PublishedArtifact> {
        match self {
            PriorArtifact::Found(artifact) => Some(artifact),
            PriorArtifact::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PriorArtifact::Found(_))
    }
}

/// Anything that can provide the previously published artifact.
#[allow(async_fn_in_trait)]
pub trait ArtifactSource {
    async fn fetch_artifact(&self) -> PriorArtifact;
}

/// Whether the candidate shelter list differs from the prior one.
///
/// Order matters and every field is compared, coordinates included. With
/// no prior artifact everything counts as changed.
pub fn has_changed(candidate: &[Shelter], prior: &PriorArtifact) -> bool {
    match prior {
        PriorArtifact::Found(artifact) => !same_shelters(candidate, &artifact.shelters),
        PriorArtifact::NotFound(_) => true,
    }
}

/// Deep, order-sensitive equality of two shelter lists.
pub fn same_shelters(a: &[Shelter], b: &[Shelter]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
}
