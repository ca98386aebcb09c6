//! Entity trait - common interface for stored entity types

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{BidItem, Phase, Project, Report, SpecItem};

/// Common trait for entities persisted as workspace files
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g. "DIR")
    const PREFIX: EntityPrefix;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;
}

impl Entity for Project {
    const PREFIX: EntityPrefix = EntityPrefix::Prj;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for Phase {
    const PREFIX: EntityPrefix = EntityPrefix::Phs;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for SpecItem {
    const PREFIX: EntityPrefix = EntityPrefix::Spec;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for BidItem {
    const PREFIX: EntityPrefix = EntityPrefix::Item;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for Report {
    const PREFIX: EntityPrefix = EntityPrefix::Dir;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
