use vizkit_core::{DatasetId, GeometryId};

use crate::property::{Property, VolumeProperty};

/// Polygonal data from the scene drawn with a property
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub geometry: GeometryId,
    pub property: Property,
    pub visible: bool,
}

impl Actor {
    pub fn new(geometry: impl Into<GeometryId>, property: Property) -> Self {
        Self {
            geometry: geometry.into(),
            property,
            visible: true,
        }
    }
}

/// A volume dataset drawn by ray casting
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeActor {
    pub volume: DatasetId,
    pub property: VolumeProperty,
    pub visible: bool,
}

impl VolumeActor {
    pub fn new(volume: DatasetId, property: VolumeProperty) -> Self {
        Self {
            volume,
            property,
            visible: true,
        }
    }
}
