//! Object instantiation boundary between the scatter engine and the host scene graph.
use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::error::{Error, Result};
use crate::scatter::plan::EmitterId;
use crate::scatter::species::PrototypeId;

/// World transform of a placed object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for PlacementTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl PlacementTransform {
    /// Yaw around world Y in radians, ignoring any tilt.
    pub fn yaw(&self) -> f32 {
        let forward = self.rotation * Vec3::Z;
        forward.x.atan2(forward.z)
    }
}

/// Creates, positions, parents and destroys objects in the host scene.
///
/// Failures are reported per object; the scatter run records them and moves on.
pub trait Instantiator {
    type Handle;

    fn instantiate(&mut self, prototype: &PrototypeId) -> Result<Self::Handle>;

    fn set_transform(&mut self, handle: &Self::Handle, transform: &PlacementTransform)
        -> Result<()>;

    fn set_parent(&mut self, handle: &Self::Handle, parent: &EmitterId) -> Result<()>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// An object held by a [`RecordingInstantiator`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedObject {
    pub prototype: PrototypeId,
    pub transform: PlacementTransform,
    pub parent: Option<EmitterId>,
}

/// In-memory [`Instantiator`] that records every live object.
///
/// Prototypes listed with [`RecordingInstantiator::reject_prototype`] fail to instantiate.
#[derive(Debug, Default)]
pub struct RecordingInstantiator {
    next_handle: u64,
    objects: BTreeMap<u64, RecordedObject>,
    rejected: Vec<PrototypeId>,
}

impl RecordingInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `instantiate` of `prototype` fail.
    pub fn reject_prototype(&mut self, prototype: PrototypeId) {
        self.rejected.push(prototype);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: u64) -> Option<&RecordedObject> {
        self.objects.get(&handle)
    }

    /// Live objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &RecordedObject> {
        self.objects.values()
    }
}

impl Instantiator for RecordingInstantiator {
    type Handle = u64;

    fn instantiate(&mut self, prototype: &PrototypeId) -> Result<u64> {
        if self.rejected.contains(prototype) {
            return Err(Error::instantiation(prototype.as_str(), "prototype rejected"));
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(
            handle,
            RecordedObject {
                prototype: prototype.clone(),
                transform: PlacementTransform::default(),
                parent: None,
            },
        );
        Ok(handle)
    }

    fn set_transform(&mut self, handle: &u64, transform: &PlacementTransform) -> Result<()> {
        let object = self
            .objects
            .get_mut(handle)
            .ok_or_else(|| Error::Collaborator(format!("unknown handle {handle}")))?;
        object.transform = *transform;
        Ok(())
    }

    fn set_parent(&mut self, handle: &u64, parent: &EmitterId) -> Result<()> {
        let object = self
            .objects
            .get_mut(handle)
            .ok_or_else(|| Error::Collaborator(format!("unknown handle {handle}")))?;
        object.parent = Some(parent.clone());
        Ok(())
    }

    fn destroy(&mut self, handle: u64) {
        self.objects.remove(&handle);
    }
}
