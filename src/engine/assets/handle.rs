// Handles into the sprite registry
//
// A handle is the slot an asset was registered in. Atlases are never
// unregistered, so a handle from a manager stays valid for that manager.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Registry slot of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u32);

impl AssetId {
    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(slot as u32)
    }

    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed handle; `T` keeps atlas handles from being mixed with other kinds
pub struct AssetHandle<T> {
    id: AssetId,
    _kind: PhantomData<fn() -> T>,
}

impl<T> AssetHandle<T> {
    pub(crate) fn new(id: AssetId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }
}

// Manual impls: none of these should depend on `T`
impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetHandle({})", self.id)
    }
}

/// Marker for sprite atlases
#[derive(Debug)]
pub enum AtlasKind {}

pub type AtlasHandle = AssetHandle<AtlasKind>;
