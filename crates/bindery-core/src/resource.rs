//! The closed set of native resources the registry can hold.

use crate::native::{NativeFont, NativeImage};
use std::fmt;

/// Tag identifying which wrapped type a registry slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Font,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Image => "Image",
            ResourceKind::Font => "Font",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A native handle owned by a binding. Dropping it runs the native destructor.
#[derive(Debug)]
pub enum NativeResource {
    Image(NativeImage),
    Font(NativeFont),
}

impl NativeResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            NativeResource::Image(_) => ResourceKind::Image,
            NativeResource::Font(_) => ResourceKind::Font,
        }
    }
}

/// A native type that can be bound to a script object.
pub trait Wrapped: Clone + 'static {
    const KIND: ResourceKind;

    fn into_resource(self) -> NativeResource;
    fn from_resource(resource: &NativeResource) -> Option<&Self>;
    fn from_resource_mut(resource: &mut NativeResource) -> Option<&mut Self>;
}

impl Wrapped for NativeImage {
    const KIND: ResourceKind = ResourceKind::Image;

    fn into_resource(self) -> NativeResource {
        NativeResource::Image(self)
    }

    fn from_resource(resource: &NativeResource) -> Option<&Self> {
        match resource {
            NativeResource::Image(image) => Some(image),
            _ => None,
        }
    }

    fn from_resource_mut(resource: &mut NativeResource) -> Option<&mut Self> {
        match resource {
            NativeResource::Image(image) => Some(image),
            _ => None,
        }
    }
}

impl Wrapped for NativeFont {
    const KIND: ResourceKind = ResourceKind::Font;

    fn into_resource(self) -> NativeResource {
        NativeResource::Font(self)
    }

    fn from_resource(resource: &NativeResource) -> Option<&Self> {
        match resource {
            NativeResource::Font(font) => Some(font),
            _ => None,
        }
    }

    fn from_resource_mut(resource: &mut NativeResource) -> Option<&mut Self> {
        match resource {
            NativeResource::Font(font) => Some(font),
            _ => None,
        }
    }
}
