//! Resource management for PDF editing.
//!
//! Shared visual payloads (an image XObject, a rendered text block) are
//! written into the document once and drawn from any number of per-page
//! overlays. The registry hands out the identifiers that name those payloads
//! and keeps the table that maps an identifier back to its object.

use crate::error::{Error, Result};
use crate::geometry::Size;
use lopdf::ObjectId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of fresh identifiers.
///
/// Implementations must be thread-safe: one generator may be shared by
/// documents that are edited concurrently.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Produce a new identifier: 32 lowercase hexadecimal characters.
    fn next_id(&self) -> String;
}

/// 128-bit random identifiers (UUID v4 without dashes).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic identifiers: a 64-bit salt followed by a 64-bit counter.
#[derive(Debug)]
pub struct SequentialIds {
    salt: u64,
    counter: AtomicU64,
}

impl SequentialIds {
    /// Create a generator; documents sharing a salt share a namespace.
    pub fn new(salt: u64) -> Self {
        Self {
            salt,
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{:016x}{:016x}", self.salt, n)
    }
}

/// Identifier of a registered visual resource.
///
/// Also used verbatim as the resource name under `/XObject` in every
/// overlay that draws the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of XObject a resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Image XObject, drawn in a unit square
    Image,
    /// Form XObject, drawn in its own bounding box
    Form,
}

/// A drawable payload stored once in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualResource {
    /// The XObject holding the payload
    pub object_id: ObjectId,
    /// Image or form
    pub kind: ResourceKind,
    /// Intrinsic size in points
    pub size: Size,
}

impl VisualResource {
    /// An image XObject with its display size.
    pub fn image(object_id: ObjectId, size: Size) -> Self {
        Self {
            object_id,
            kind: ResourceKind::Image,
            size,
        }
    }

    /// A form XObject with its bounding box size.
    pub fn form(object_id: ObjectId, size: Size) -> Self {
        Self {
            object_id,
            kind: ResourceKind::Form,
            size,
        }
    }

    /// Scale to apply before placement so the payload appears at `size`.
    pub fn draw_scale(&self) -> Size {
        match self.kind {
            ResourceKind::Image => self.size,
            ResourceKind::Form => Size::new(1.0, 1.0),
        }
    }
}

/// Document-scoped table of shared visual resources.
///
/// Registering the same payload twice creates two independent entries;
/// there is no content-based deduplication.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: HashMap<ResourceId, Arc<VisualResource>>,
    issued: HashSet<String>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Create an empty registry with random identifiers.
    pub fn new() -> Self {
        Self::with_generator(Arc::new(RandomIds))
    }

    /// Create an empty registry drawing identifiers from `ids`.
    pub fn with_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            resources: HashMap::new(),
            issued: HashSet::new(),
            ids,
        }
    }

    /// Issue a fresh identifier, unique within this document.
    ///
    /// Signature fields draw their names from the same pool as resources.
    pub fn issue_id(&mut self) -> Result<String> {
        let id = self.ids.next_id();
        if !self.issued.insert(id.clone()) {
            return Err(Error::IdCollision(id));
        }
        Ok(id)
    }

    /// Mark an identifier already present in the document as taken.
    pub fn reserve(&mut self, id: &str) {
        self.issued.insert(id.to_string());
    }

    /// Register a resource under a fresh identifier.
    pub fn register(&mut self, resource: VisualResource) -> Result<ResourceId> {
        let id = ResourceId(self.issue_id()?);
        log::debug!("Registered resource {} as {:?}", id, resource.object_id);
        self.resources.insert(id.clone(), Arc::new(resource));
        Ok(id)
    }

    /// Look up a registered resource.
    pub fn get(&self, id: &ResourceId) -> Result<&VisualResource> {
        self.resources
            .get(id)
            .map(|r| r.as_ref())
            .ok_or_else(|| Error::ResourceNotFound(id.to_string()))
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ConstantIds;

    impl IdGenerator for ConstantIds {
        fn next_id(&self) -> String {
            "0123456789abcdef0123456789abcdef".to_string()
        }
    }

    fn image() -> VisualResource {
        VisualResource::image((5, 0), Size::new(40.0, 20.0))
    }

    #[test]
    fn test_random_ids_are_32_lowercase_hex() {
        let id = RandomIds.next_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new(0xfeed);
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, "000000000000feed0000000000000000");
        assert_eq!(b, "000000000000feed0000000000000001");
    }

    #[test]
    fn test_two_registrations_get_distinct_ids() {
        let mut registry = ResourceRegistry::new();
        let a = registry.register(image()).unwrap();
        let b = registry.register(image()).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_returns_registered_payload() {
        let mut registry = ResourceRegistry::new();
        let id = registry.register(image()).unwrap();
        let first = registry.get(&id).unwrap() as *const VisualResource;
        let second = registry.get(&id).unwrap() as *const VisualResource;
        assert_eq!(first, second);
        assert_eq!(registry.get(&id).unwrap(), &image());
    }

    #[test]
    fn test_get_unknown_id() {
        let registry = ResourceRegistry::new();
        let missing = ResourceId("ffffffffffffffffffffffffffffffff".to_string());
        assert!(matches!(registry.get(&missing), Err(Error::ResourceNotFound(_))));
    }

    #[test]
    fn test_collision_is_reported() {
        let mut registry = ResourceRegistry::with_generator(Arc::new(ConstantIds));
        registry.register(image()).unwrap();
        let err = registry.register(image()).unwrap_err();
        assert!(matches!(err, Error::IdCollision(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reserved_id_collides() {
        let mut registry = ResourceRegistry::with_generator(Arc::new(ConstantIds));
        registry.reserve("0123456789abcdef0123456789abcdef");
        assert!(registry.issue_id().is_err());
    }

    #[test]
    fn test_draw_scale() {
        assert_eq!(image().draw_scale(), Size::new(40.0, 20.0));
        let form = VisualResource::form((6, 0), Size::new(300.0, 60.0));
        assert_eq!(form.draw_scale(), Size::new(1.0, 1.0));
    }
}
