//! Widget object registry.
//!
//! Every widget registers a node in an arena ([`ObjectRegistry`]) and is
//! addressed by a stable [`ObjectId`]. The arena records the containment
//! tree (parent and ordered children), names, and the visible/enabled flags
//! used to compute effective state through ancestors.
//!
//! Rust ownership of the widget structs is independent of the arena. When a
//! widget struct is dropped its [`ObjectBase`] detaches the node and marks it
//! orphaned. Orphans are only deallocated by
//! [`ObjectRegistry::collect_garbage`], and never while a [`Retained`] handle
//! (for example one held by an in-progress drag) still refers to them.

use std::sync::OnceLock;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a widget in the registry.
    ///
    /// `ObjectId`s stay valid while the tree changes around them. They become
    /// invalid once the node is destroyed or garbage collected.
    pub struct ObjectId;
}

/// Errors that can occur during object operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The object ID is invalid or has been destroyed.
    #[error("invalid or destroyed object id")]
    InvalidObjectId,
    /// Attempted to set an object as its own parent/ancestor.
    #[error("cannot set an object as its own parent or ancestor")]
    CircularParentage,
}

/// Result type for object operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Internal data stored in the registry for each object.
#[derive(Debug)]
struct ObjectData {
    name: String,
    type_name: &'static str,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    visible: bool,
    enabled: bool,
    /// Outstanding [`Retained`] handles.
    retain_count: usize,
    /// The owning widget struct has been dropped.
    orphaned: bool,
}

impl ObjectData {
    fn new(type_name: &'static str) -> Self {
        Self {
            name: String::new(),
            type_name,
            parent: None,
            children: Vec::new(),
            visible: true,
            enabled: true,
            retain_count: 0,
            orphaned: false,
        }
    }
}

/// Arena of widget nodes.
///
/// # Related Types
///
/// - [`SharedObjectRegistry`] - Lock-protected wrapper used as the global instance
/// - [`ObjectBase`] - Registers a node on construction and orphans it on drop
pub struct ObjectRegistry {
    objects: SlotMap<ObjectId, ObjectData>,
}

impl ObjectRegistry {
    /// Create a new empty object registry.
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Register a new node and return its ID.
    pub fn register(&mut self, type_name: &'static str) -> ObjectId {
        let id = self.objects.insert(ObjectData::new(type_name));
        tracing::trace!(target: targets::OBJECT, ?id, type_name, "registered object");
        id
    }

    /// Remove a node and all its descendants immediately.
    #[tracing::instrument(skip(self), target = "charter_core::object", level = "trace")]
    pub fn destroy(&mut self, id: ObjectId) -> ObjectResult<()> {
        let descendants = self.collect_descendants(id)?;
        tracing::trace!(
            target: targets::OBJECT,
            ?id,
            descendant_count = descendants.len(),
            "destroying object tree"
        );

        self.unlink_from_parent(id);
        for child_id in descendants {
            self.objects.remove(child_id);
        }
        self.objects.remove(id);
        Ok(())
    }

    fn collect_descendants(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        let mut stack = self.data(id)?.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(data) = self.objects.get(child) {
                stack.extend(data.children.iter().copied());
                result.push(child);
            }
        }
        Ok(result)
    }

    fn unlink_from_parent(&mut self, id: ObjectId) {
        let parent = self.objects.get(id).and_then(|d| d.parent);
        if let Some(parent_id) = parent {
            if let Some(parent_data) = self.objects.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }
        if let Some(data) = self.objects.get_mut(id) {
            data.parent = None;
        }
    }

    fn data(&self, id: ObjectId) -> ObjectResult<&ObjectData> {
        self.objects.get(id).ok_or(ObjectError::InvalidObjectId)
    }

    fn data_mut(&mut self, id: ObjectId) -> ObjectResult<&mut ObjectData> {
        self.objects.get_mut(id).ok_or(ObjectError::InvalidObjectId)
    }

    /// Check if a node exists in the registry.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Set the parent of a node, appending it to the new parent's children.
    ///
    /// Passing `None` makes the node a root.
    pub fn set_parent(&mut self, id: ObjectId, new_parent: Option<ObjectId>) -> ObjectResult<()> {
        self.data(id)?;
        if let Some(parent_id) = new_parent {
            self.data(parent_id)?;
            if self.is_ancestor_of(id, parent_id) {
                return Err(ObjectError::CircularParentage);
            }
        }

        self.unlink_from_parent(id);
        self.data_mut(id)?.parent = new_parent;
        if let Some(parent_id) = new_parent {
            self.data_mut(parent_id)?.children.push(id);
        }
        Ok(())
    }

    /// Remove a node from its parent's child list without deallocating it.
    pub fn detach(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data(id)?;
        self.unlink_from_parent(id);
        Ok(())
    }

    fn is_ancestor_of(&self, potential_ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.objects.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        Ok(self.data(id)?.parent)
    }

    /// Get the children of a node, back to front.
    pub fn children(&self, id: ObjectId) -> ObjectResult<&[ObjectId]> {
        Ok(&self.data(id)?.children)
    }

    /// Get the name of a node.
    pub fn object_name(&self, id: ObjectId) -> ObjectResult<&str> {
        Ok(&self.data(id)?.name)
    }

    /// Set the name of a node.
    pub fn set_object_name(&mut self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.data_mut(id)?.name = name;
        Ok(())
    }

    /// Get the type name a node was registered with.
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        Ok(self.data(id)?.type_name)
    }

    /// Find a direct child by name.
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        Ok(self
            .data(id)?
            .children
            .iter()
            .copied()
            .find(|&child| self.objects.get(child).is_some_and(|d| d.name == name)))
    }

    // =========================================================================
    // Widget state
    // =========================================================================

    /// Set a node's own visibility.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> ObjectResult<()> {
        self.data_mut(id)?.visible = visible;
        Ok(())
    }

    /// Set a node's own enabled flag.
    pub fn set_enabled(&mut self, id: ObjectId, enabled: bool) -> ObjectResult<()> {
        self.data_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// A node's own visibility, ignoring ancestors.
    pub fn is_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        Ok(self.data(id)?.visible)
    }

    /// A node's own enabled flag, ignoring ancestors.
    pub fn is_enabled(&self, id: ObjectId) -> ObjectResult<bool> {
        Ok(self.data(id)?.enabled)
    }

    /// Visible if the node and every ancestor is visible.
    pub fn is_effectively_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        self.all_ancestors(id, |d| d.visible)
    }

    /// Enabled if the node and every ancestor is enabled.
    pub fn is_effectively_enabled(&self, id: ObjectId) -> ObjectResult<bool> {
        self.all_ancestors(id, |d| d.enabled)
    }

    fn all_ancestors(
        &self,
        id: ObjectId,
        pred: impl Fn(&ObjectData) -> bool,
    ) -> ObjectResult<bool> {
        let mut current = Some(self.data(id)?);
        while let Some(data) = current {
            if !pred(data) {
                return Ok(false);
            }
            current = data.parent.and_then(|p| self.objects.get(p));
        }
        Ok(true)
    }

    // =========================================================================
    // Z-order
    // =========================================================================

    /// Move a node to the front of its siblings.
    pub fn raise(&mut self, id: ObjectId) -> ObjectResult<()> {
        if let Some(parent_id) = self.data(id)?.parent {
            let siblings = &mut self.data_mut(parent_id)?.children;
            siblings.retain(|&child| child != id);
            siblings.push(id);
        }
        Ok(())
    }

    /// Index among siblings; 0 is the back.
    pub fn sibling_index(&self, id: ObjectId) -> ObjectResult<Option<usize>> {
        let Some(parent_id) = self.data(id)?.parent else {
            return Ok(None);
        };
        Ok(self.data(parent_id)?.children.iter().position(|&c| c == id))
    }

    // =========================================================================
    // Lifetime
    // =========================================================================

    /// Increment the retain count of a node.
    pub fn retain(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?.retain_count += 1;
        Ok(())
    }

    /// Decrement the retain count of a node.
    pub fn release(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        data.retain_count = data.retain_count.saturating_sub(1);
        Ok(())
    }

    /// Current retain count of a node.
    pub fn retain_count(&self, id: ObjectId) -> ObjectResult<usize> {
        Ok(self.data(id)?.retain_count)
    }

    /// Mark a node as no longer owned, detaching it from its parent.
    pub fn orphan(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.unlink_from_parent(id);
        self.data_mut(id)?.orphaned = true;
        Ok(())
    }

    /// Whether a node's owner has been dropped.
    pub fn is_orphaned(&self, id: ObjectId) -> ObjectResult<bool> {
        Ok(self.data(id)?.orphaned)
    }

    /// Deallocate every orphaned node that is no longer retained.
    ///
    /// Intended to run once at the end of each frame. Returns the number of
    /// nodes removed.
    pub fn collect_garbage(&mut self) -> usize {
        let doomed: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, d)| d.orphaned && d.retain_count == 0)
            .map(|(id, _)| id)
            .collect();

        for &id in &doomed {
            let children = self
                .objects
                .get(id)
                .map(|d| d.children.clone())
                .unwrap_or_default();
            for child in children {
                if let Some(child_data) = self.objects.get_mut(child) {
                    child_data.parent = None;
                }
            }
            self.objects.remove(id);
        }

        if !doomed.is_empty() {
            tracing::trace!(
                target: targets::OBJECT,
                removed = doomed.len(),
                "collected orphaned objects"
            );
        }
        doomed.len()
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Total number of nodes, orphans included.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// All nodes without a parent that are still owned.
    pub fn root_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .filter(|(_, d)| d.parent.is_none() && !d.orphaned)
            .map(|(id, _)| id)
    }

    /// Ancestors from the parent upward.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(parent_id) = current {
            result.push(parent_id);
            current = self.objects.get(parent_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// The node and its descendants in pre-order.
    pub fn depth_first_preorder(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.data(id)?;
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(data) = self.objects.get(current) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        Ok(result)
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A lock-protected [`ObjectRegistry`] with an owned-value API.
pub struct SharedObjectRegistry {
    inner: RwLock<ObjectRegistry>,
}

impl SharedObjectRegistry {
    /// Create a new empty shared registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ObjectRegistry::new()),
        }
    }

    /// Run a closure with shared access to the registry.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ObjectRegistry) -> R,
    {
        f(&self.inner.read())
    }

    /// Run a closure with exclusive access to the registry.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ObjectRegistry) -> R,
    {
        f(&mut self.inner.write())
    }

    pub fn register(&self, type_name: &'static str) -> ObjectId {
        self.inner.write().register(type_name)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner.read().contains(id)
    }

    pub fn set_parent(&self, id: ObjectId, parent: Option<ObjectId>) -> ObjectResult<()> {
        self.inner.write().set_parent(id, parent)
    }

    pub fn detach(&self, id: ObjectId) -> ObjectResult<()> {
        self.inner.write().detach(id)
    }

    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.inner.read().parent(id)
    }

    pub fn children(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().children(id).map(<[ObjectId]>::to_vec)
    }

    pub fn object_name(&self, id: ObjectId) -> ObjectResult<String> {
        self.inner.read().object_name(id).map(str::to_owned)
    }

    pub fn set_object_name(&self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.inner.write().set_object_name(id, name)
    }

    pub fn set_visible(&self, id: ObjectId, visible: bool) -> ObjectResult<()> {
        self.inner.write().set_visible(id, visible)
    }

    pub fn set_enabled(&self, id: ObjectId, enabled: bool) -> ObjectResult<()> {
        self.inner.write().set_enabled(id, enabled)
    }

    pub fn is_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        self.inner.read().is_visible(id)
    }

    pub fn is_enabled(&self, id: ObjectId) -> ObjectResult<bool> {
        self.inner.read().is_enabled(id)
    }

    pub fn is_effectively_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        self.inner.read().is_effectively_visible(id)
    }

    pub fn is_effectively_enabled(&self, id: ObjectId) -> ObjectResult<bool> {
        self.inner.read().is_effectively_enabled(id)
    }

    pub fn raise(&self, id: ObjectId) -> ObjectResult<()> {
        self.inner.write().raise(id)
    }

    pub fn sibling_index(&self, id: ObjectId) -> ObjectResult<Option<usize>> {
        self.inner.read().sibling_index(id)
    }

    pub fn orphan(&self, id: ObjectId) -> ObjectResult<()> {
        self.inner.write().orphan(id)
    }

    pub fn retain_count(&self, id: ObjectId) -> ObjectResult<usize> {
        self.inner.read().retain_count(id)
    }

    /// Retain a node for as long as the returned handle (or a clone) lives.
    pub fn retain(&'static self, id: ObjectId) -> ObjectResult<Retained> {
        self.inner.write().retain(id)?;
        Ok(Retained { registry: self, id })
    }

    pub fn collect_garbage(&self) -> usize {
        self.inner.write().collect_garbage()
    }

    pub fn object_count(&self) -> usize {
        self.inner.read().object_count()
    }
}

impl Default for SharedObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: OnceLock<SharedObjectRegistry> = OnceLock::new();

/// The process-wide widget registry, created on first use.
pub fn global_registry() -> &'static SharedObjectRegistry {
    GLOBAL_REGISTRY.get_or_init(SharedObjectRegistry::new)
}

/// A counted reference that keeps a node from being garbage collected.
///
/// Holding a `Retained` does not keep the widget struct alive; it only keeps
/// the arena node (and so its id) valid after the owner detaches or drops it.
pub struct Retained {
    registry: &'static SharedObjectRegistry,
    id: ObjectId,
}

impl Retained {
    /// The retained node.
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Clone for Retained {
    fn clone(&self) -> Self {
        let _ = self.registry.inner.write().retain(self.id);
        Self {
            registry: self.registry,
            id: self.id,
        }
    }
}

impl Drop for Retained {
    fn drop(&mut self) {
        let _ = self.registry.inner.write().release(self.id);
    }
}

impl std::fmt::Debug for Retained {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Retained").field(&self.id).finish()
    }
}

/// Per-widget registry membership.
///
/// Construction registers a node in the [`global_registry`]; dropping the
/// base orphans the node so it is reclaimed by the next garbage collection.
pub struct ObjectBase {
    id: ObjectId,
}

impl ObjectBase {
    /// Register a new node of the given type.
    pub fn new<T: ?Sized + 'static>() -> Self {
        let id = global_registry().register(std::any::type_name::<T>());
        Self { id }
    }

    /// Get the object's ID.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the object's name.
    pub fn name(&self) -> String {
        global_registry().object_name(self.id).unwrap_or_default()
    }

    /// Set the object's name.
    pub fn set_name(&self, name: impl Into<String>) {
        let _ = global_registry().set_object_name(self.id, name.into());
    }

    /// Get the parent object ID.
    pub fn parent(&self) -> Option<ObjectId> {
        global_registry().parent(self.id).ok().flatten()
    }

    /// Set the parent object.
    pub fn set_parent(&self, parent: Option<ObjectId>) -> ObjectResult<()> {
        global_registry().set_parent(self.id, parent)
    }

    /// Remove this node from its parent without orphaning it.
    pub fn detach(&self) {
        let _ = global_registry().detach(self.id);
    }

    /// Get child object IDs, back to front.
    pub fn children(&self) -> Vec<ObjectId> {
        global_registry().children(self.id).unwrap_or_default()
    }

    /// Raise this object to the front of its siblings.
    pub fn raise(&self) {
        let _ = global_registry().raise(self.id);
    }

    /// Retain this node beyond the lifetime of its owner.
    pub fn retain(&self) -> ObjectResult<Retained> {
        global_registry().retain(self.id)
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        let _ = global_registry().orphan(self.id);
    }
}

impl std::fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBase").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(SharedObjectRegistry: Send, Sync);
static_assertions::assert_impl_all!(ObjectBase: Send, Sync);
