//! Ordered collection of component descriptors
//!
//! The registry is filled by the CLI layer one directive at a time: a file
//! starts a new component and the following address, type and index
//! directives apply to it. Order of insertion is the order of the image.

use crate::component::{ComponentDescriptor, ComponentType};
use crate::error::{BlobError, Result};
use std::path::PathBuf;
use tracing::warn;

/// Ordered, owned list of components awaiting layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRegistry {
    components: Vec<ComponentDescriptor>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a registry fluently
    pub fn builder() -> ComponentRegistryBuilder {
        ComponentRegistryBuilder::new()
    }

    /// Append a fully populated descriptor
    pub fn push(&mut self, descriptor: ComponentDescriptor) {
        self.components.push(descriptor);
    }

    /// Start a new component for `path`; later directives apply to it
    pub fn start_component(&mut self, path: impl Into<PathBuf>) {
        self.components.push(ComponentDescriptor::new(path));
    }

    /// Set the destination address of the current component
    pub fn set_dest_addr(&mut self, dest_addr: u32) -> Result<()> {
        self.current("dest")?.dest_addr = dest_addr;
        Ok(())
    }

    /// Set the type of the current component
    pub fn set_type(&mut self, component_type: ComponentType) -> Result<()> {
        self.current("type")?.set_type(component_type);
        Ok(())
    }

    /// Set the type of the current component from a CLI token
    ///
    /// An unknown token leaves the type untouched; planning rejects a
    /// component whose type is still unset.
    pub fn set_type_token(&mut self, token: &str) -> Result<()> {
        let current = self.current("type")?;
        if !current.set_type_token(token) {
            warn!(
                "unknown component type '{}' for {}",
                token,
                current.source_path.display()
            );
        }
        Ok(())
    }

    /// Set the archive slot of the current component
    pub fn set_archive_index(&mut self, index: u32) -> Result<()> {
        self.current("index")?.set_archive_index(index);
        Ok(())
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component has been registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over components in image order
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentDescriptor> {
        self.components.iter()
    }

    /// Take the descriptors out of the registry
    pub fn into_inner(self) -> Vec<ComponentDescriptor> {
        self.components
    }

    fn current(&mut self, directive: &'static str) -> Result<&mut ComponentDescriptor> {
        self.components
            .last_mut()
            .ok_or(BlobError::NoActiveComponent { directive })
    }
}

impl FromIterator<ComponentDescriptor> for ComponentRegistry {
    fn from_iter<I: IntoIterator<Item = ComponentDescriptor>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ComponentRegistry {
    type Item = &'a ComponentDescriptor;
    type IntoIter = std::slice::Iter<'a, ComponentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Builder for constructing a `ComponentRegistry` in code
pub struct ComponentRegistryBuilder {
    components: Vec<ComponentDescriptor>,
}

impl ComponentRegistryBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Add a component with its address and type
    #[must_use]
    pub fn component(
        mut self,
        path: impl Into<PathBuf>,
        dest_addr: u32,
        component_type: ComponentType,
    ) -> Self {
        self.components.push(
            ComponentDescriptor::new(path)
                .with_dest_addr(dest_addr)
                .with_type(component_type),
        );
        self
    }

    /// Add a prepared descriptor
    #[must_use]
    pub fn descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.components.push(descriptor);
        self
    }

    /// Build the registry
    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            components: self.components,
        }
    }
}

impl Default for ComponentRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
