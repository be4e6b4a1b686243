//! # Framework Identifiers
//!
//! Modules, their elements and the elements' sub-elements are addressed by
//! index. A sub-element id carries its owning element, so a driver can find
//! its per-element context from any id it is handed.

use core::fmt;

/// Kind of entity an [`FwkId`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdType {
    /// No entity
    None,
    /// A module
    Module,
    /// An element of a module
    Element,
    /// A sub-element of an element
    SubElement,
}

/// Identifier of a module, element or sub-element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FwkId {
    /// Refers to nothing
    None,
    /// A module
    Module {
        /// Module index
        module: u32,
    },
    /// An element of a module
    Element {
        /// Module index
        module: u32,
        /// Element index
        element: u32,
    },
    /// A sub-element of an element
    SubElement {
        /// Module index
        module: u32,
        /// Element index
        element: u32,
        /// Sub-element index
        sub_element: u32,
    },
}

impl FwkId {
    /// Module identifier
    pub const fn module(module: u32) -> Self {
        FwkId::Module { module }
    }

    /// Element identifier
    pub const fn element(module: u32, element: u32) -> Self {
        FwkId::Element { module, element }
    }

    /// Sub-element identifier
    pub const fn sub_element(module: u32, element: u32, sub_element: u32) -> Self {
        FwkId::SubElement {
            module,
            element,
            sub_element,
        }
    }

    /// Type of this identifier
    pub const fn id_type(&self) -> IdType {
        match self {
            FwkId::None => IdType::None,
            FwkId::Module { .. } => IdType::Module,
            FwkId::Element { .. } => IdType::Element,
            FwkId::SubElement { .. } => IdType::SubElement,
        }
    }

    /// Check the identifier type
    pub const fn is_type(&self, id_type: IdType) -> bool {
        matches!(
            (self.id_type(), id_type),
            (IdType::None, IdType::None)
                | (IdType::Module, IdType::Module)
                | (IdType::Element, IdType::Element)
                | (IdType::SubElement, IdType::SubElement)
        )
    }

    /// Module index, if the id refers to anything
    pub const fn module_idx(&self) -> Option<u32> {
        match *self {
            FwkId::None => None,
            FwkId::Module { module }
            | FwkId::Element { module, .. }
            | FwkId::SubElement { module, .. } => Some(module),
        }
    }

    /// Element index for element and sub-element ids
    pub const fn element_idx(&self) -> Option<u32> {
        match *self {
            FwkId::Element { element, .. } | FwkId::SubElement { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Sub-element index for sub-element ids
    pub const fn sub_element_idx(&self) -> Option<u32> {
        match *self {
            FwkId::SubElement { sub_element, .. } => Some(sub_element),
            _ => None,
        }
    }

    /// Element id owning this id (the id itself for elements)
    pub const fn to_element(&self) -> Option<FwkId> {
        match *self {
            FwkId::Element { module, element } | FwkId::SubElement { module, element, .. } => {
                Some(FwkId::Element { module, element })
            },
            _ => None,
        }
    }
}

impl fmt::Display for FwkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FwkId::None => write!(f, "none"),
            FwkId::Module { module } => write!(f, "mod{}", module),
            FwkId::Element { module, element } => write!(f, "mod{}:elem{}", module, element),
            FwkId::SubElement {
                module,
                element,
                sub_element,
            } => write!(f, "mod{}:elem{}:sub{}", module, element, sub_element),
        }
    }
}

/// Identifier of an event owned by a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId {
    /// Owning module index
    pub module: u32,
    /// Event index within the module
    pub idx: u32,
}

impl EventId {
    /// Create an event id
    pub const fn new(module: u32, idx: u32) -> Self {
        Self { module, idx }
    }
}

/// Identifier of a notification published by a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId {
    /// Owning module index
    pub module: u32,
    /// Notification index within the module
    pub idx: u32,
}

impl NotificationId {
    /// Create a notification id
    pub const fn new(module: u32, idx: u32) -> Self {
        Self { module, idx }
    }
}

/// Identifier of an API exposed by a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiId {
    /// Owning module index
    pub module: u32,
    /// API index within the module
    pub idx: u32,
}

impl ApiId {
    /// Create an API id
    pub const fn new(module: u32, idx: u32) -> Self {
        Self { module, idx }
    }
}
