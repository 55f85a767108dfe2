//! Runtime type registry.
//!
//! Every polymorphic class in Tessel owns exactly one [`Type`] descriptor,
//! built lazily on first use and chained to the descriptor of its declared
//! base. The chain is what style lookup walks, and it is what lets
//! [`upcast`] and [`downcast`] answer "is this object a `T`?" without
//! relying on anything more than single inheritance.
//!
//! Descriptors are declared with `#[derive(Typed)]`:
//!
//! ```rust,ignore
//! use tessel_core::object::{Typed, upcast};
//!
//! #[derive(Typed)]
//! struct Button {
//!     pressed: bool,
//! }
//!
//! #[derive(Typed)]
//! struct Toggle {
//!     #[base]
//!     button: Button,
//!     on: bool,
//! }
//!
//! let toggle = Toggle { button: Button { pressed: false }, on: true };
//! assert!(Toggle::cls().upcast(Button::cls()));
//! assert!(upcast::<Button>(&toggle).is_some());
//! ```
//!
//! A `#[base]` field embeds the base by composition, so an upcast returns the
//! concrete embedded value. `#[typed(base = Path)]` declares a base without
//! embedding it; such an upcast passes the type check but only resolves if the
//! object (or something it embeds) really is a `T`.
//!
//! Failure is always reported as `None`, never as a panic.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

pub use tessel_core_macros::Typed;

static NEXT_TYPE_ID: AtomicU32 = AtomicU32::new(1);

/// Immutable runtime descriptor of a class.
pub struct Type {
    id: u32,
    name: &'static str,
    base: Option<&'static Type>,
}

impl Type {
    /// Create a descriptor with a fresh identity.
    ///
    /// Normally called once per class from the `Typed::cls` generated by
    /// `#[derive(Typed)]`; two calls never produce equal descriptors.
    pub fn new(name: &'static str, base: Option<&'static Type>) -> Self {
        Type {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            base,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base(&self) -> Option<&'static Type> {
        self.base
    }

    /// `true` if `target` is this type or one of its transitive bases.
    pub fn upcast(&self, target: &Type) -> bool {
        self.ancestors().any(|ty| ty == target)
    }

    /// This type followed by each base, most derived first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Number of bases above this type.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base", &self.base.map(Type::name))
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a type and its bases.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a Type>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Type;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base;
        Some(current)
    }
}

/// A class with a static type descriptor.
pub trait Typed: 'static {
    /// The unique descriptor for this class.
    fn cls() -> &'static Type;
}

/// An object that knows its runtime type.
pub trait TypeObject: Any {
    /// The runtime type of this object, which may be more derived than the
    /// static type of the reference.
    fn object_type(&self) -> &'static Type;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The object this one embeds as its base, if any.
    fn embedded(&self) -> Option<&dyn TypeObject> {
        None
    }

    fn embedded_mut(&mut self) -> Option<&mut dyn TypeObject> {
        None
    }
}

/// The descriptor for `T`.
#[inline]
pub fn cls<T: Typed>() -> &'static Type {
    T::cls()
}

/// View `object` as a `T` if `T` is its type or one of its bases.
pub fn upcast<T: Typed>(object: &dyn TypeObject) -> Option<&T> {
    if !object.object_type().upcast(T::cls()) {
        return None;
    }
    find_part(object)
}

pub fn upcast_mut<T: Typed>(object: &mut dyn TypeObject) -> Option<&mut T> {
    if !object.object_type().upcast(T::cls()) {
        return None;
    }
    find_part_mut(object)
}

/// View `object` as a `T` only if its runtime type is exactly `T`.
pub fn downcast<T: Typed>(object: &dyn TypeObject) -> Option<&T> {
    if object.object_type() != T::cls() {
        return None;
    }
    find_part(object)
}

pub fn downcast_mut<T: Typed>(object: &mut dyn TypeObject) -> Option<&mut T> {
    if object.object_type() != T::cls() {
        return None;
    }
    find_part_mut(object)
}

fn find_part<T: 'static>(object: &dyn TypeObject) -> Option<&T> {
    let mut current = Some(object);
    while let Some(part) = current {
        if let Some(found) = part.as_any().downcast_ref::<T>() {
            return Some(found);
        }
        current = part.embedded();
    }
    None
}

fn find_part_mut<T: 'static>(object: &mut dyn TypeObject) -> Option<&mut T> {
    if object.as_any().is::<T>() {
        return object.as_any_mut().downcast_mut::<T>();
    }
    object.embedded_mut().and_then(|inner| find_part_mut::<T>(inner))
}
