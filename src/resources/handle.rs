//! Wraps an arena index to provide a typesafe handle.
//!
//! Two handles compare equal only if they refer to the same slot *and* generation, so a
//! handle outliving its resource never aliases whatever takes the slot next.

use generational_arena::Index;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

pub struct Handle<R>(Index, PhantomData<R>);

impl<R> Handle<R> {
    /// Returns the underlying arena index.
    pub fn index(&self) -> Index {
        self.0
    }
}

impl<R> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Self(self.0, PhantomData)
    }
}

impl<R> Copy for Handle<R> {}

impl<R> PartialEq for Handle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R> Eq for Handle<R> {}

impl<R> Hash for Handle<R> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<R> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<R>();
        let name = name.rsplit("::").next().unwrap_or(name);
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "Handle<{}>({}v{})", name, slot, generation)
    }
}

impl<R> From<Index> for Handle<R> {
    fn from(index: Index) -> Self {
        Self(index, PhantomData)
    }
}

impl<R> From<Handle<R>> for Index {
    fn from(handle: Handle<R>) -> Self {
        handle.0
    }
}
