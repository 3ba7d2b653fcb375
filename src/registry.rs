use std::{fmt, marker::PhantomData};

use parking_lot::{Mutex, MutexGuard};

use crate::entity::Entity;

/// Typed, index-stable reference to an entity in a [`Registry`].
///
/// A handle goes stale when its entity is unregistered; the slot may be reused
/// but the generation check keeps the old handle from reaching the newcomer.
pub struct Handle<T> {
    index: usize,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

struct Slot {
    generation: u32,
    entity: Option<Box<dyn Entity>>,
}

/// Arena of live entities, iterated in registration order.
#[derive(Default)]
pub struct Entities {
    slots: Vec<Slot>,
    order: Vec<usize>,
    free: Vec<usize>,
}

impl Entities {
    pub fn insert<T: Entity>(&mut self, entity: T) -> Handle<T> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entity: None,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        slot.entity = Some(Box::new(entity));
        self.order.push(index);

        Handle {
            index,
            generation: slot.generation,
            _marker: PhantomData,
        }
    }

    pub fn remove<T: Entity>(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)?;
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        self.order.retain(|&index| index != handle.index);
        self.free.push(handle.index);

        entity.into_any().downcast::<T>().ok().map(|entity| *entity)
    }

    pub fn contains<T: Entity>(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get<T: Entity>(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Entity>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    pub fn for_each(&self, mut f: impl FnMut(&dyn Entity)) {
        for &index in &self.order {
            if let Some(entity) = self.slots[index].entity.as_deref() {
                f(entity);
            }
        }
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut (dyn Entity + 'static))) {
        for &index in &self.order {
            if let Some(entity) = self.slots[index].entity.as_deref_mut() {
                f(entity);
            }
        }
    }

    /// Advance every entity by one tick, in registration order.
    pub fn update_all(&mut self, delta_time: f32) {
        self.for_each_mut(|entity| entity.update(delta_time));
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Entities shared by the update and render threads.
///
/// One mutex guards the whole arena: registering, unregistering, updating and
/// rendering all go through it.
#[derive(Default)]
pub struct Registry {
    entities: Mutex<Entities>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Entity>(&self, entity: T) -> Handle<T> {
        self.entities.lock().insert(entity)
    }

    pub fn unregister<T: Entity>(&self, handle: Handle<T>) -> Option<T> {
        self.entities.lock().remove(handle)
    }

    pub fn lock(&self) -> MutexGuard<'_, Entities> {
        self.entities.lock()
    }

    pub fn for_each(&self, f: impl FnMut(&dyn Entity)) {
        self.entities.lock().for_each(f);
    }

    pub fn len(&self) -> usize {
        self.entities.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.lock().is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}
