use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

/// Unique identifier for an entity in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Get the underlying integer ID (useful for debugging or serialization).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Type-erased per-component storage, so `despawn` can sweep every storage
/// without knowing the component types involved.
trait ComponentStore {
    fn remove_entity(&mut self, entity: EntityId);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ComponentStore for HashMap<EntityId, T> {
    fn remove_entity(&mut self, entity: EntityId) {
        self.remove(&entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Entity container with typed component storage.
///
/// Entities are plain `EntityId`s; components of type `T` live in a
/// `HashMap<EntityId, T>` keyed by the component's Rust type. Deliberately
/// small: `spawn`/`despawn`, `insert`/`remove`/`get`, and single-type
/// iteration are all the game core needs.
pub struct World {
    next_id: u32,
    alive: HashSet<EntityId>,
    storages: HashMap<TypeId, Box<dyn ComponentStore>>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            alive: HashSet::new(),
            storages: HashMap::new(),
        }
    }

    /// Spawn a new entity and return its `EntityId`.
    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.alive.insert(id);
        id
    }

    /// Despawn an entity, removing it and all of its components.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Number of alive entities.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Returns true if there are no entities in the world.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Insert a component of type `T` for an entity, overwriting any existing
    /// component of that type.
    pub fn insert<T: 'static>(&mut self, entity: EntityId, component: T) {
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(HashMap::<EntityId, T>::new()));
        storage
            .as_any_mut()
            .downcast_mut::<HashMap<EntityId, T>>()
            .expect("World storage type mismatch")
            .insert(entity, component);
    }

    /// Remove and return a component of type `T` for an entity, if it exists.
    pub fn remove<T: 'static>(&mut self, entity: EntityId) -> Option<T> {
        self.storage_mut::<T>()?.remove(&entity)
    }

    /// Get an immutable reference to a component of type `T` for an entity.
    pub fn get<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(&entity)
    }

    /// Get a mutable reference to a component of type `T` for an entity.
    pub fn get_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(&entity)
    }

    /// Returns true if the entity currently has a component of type `T`.
    pub fn has<T: 'static>(&self, entity: EntityId) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Iterate over all entities that have a component of type `T`.
    ///
    /// Collects into an owned `Vec` to avoid lifetime gymnastics; the
    /// component counts in this game are tiny.
    pub fn query<T: 'static>(&self) -> Vec<(EntityId, &T)> {
        match self.storage::<T>() {
            Some(map) => {
                let mut pairs: Vec<_> = map.iter().map(|(&e, c)| (e, c)).collect();
                // HashMap iteration order is arbitrary; keep queries deterministic.
                pairs.sort_by_key(|(e, _)| *e);
                pairs
            }
            None => Vec::new(),
        }
    }

    fn storage<T: 'static>(&self) -> Option<&HashMap<EntityId, T>> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<HashMap<EntityId, T>>()
    }

    fn storage_mut<T: 'static>(&mut self) -> Option<&mut HashMap<EntityId, T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<HashMap<EntityId, T>>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(i32);
    struct Label(&'static str);

    #[test]
    fn insert_and_get_components() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Health(3));
        world.insert(e, Label("gnome"));

        assert_eq!(world.get::<Health>(e).unwrap().0, 3);
        assert_eq!(world.get::<Label>(e).unwrap().0, "gnome");
        assert!(world.has::<Health>(e));
    }

    #[test]
    fn despawn_removes_all_components() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Health(1));
        world.insert(e, Label("x"));

        assert!(world.despawn(e));
        assert!(!world.is_alive(e));
        assert!(world.get::<Health>(e).is_none());
        assert!(world.get::<Label>(e).is_none());
        // Despawning twice is a no-op.
        assert!(!world.despawn(e));
    }

    #[test]
    fn remove_returns_the_component() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Health(7));
        assert_eq!(world.remove::<Health>(e).unwrap().0, 7);
        assert!(world.remove::<Health>(e).is_none());
    }

    #[test]
    fn query_is_deterministic() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();
        world.insert(c, Health(3));
        world.insert(a, Health(1));
        world.insert(b, Health(2));

        let ids: Vec<_> = world.query::<Health>().into_iter().map(|(e, _)| e).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}
