use crate::api::Pooled;

/// Grow-only arena of reusable instances.
///
/// A slot becomes reusable as soon as its own `exists()` turns false; there is
/// no release call. [`ObjectPool::reclaim`] gathers dead slots into a free list
/// once per frame so `acquire` is O(1) in the common case; a slot that died
/// since the last reclaim is still found by a linear scan before the pool grows.
#[derive(Clone, Debug, Default)]
pub struct ObjectPool<T> {
    slots: Vec<T>,
    /// Dead slot indices, highest first so `pop` yields the lowest.
    free: Vec<usize>,
}

impl<T: Pooled> ObjectPool<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), free: Vec::new() }
    }

    /// Slot count; the high-water mark of concurrently live instances.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.exists()).count()
    }

    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Live instances only.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|s| s.exists())
    }

    /// Live instances only.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|s| s.exists())
    }

    /// Index of a dead slot to reuse, or `None` when every slot is live.
    fn find_dead(&mut self) -> Option<usize> {
        while let Some(i) = self.free.pop() {
            if !self.slots[i].exists() {
                return Some(i);
            }
        }
        self.slots.iter().position(|s| !s.exists())
    }

    /// Hand out a dead slot for the caller to spawn into, growing with `make`
    /// when none is free. The slot stays dead until spawned, so two acquires
    /// without a spawn in between return the same slot.
    pub fn acquire_with(&mut self, make: impl FnOnce() -> T) -> (usize, &mut T) {
        let index = match self.find_dead() {
            Some(i) => i,
            None => {
                self.slots.push(make());
                log::debug!("object pool grew to {} slots", self.slots.len());
                self.slots.len() - 1
            }
        };
        (index, &mut self.slots[index])
    }

    pub fn acquire(&mut self) -> (usize, &mut T)
    where
        T: Default,
    {
        self.acquire_with(T::default)
    }

    /// Rebuild the free list from the current liveness flags. Returns the
    /// number of reusable slots.
    pub fn reclaim(&mut self) -> usize {
        self.free.clear();
        self.free
            .extend((0..self.slots.len()).rev().filter(|&i| !self.slots[i].exists()));
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Camera;

    #[derive(Default)]
    struct Slot {
        alive: bool,
        spawns: u32,
    }

    impl Slot {
        fn spawn(&mut self) {
            self.alive = true;
            self.spawns += 1;
        }
    }

    impl Pooled for Slot {
        fn exists(&self) -> bool {
            self.alive
        }
        fn is_active(&self) -> bool {
            self.alive
        }
        fn is_in_camera(&self) -> bool {
            true
        }
        fn camera_check(&mut self, _camera: &Camera, _tick: f32) {}
    }

    #[test]
    fn grows_only_when_all_slots_live() {
        let mut pool = ObjectPool::<Slot>::new();
        for expected in 0..3 {
            let (i, s) = pool.acquire();
            assert_eq!(i, expected);
            s.spawn();
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.live_count(), 3);
    }

    #[test]
    fn dead_slot_is_reused_without_reclaim() {
        let mut pool = ObjectPool::<Slot>::new();
        let (i, s) = pool.acquire();
        s.spawn();
        pool.acquire().1.spawn();
        pool.get_mut(i).unwrap().alive = false;
        let (j, s) = pool.acquire();
        assert_eq!(j, i);
        s.spawn();
        assert_eq!(pool.get(i).unwrap().spawns, 2);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn reclaim_hands_out_lowest_dead_first() {
        let mut pool = ObjectPool::<Slot>::new();
        for _ in 0..5 {
            pool.acquire().1.spawn();
        }
        for i in [3, 1] {
            pool.get_mut(i).unwrap().alive = false;
        }
        assert_eq!(pool.reclaim(), 2);
        let (a, s) = pool.acquire();
        s.spawn();
        let (b, s) = pool.acquire();
        s.spawn();
        assert_eq!((a, b), (1, 3));
        let (c, _) = pool.acquire();
        assert_eq!(c, 5);
    }

    #[test]
    fn slot_count_never_decreases() {
        let mut pool = ObjectPool::<Slot>::with_capacity(4);
        let mut high = 0;
        for round in 0..20 {
            let (_, s) = pool.acquire();
            s.spawn();
            if round % 3 == 0 {
                for s in pool.slots_mut() {
                    s.alive = false;
                }
                pool.reclaim();
            }
            assert!(pool.len() >= high);
            high = pool.len();
        }
        assert!(pool.iter().count() <= pool.len());
    }
}
