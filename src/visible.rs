use crate::api::Pooled;

/// Per-frame camera-filtered view over a pool's slots.
///
/// Holds slot indices rather than references so the slots can be mutated
/// while the view is walked.
#[derive(Clone, Debug, Default)]
pub struct VisibleBuffer {
    indices: Vec<usize>,
}

impl VisibleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the slots that are in the camera and active, in slot order.
    pub fn refresh<T: Pooled>(&mut self, slots: &[T]) {
        self.indices.clear();
        self.indices.extend(
            slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_in_camera() && s.is_active())
                .map(|(i, _)| i),
        );
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Slot indices captured by the last refresh.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Call `f(slot, position)` for every captured slot from `start` on.
    /// `position` is the index within this buffer. `slots` should be the
    /// slice passed to `refresh`; indices past its end are skipped.
    pub fn iterate<T, F>(&self, slots: &mut [T], start: usize, mut f: F)
    where
        F: FnMut(&mut T, usize),
    {
        for (pos, &i) in self.indices.iter().enumerate().skip(start) {
            if let Some(slot) = slots.get_mut(i) {
                f(slot, pos);
            }
        }
    }

    /// Visit every unordered pair of captured slots exactly once, never a slot
    /// with itself. Slots that left the camera or stopped being active since
    /// the refresh are skipped. Returns the number of pairs visited.
    pub fn for_each_pair<T, F>(&self, slots: &mut [T], mut f: F) -> usize
    where
        T: Pooled,
        F: FnMut(&mut T, &mut T),
    {
        let mut visited = 0;
        for (pos, &a) in self.indices.iter().enumerate() {
            for &b in &self.indices[pos + 1..] {
                // Indices are ascending, so `a < b` and nothing later fits either.
                if b >= slots.len() {
                    break;
                }
                let (head, tail) = slots.split_at_mut(b);
                let (first, second) = (&mut head[a], &mut tail[0]);
                if !still_visible(first) {
                    break;
                }
                if !still_visible(second) {
                    continue;
                }
                f(first, second);
                visited += 1;
            }
        }
        visited
    }
}

fn still_visible<T: Pooled>(s: &T) -> bool {
    s.is_in_camera() && s.is_active()
}
