use std::collections::{BTreeSet, VecDeque};

/// Indices within `radius` of `current`. Looping wraps them modulo `count`,
/// otherwise they are clipped to `0..count`.
pub fn window(current: usize, count: usize, radius: usize, looping: bool) -> BTreeSet<usize> {
    if count == 0 {
        return BTreeSet::new();
    }
    let current = current.min(count - 1);
    if looping {
        let span = radius.saturating_mul(2).saturating_add(1);
        if span >= count {
            return (0..count).collect();
        }
        // radius < count here, so current + count - radius never underflows.
        let first = current + count - radius;
        (0..span).map(|offset| (first + offset) % count).collect()
    } else {
        let start = current.saturating_sub(radius);
        let end = current.saturating_add(radius).min(count - 1);
        (start..=end).collect()
    }
}

/// Loaded indices plus the order they were last inside a window, so an
/// optional bound can evict the stalest ones first.
#[derive(Debug, Clone, Default)]
pub struct LoadedSet {
    indices: BTreeSet<usize>,
    recency: VecDeque<usize>,
}

impl LoadedSet {
    pub fn indices(&self) -> &BTreeSet<usize> {
        &self.indices
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.recency.clear();
    }

    /// Union `window` into the set, then trim to `limit` if one is given.
    /// Returns the evicted indices in eviction order.
    pub fn absorb(&mut self, window: &BTreeSet<usize>, limit: Option<usize>) -> Vec<usize> {
        for &index in window {
            self.recency.retain(|&seen| seen != index);
            self.recency.push_back(index);
            self.indices.insert(index);
        }
        let Some(limit) = limit else {
            return Vec::new();
        };
        let limit = limit.max(window.len());
        let mut evicted = Vec::new();
        while self.indices.len() > limit {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            if window.contains(&oldest) {
                // Everything older has already gone; the rest is the live window.
                self.recency.push_front(oldest);
                break;
            }
            self.indices.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }
}
