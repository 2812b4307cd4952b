//! Generic bounded FIFO window

use std::collections::VecDeque;

/// Bounded FIFO window over arbitrary items.
///
/// Unlike a general ring buffer this is single-writer by design: each
/// session's state is touched by one in-flight frame at a time, so plain
/// `VecDeque` storage is sufficient.
#[derive(Debug, Clone)]
pub struct Window<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> Window<T> {
    /// Create a window with the given capacity (must be > 0)
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an item, evicting the oldest when full
    pub fn push(&mut self, item: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(item);
    }

    /// Number of buffered items
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Window capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest buffered item
    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    /// Most recent buffered item
    pub fn back(&self) -> Option<&T> {
        self.data.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Drop all buffered items
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_order() {
        let mut window = Window::new(10);
        for i in 0..5 {
            window.push(i);
        }

        assert_eq!(window.len(), 5);
        assert_eq!(window.front(), Some(&0));
        assert_eq!(window.back(), Some(&4));

        let items: Vec<i32> = window.iter().copied().collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut window = Window::new(3);
        for i in 0..7 {
            window.push(i);
        }

        assert_eq!(window.len(), 3);
        let items: Vec<i32> = window.iter().copied().collect();
        assert_eq!(items, vec![4, 5, 6]);
    }

    #[test]
    fn test_clear() {
        let mut window = Window::new(4);
        window.push(1);
        window.push(2);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 4);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..64, pushes in 0usize..512) {
            let mut window = Window::new(capacity);
            for i in 0..pushes {
                window.push(i);
                prop_assert!(window.len() <= capacity);
            }
            if pushes >= capacity {
                // Oldest surviving item is exactly pushes - capacity
                prop_assert_eq!(window.front().copied(), Some(pushes - capacity));
            }
        }
    }
}
