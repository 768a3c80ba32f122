//! Intrusive LRU List
//!
//! A capacity-bounded doubly linked list whose link fields live inside the
//! nodes themselves. The list never allocates or frees: callers own the nodes
//! and hand the list pointers to them, which lets one node move between several
//! lists (the young and old generations of a cache) without reallocating.
//!
//! Capacity is enforced by [`LruList::add`] itself: an insertion that would
//! overflow unlinks and returns the least recently used node in the same call,
//! so the list is never observed above its capacity.

extern crate alloc;

use core::fmt;
use core::marker::PhantomData;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

/// Link fields embedded in every node that can sit in an [`LruList`].
pub struct Links<T> {
    /// Neighbour towards the head (more recent), or null at the head.
    prev: *mut T,
    /// Neighbour towards the tail (less recent), or null at the tail.
    next: *mut T,
}

impl<T> Links<T> {
    /// Creates unlinked fields.
    pub const fn new() -> Self {
        Links {
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    fn reset(&mut self) {
        self.prev = ptr::null_mut();
        self.next = ptr::null_mut();
    }
}

impl<T> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

/// A node type that carries its own [`Links`].
///
/// # Safety
///
/// `links` and `links_mut` must always return the same field of `self`, and
/// nothing but [`LruList`] may write to it while the node is linked.
pub unsafe trait Linked: Sized {
    /// The node's link fields.
    fn links(&self) -> &Links<Self>;
    /// The node's link fields, mutably.
    fn links_mut(&mut self) -> &mut Links<Self>;
}

/// A fixed-capacity, intrusive, doubly linked LRU list.
///
/// The head is the most recently used node and the tail the least recently
/// used. Not synchronized: all mutation goes through `&mut self`.
pub struct LruList<T> {
    cap: NonZeroUsize,
    len: usize,
    head: *mut T,
    tail: *mut T,
    _nodes: PhantomData<T>,
}

impl<T: Linked> LruList<T> {
    /// Creates an empty list that holds at most `cap` nodes.
    pub fn new(cap: NonZeroUsize) -> Self {
        LruList {
            cap,
            len: 0,
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            _nodes: PhantomData,
        }
    }

    /// Returns the maximum number of nodes the list holds.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no node is linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` when the next `add` evicts.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= self.cap.get()
    }

    /// Most recently used node.
    #[inline]
    pub fn head(&self) -> Option<NonNull<T>> {
        NonNull::new(self.head)
    }

    /// Least recently used node.
    #[inline]
    pub fn tail(&self) -> Option<NonNull<T>> {
        NonNull::new(self.tail)
    }

    /// Links `node` at the head, evicting the tail if the list overflows.
    ///
    /// Returns the evicted node, already unlinked. The evicted node is never
    /// `node` itself, since a capacity is at least one.
    ///
    /// # Safety
    ///
    /// `node` must be valid, not linked into any list, and must stay valid and
    /// pinned in memory until it is unlinked again.
    pub unsafe fn add(&mut self, node: NonNull<T>) -> Option<NonNull<T>> {
        // SAFETY: forwarded from the caller.
        unsafe { self.attach_head(node.as_ptr()) };
        self.len += 1;

        if self.len > self.cap.get() {
            self.pop_tail()
        } else {
            None
        }
    }

    /// Unlinks `node` from the list.
    ///
    /// # Panics
    ///
    /// Panics if `node` is detectably not linked into this list.
    ///
    /// # Safety
    ///
    /// `node` must be valid and must have been added to this list.
    pub unsafe fn remove(&mut self, node: NonNull<T>) {
        let node = node.as_ptr();
        // SAFETY: forwarded from the caller.
        unsafe {
            assert!(self.links_into_self(node), "unlinking a node not in this list");
            self.detach(node);
        }
        self.len -= 1;
    }

    /// Marks `node` as most recently used. No-op if it already is.
    ///
    /// # Safety
    ///
    /// Same contract as [`LruList::remove`].
    pub unsafe fn move_to_head(&mut self, node: NonNull<T>) {
        let node = node.as_ptr();
        if self.head == node {
            return;
        }
        // SAFETY: forwarded from the caller.
        unsafe {
            assert!(self.links_into_self(node), "moving a node not in this list");
            self.detach(node);
            self.attach_head(node);
        }
    }

    /// Unlinks and returns the least recently used node.
    pub fn pop_tail(&mut self) -> Option<NonNull<T>> {
        let tail = NonNull::new(self.tail)?;
        // SAFETY: linked nodes stay valid until unlinked (contract of `add`).
        unsafe { self.detach(tail.as_ptr()) };
        self.len -= 1;
        Some(tail)
    }

    /// Iterates from the most to the least recently used node.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            _list: PhantomData,
        }
    }

    /// Whether `node`'s links are consistent with membership in this list.
    unsafe fn links_into_self(&self, node: *mut T) -> bool {
        // SAFETY: the caller guarantees `node` is valid.
        let links = unsafe { (*node).links() };
        (!links.prev.is_null() || self.head == node) && (!links.next.is_null() || self.tail == node)
    }

    unsafe fn attach_head(&mut self, node: *mut T) {
        // SAFETY: the caller guarantees `node` is valid and unlinked, and every
        // linked node is valid.
        unsafe {
            let links = (*node).links_mut();
            links.prev = ptr::null_mut();
            links.next = self.head;

            if self.head.is_null() {
                self.tail = node;
            } else {
                (*self.head).links_mut().prev = node;
            }
        }
        self.head = node;
    }

    unsafe fn detach(&mut self, node: *mut T) {
        // SAFETY: the caller guarantees `node` is linked here, so its
        // neighbours are linked nodes as well.
        unsafe {
            let links = (*node).links_mut();
            let (prev, next) = (links.prev, links.next);
            links.reset();

            if prev.is_null() {
                self.head = next;
            } else {
                (*prev).links_mut().next = next;
            }
            if next.is_null() {
                self.tail = prev;
            } else {
                (*next).links_mut().prev = prev;
            }
        }
    }
}

impl<T> fmt::Debug for LruList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruList")
            .field("capacity", &self.cap)
            .field("length", &self.len)
            .finish()
    }
}

/// Iterator over the nodes of an [`LruList`], most recent first.
pub struct Iter<'a, T> {
    next: *mut T,
    remaining: usize,
    _list: PhantomData<&'a LruList<T>>,
}

impl<'a, T: Linked> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.next.is_null() {
            return None;
        }
        // SAFETY: linked nodes stay valid while the list is borrowed.
        let node = unsafe { &*self.next };
        self.next = node.links().next;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Linked> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct Node {
        id: u32,
        links: Links<Node>,
    }

    unsafe impl Linked for Node {
        fn links(&self) -> &Links<Self> {
            &self.links
        }
        fn links_mut(&mut self) -> &mut Links<Self> {
            &mut self.links
        }
    }

    /// Heap-allocated nodes that outlive the list under test.
    struct Arena {
        nodes: Vec<*mut Node>,
    }

    impl Arena {
        fn new(n: u32) -> Self {
            let nodes = (0..n)
                .map(|id| {
                    alloc::boxed::Box::into_raw(alloc::boxed::Box::new(Node {
                        id,
                        links: Links::new(),
                    }))
                })
                .collect();
            Arena { nodes }
        }

        fn get(&self, i: usize) -> NonNull<Node> {
            NonNull::new(self.nodes[i]).unwrap()
        }
    }

    impl Drop for Arena {
        fn drop(&mut self) {
            for &node in &self.nodes {
                drop(unsafe { alloc::boxed::Box::from_raw(node) });
            }
        }
    }

    fn ids(list: &LruList<Node>) -> Vec<u32> {
        list.iter().map(|node| node.id).collect()
    }

    fn id_of(node: NonNull<Node>) -> u32 {
        unsafe { node.as_ref().id }
    }

    fn make_list(cap: usize) -> LruList<Node> {
        LruList::new(NonZeroUsize::new(cap).unwrap())
    }

    #[test]
    fn test_add_keeps_recency_order() {
        let arena = Arena::new(3);
        let mut list = make_list(3);
        for i in 0..3 {
            assert!(unsafe { list.add(arena.get(i)) }.is_none());
        }
        assert_eq!(ids(&list), [2, 1, 0]);
        assert_eq!(list.len(), 3);
        assert!(list.is_full());
        assert_eq!(list.head().map(id_of), Some(2));
        assert_eq!(list.tail().map(id_of), Some(0));
        list.pop_tail();
        list.pop_tail();
        list.pop_tail();
    }

    #[test]
    fn test_overflow_evicts_exactly_the_tail() {
        let arena = Arena::new(4);
        let mut list = make_list(3);
        let evicted: Vec<u32> = (0..4)
            .filter_map(|i| unsafe { list.add(arena.get(i)) })
            .map(id_of)
            .collect();
        assert_eq!(evicted, [0]);
        assert_eq!(ids(&list), [3, 2, 1]);
        assert_eq!(list.len(), list.cap().get());

        let evicted = arena.get(0);
        let links = unsafe { evicted.as_ref() }.links();
        assert!(links.prev.is_null() && links.next.is_null());
        while list.pop_tail().is_some() {}
    }

    #[test]
    fn test_move_to_head_survives_overflow() {
        let arena = Arena::new(4);
        let mut list = make_list(3);
        for i in 0..3 {
            unsafe { list.add(arena.get(i)) };
        }
        unsafe { list.move_to_head(arena.get(0)) };
        assert_eq!(ids(&list), [0, 2, 1]);

        let evicted = unsafe { list.add(arena.get(3)) }.map(id_of);
        assert_eq!(evicted, Some(1));
        assert_eq!(ids(&list), [3, 0, 2]);
        while list.pop_tail().is_some() {}
    }

    #[test]
    fn test_move_to_head_of_head_is_noop() {
        let arena = Arena::new(2);
        let mut list = make_list(2);
        unsafe {
            list.add(arena.get(0));
            list.add(arena.get(1));
            list.move_to_head(arena.get(1));
        }
        assert_eq!(ids(&list), [1, 0]);
        while list.pop_tail().is_some() {}
    }

    #[test]
    fn test_remove_all_positions() {
        let arena = Arena::new(4);
        let mut list = make_list(4);
        for i in 0..4 {
            unsafe { list.add(arena.get(i)) };
        }
        // middle, head, tail, sole
        unsafe { list.remove(arena.get(2)) };
        assert_eq!(ids(&list), [3, 1, 0]);
        unsafe { list.remove(arena.get(3)) };
        assert_eq!(ids(&list), [1, 0]);
        unsafe { list.remove(arena.get(0)) };
        assert_eq!(ids(&list), [1]);
        unsafe { list.remove(arena.get(1)) };
        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
    }

    #[test]
    #[should_panic(expected = "not in this list")]
    fn test_remove_unlinked_node_panics() {
        let arena = Arena::new(2);
        let mut list = make_list(2);
        unsafe {
            list.add(arena.get(0));
            list.remove(arena.get(1));
        }
    }

    #[test]
    fn test_node_moves_between_lists() {
        let arena = Arena::new(2);
        let mut young = make_list(1);
        let mut old = make_list(1);
        unsafe {
            young.add(arena.get(0));
            young.remove(arena.get(0));
            old.add(arena.get(0));
            let bumped = young.add(arena.get(1));
            assert!(bumped.is_none());
        }
        assert_eq!(ids(&young), [1]);
        assert_eq!(ids(&old), [0]);
        assert_eq!(young.iter().len(), 1);
        young.pop_tail();
        old.pop_tail();
    }

    #[test]
    fn test_pop_tail_empty() {
        let mut list = make_list(1);
        assert!(list.pop_tail().is_none());
        assert!(!list.is_full());
    }
}
