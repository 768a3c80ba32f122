extern crate alloc;

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::fmt;
use core::hint;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicPtr, Ordering};

/// A node that can be linked into a [`CasStack`].
///
/// Pool payloads cannot be required to carry link fields, so each payload is
/// parked inside one of these wrappers. Nodes are allocated once by the pool
/// that owns them and outlive every stack they are pushed onto; only the
/// payload slot changes over their lifetime.
pub(crate) struct PoolNode<T> {
    /// Next node in whichever stack currently owns this node.
    tail: AtomicPtr<PoolNode<T>>,
    /// Parked payload. Only touched by the thread that popped the node.
    payload: UnsafeCell<Option<T>>,
}

impl<T> PoolNode<T> {
    /// Creates an unlinked node with an empty payload slot.
    pub(crate) fn vacant() -> Self {
        PoolNode {
            tail: AtomicPtr::new(ptr::null_mut()),
            payload: UnsafeCell::new(None),
        }
    }

    /// Takes the payload out of the node, leaving the slot empty.
    ///
    /// # Safety
    ///
    /// The caller must own the node exclusively, i.e. it was returned by
    /// [`CasStack::pop`] and has not been pushed again since.
    pub(crate) unsafe fn take(&self) -> Option<T> {
        // SAFETY: exclusive ownership is guaranteed by the caller.
        unsafe { (*self.payload.get()).take() }
    }

    /// Stores a payload in the node, returning whatever was there before.
    ///
    /// # Safety
    ///
    /// Same contract as [`PoolNode::take`].
    pub(crate) unsafe fn store(&self, value: T) -> Option<T> {
        // SAFETY: exclusive ownership is guaranteed by the caller.
        unsafe { (*self.payload.get()).replace(value) }
    }
}

impl<T> fmt::Debug for PoolNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolNode")
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

/// Intrusive lock-free LIFO stack of [`PoolNode`]s.
///
/// The head pointer doubles as a tiny lock: `pop` swaps the current head for
/// the address of a stack-owned sentinel node, reads the claimed node's `tail`
/// while nobody else can touch the stack, then swaps the sentinel out for the
/// new head. Because the successor is read only after the claim succeeds, the
/// classic ABA problem of Treiber stacks cannot corrupt the list.
///
/// A `pop` that observes the sentinel returns `None` instead of waiting, so
/// callers must read `None` as "nothing available right now". A `push` that
/// observes the sentinel spins; the holder only performs a constant amount of
/// work before releasing it.
pub(crate) struct CasStack<T> {
    head: AtomicPtr<PoolNode<T>>,
    /// Its address marks the stack as claimed. Never linked, never popped.
    sentinel: NonNull<PoolNode<T>>,
}

// SAFETY: the stack only hands out node pointers; payloads move between
// threads through those nodes, which requires `T: Send`.
unsafe impl<T: Send> Send for CasStack<T> {}

// SAFETY: all shared-state mutation goes through atomic operations on `head`,
// and a node's link field is only written by the thread that owns the node.
unsafe impl<T: Send> Sync for CasStack<T> {}

impl<T> CasStack<T> {
    /// Creates an empty stack.
    pub(crate) fn new() -> Self {
        let sentinel = NonNull::from(Box::leak(Box::new(PoolNode::vacant())));
        CasStack {
            head: AtomicPtr::new(ptr::null_mut()),
            sentinel,
        }
    }

    #[inline]
    fn claimed(&self) -> *mut PoolNode<T> {
        self.sentinel.as_ptr()
    }

    /// Pushes `node` onto the stack.
    ///
    /// # Safety
    ///
    /// `node` must point to a live `PoolNode` that outlives this stack, must be
    /// owned exclusively by the caller and must not be linked into any stack.
    pub(crate) unsafe fn push(&self, node: NonNull<PoolNode<T>>) {
        let claimed = self.claimed();
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            if head == claimed {
                hint::spin_loop();
                head = self.head.load(Ordering::Acquire);
                continue;
            }
            // SAFETY: the caller owns `node`; nobody else reads its tail until
            // the CAS below publishes it.
            unsafe { node.as_ref() }.tail.store(head, Ordering::Relaxed);
            match self.head.compare_exchange_weak(
                head,
                node.as_ptr(),
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => head = actual,
            }
        }
    }

    /// Pops the most recently pushed node.
    ///
    /// Returns `None` when the stack is empty or momentarily claimed by another
    /// thread.
    pub(crate) fn pop(&self) -> Option<NonNull<PoolNode<T>>> {
        let claimed = self.claimed();
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            if head == claimed {
                return None;
            }
            let node = NonNull::new(head)?;
            match self.head.compare_exchange_weak(
                head,
                claimed,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    // SAFETY: every node pushed here outlives the stack, and the
                    // sentinel gives us exclusive access to the link fields.
                    let next = unsafe { node.as_ref() }
                        .tail
                        .swap(ptr::null_mut(), Ordering::Relaxed);
                    let released = self.head.compare_exchange(
                        claimed,
                        next,
                        Ordering::Release,
                        Ordering::Relaxed,
                    );
                    assert!(
                        released.is_ok(),
                        "stack sentinel was replaced while it was held"
                    );
                    return Some(node);
                }
                Err(actual) => head = actual,
            }
        }
    }

    /// Returns `true` if the stack holds no nodes at this instant.
    ///
    /// A claimed stack reports `false`.
    pub(crate) fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire).is_null()
    }
}

impl<T> Drop for CasStack<T> {
    fn drop(&mut self) {
        // SAFETY: the sentinel was leaked from a Box in `new` and is never
        // handed out, so this is the only owner.
        unsafe {
            drop(Box::from_raw(self.sentinel.as_ptr()));
        }
    }
}

impl<T> fmt::Debug for CasStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasStack")
            .field("empty", &self.is_empty())
            .field(
                "claimed",
                &(self.head.load(Ordering::Relaxed) == self.claimed()),
            )
            .finish()
    }
}
