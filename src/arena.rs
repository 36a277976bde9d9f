//! Slot arena with an intrusive hashed index.
//!
//! Nodes live in a fixed-capacity slab of slots; the canonical-lookup index
//! is threaded through the slots themselves as bucket chains (`next` links),
//! so a lookup walks one chain and an insertion appends to it. Only positive
//! orientations are indexed; negation partners occupy slots without
//! participating in any chain.
//!
//! Slot 0 is a sentry: it is never allocated, so 0 can serve as the "no next
//! node" marker in the chains.

use std::cmp::min;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use crate::content::{FormulaContent, FormulaKind};

struct Entry<A> {
    value: Option<FormulaContent<A>>,
    next: usize,
}

impl<A> Entry<A> {
    fn empty() -> Self {
        Self { value: None, next: 0 }
    }
}

pub struct Arena<A> {
    data: Vec<Entry<A>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Index of the first *possibly* free (vacant) slot.
    min_free: usize,
    /// Index of the last slot ever allocated.
    last_index: usize,
    /// Number of occupied slots.
    real_size: usize,
    /// Number of slots linked into the bucket chains.
    index_size: usize,
}

impl<A: Hash + Eq> Arena<A> {
    /// Create a new arena with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Arena bits should be in the range 0..=31");

        let capacity = 1 << bits;
        let mut data: Vec<Entry<A>> = Vec::with_capacity(capacity);
        data.resize_with(capacity, Entry::empty);

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;
        let buckets = vec![0; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data,
            buckets,
            bitmask,
            min_free: 1,
            last_index: 0,
            real_size: 0,
            index_size: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
    /// Number of occupied slots.
    pub fn real_size(&self) -> usize {
        self.real_size
    }
    /// Number of indexed (positive-orientation) slots.
    pub fn index_size(&self) -> usize {
        self.index_size
    }
    /// High-water mark of allocated slots.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].value.is_some()
    }

    pub fn value(&self, index: usize) -> &FormulaContent<A> {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].value.as_ref().expect("Slot is vacant")
    }

    pub fn value_mut(&mut self, index: usize) -> &mut FormulaContent<A> {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].value.as_mut().expect("Slot is vacant")
    }

    fn next(&self, index: usize) -> usize {
        self.data[index].next
    }

    fn set_next(&mut self, index: usize, next: usize) {
        self.data[index].next = next;
    }

    /// Claim a vacant slot and return its index.
    fn alloc(&mut self) -> usize {
        let index = (self.min_free..=self.last_index)
            .find(|&i| !self.is_occupied(i))
            .unwrap_or_else(|| {
                self.last_index += 1;
                self.last_index
            });

        if index >= self.capacity() {
            panic!("Arena is full");
        }

        self.min_free = index + 1;
        self.real_size += 1;

        index
    }

    /// Store a value in a fresh slot without indexing it. Used for negation
    /// partners, which are reachable through their pair's link only.
    pub fn add(&mut self, value: FormulaContent<A>) -> usize {
        let index = self.alloc();

        self.data[index].value = Some(value);
        self.data[index].next = 0;

        index
    }

    fn hash_kind(kind: &FormulaKind<A>) -> u64 {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket_index(&self, kind: &FormulaKind<A>) -> usize {
        (Self::hash_kind(kind) & self.bitmask) as usize
    }

    /// Look up a structurally equal node among the indexed slots.
    pub fn find(&self, kind: &FormulaKind<A>) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(kind)];
        while index != 0 {
            if &self.value(index).kind == kind {
                return Some(index);
            }
            index = self.next(index);
        }
        None
    }

    /// Store a value in a fresh slot and append it to its bucket chain.
    ///
    /// The caller is responsible for having checked [`find`][Arena::find]
    /// first; equal kinds must never be indexed twice.
    pub fn insert(&mut self, value: FormulaContent<A>) -> usize {
        let bucket_index = self.bucket_index(&value.kind);
        let index = self.add(value);
        self.index_size += 1;

        let mut chain = self.buckets[bucket_index];
        if chain == 0 {
            self.buckets[bucket_index] = index;
            return index;
        }
        loop {
            let next = self.next(chain);
            if next == 0 {
                self.set_next(chain, index);
                return index;
            }
            chain = next;
        }
    }

    /// Unlink an indexed slot from its bucket chain and vacate it.
    pub fn remove(&mut self, index: usize) -> FormulaContent<A> {
        let bucket_index = self.bucket_index(&self.value(index).kind);

        let mut chain = self.buckets[bucket_index];
        if chain == index {
            self.buckets[bucket_index] = self.next(index);
        } else {
            loop {
                assert_ne!(chain, 0, "Slot is not indexed");
                let next = self.next(chain);
                if next == index {
                    self.set_next(chain, self.next(index));
                    break;
                }
                chain = next;
            }
        }
        self.index_size -= 1;

        self.vacate(index)
    }

    /// Vacate a non-indexed slot.
    pub fn take(&mut self, index: usize) -> FormulaContent<A> {
        self.vacate(index)
    }

    fn vacate(&mut self, index: usize) -> FormulaContent<A> {
        assert_ne!(index, 0, "Index is 0");

        let value = self.data[index].value.take().expect("Slot is vacant");
        self.data[index].next = 0;
        self.min_free = min(self.min_free, index);
        self.real_size -= 1;
        value
    }

    /// All indexed slots, in bucket order.
    pub fn indexed_slots(&self) -> Vec<usize> {
        let mut slots = Vec::with_capacity(self.index_size);
        for &head in &self.buckets {
            let mut index = head;
            while index != 0 {
                slots.push(index);
                index = self.next(index);
            }
        }
        slots
    }
}

impl<A: Hash + Eq> Index<usize> for Arena<A> {
    type Output = FormulaContent<A>;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

impl<A: Hash + Eq> IndexMut<usize> for Arena<A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.value_mut(index)
    }
}
