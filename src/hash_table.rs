use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Number of slots allocated by a freshly constructed table.
pub const DEFAULT_CAPACITY: usize = 64;

/// Growth trigger, in percent. An insertion that would push the load factor
/// above this value rebuilds the table first.
pub const MAX_LOAD_PERCENT: usize = 80;

/// Rebuild target, in percent. A rebuild grows the slot array until the
/// current population sits strictly below this load factor.
pub const REBUILD_LOAD_PERCENT: usize = 50;

/// Multiplier applied to the slot count on each growth step.
pub const GROWTH_FACTOR: usize = 4;

#[inline(always)]
fn fits(len: usize, slots: usize) -> bool {
    len.saturating_mul(100) <= slots.saturating_mul(MAX_LOAD_PERCENT)
}

#[inline]
fn slots_for(len: usize) -> usize {
    len.saturating_mul(100)
        .div_ceil(MAX_LOAD_PERCENT)
        .max(DEFAULT_CAPACITY)
}

fn vacant_slots<V>(count: usize) -> Vec<Option<Slot<V>>> {
    core::iter::repeat_with(|| None).take(count).collect()
}

/// An occupied slot.
///
/// `psl` is 1 when the value sits in its home slot and grows by one for every
/// step the value was pushed past it.
#[derive(Clone)]
struct Slot<V> {
    hash: u64,
    psl: usize,
    value: V,
}

/// Probe-sequence-length statistics for debugging and tuning.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub len: usize,
    /// Total number of slots allocated
    pub slots: usize,
    /// Load factor (len / slots)
    pub load_factor: f64,
    /// Longest probe sequence of any element, 0 when empty
    pub max_psl: usize,
    /// Average probe sequence length, 0 when empty
    pub mean_psl: f64,
    /// Bytes held by the slot array and position index
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Robin Hood Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.len,
            self.slots,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_psl, self.mean_psl
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Counts of elements per probe sequence length.
///
/// `counts()[n]` is the number of elements with a PSL of `n + 1`, i.e. the
/// elements displaced `n` slots from their home slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Per-displacement element counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of elements covered by the histogram.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if let Some(&ch) = (units % 8).checked_sub(1).and_then(|i| partial.get(i)) {
                bar.push(ch);
            }
            bar
        };

        for (displacement, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", displacement, make_bar(count), count);
        }
    }
}

/// A hash table using open addressing with Robin Hood displacement.
///
/// `HashTable<V>` stores values of type `V` in a single flat slot array.
/// Like the raw tables of other hashing crates, it requires you to provide
/// both the hash value and an equality predicate for each operation; see
/// [`HashMap`](crate::HashMap) for a keyed interface.
///
/// Collisions are resolved by linear probing. On insertion, an element that
/// has travelled further from its home slot takes the slot of any resident
/// that has travelled less, and the walk continues with the evicted resident.
/// This keeps probe lengths close to each other across the table.
///
/// Alongside the slot array, the table keeps a dense position index of the
/// occupied slots. Iteration walks that index, so it visits exactly
/// [`len`](HashTable::len) slots regardless of capacity, in insertion order
/// except where removals have reshuffled it.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_map::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     robin_map::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     robin_map::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Option<Slot<V>>>,

    // Occupied slot indices in iteration order, and the inverse mapping from
    // slot index to its position in `order`. `positions[i]` is meaningless for
    // vacant `i`.
    order: Vec<usize>,
    positions: Vec<usize>,

    populated: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field(
                "psl",
                &self
                    .slots
                    .chunks(16)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .map(|slot| match slot {
                                Some(slot) => format!("{:02}", slot.psl),
                                None => "..".to_string(),
                            })
                            .collect::<Vec<String>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .field("order", &self.order)
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with [`DEFAULT_CAPACITY`] slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert_eq!(table.capacity(), robin_map::DEFAULT_CAPACITY);
    /// ```
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_CAPACITY)
    }

    /// Creates a new hash table able to hold at least `capacity` elements
    /// without rebuilding.
    ///
    /// The slot count is never below [`DEFAULT_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// // Create a table that can hold at least 100 items without resizing
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_slots(slots_for(capacity))
    }

    fn with_slots(slots: usize) -> Self {
        debug_assert!(slots > 0);
        Self {
            slots: vacant_slots(slots),
            order: Vec::with_capacity(slots * MAX_LOAD_PERCENT / 100 + 1),
            positions: alloc::vec![0; slots],
            populated: 0,
        }
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded in position-index order: insertion order, except
    /// that removing an element moves the most recently positioned element
    /// into its place, and elements relocated while repairing the cluster
    /// behind a removed element move to the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_map::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table
    ///     .entry(hash_str("key1"), |s: &String| s == "key1")
    ///     .or_insert("key1".to_string());
    /// table
    ///     .entry(hash_str("key2"), |s: &String| s == "key2")
    ///     .or_insert("key2".to_string());
    ///
    /// let values: Vec<&String> = table.iter().collect();
    /// assert_eq!(values, ["key1", "key2"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: &self.slots,
            order: self.order.iter(),
        }
    }

    /// Returns an iterator yielding mutable references to all values, in the
    /// same order as [`iter`](HashTable::iter).
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: NonNull::from(self.slots.as_mut_slice()).cast(),
            order: self.order.iter(),
            _phantom: PhantomData,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// After calling `drain()`, the table will be empty. The slot array keeps
    /// its size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_map::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table
    ///     .entry(hash_str("key1"), |s: &String| s == "key1")
    ///     .or_insert("key1".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values.len(), 1);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let slot_count = self.slots.len();
        let slots = core::mem::replace(&mut self.slots, vacant_slots(slot_count));
        let order = core::mem::take(&mut self.order);
        self.populated = 0;
        Drain {
            slots,
            order: order.into_iter(),
            _phantom: PhantomData,
        }
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns the number of slots in the table.
    ///
    /// The table rebuilds before any insertion that would occupy more than
    /// [`MAX_LOAD_PERCENT`] percent of this figure, so at least a fifth of
    /// the slots are always free.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let table: HashTable<i32> = HashTable::with_capacity(100);
    /// println!("Table has {} slots", table.capacity());
    /// assert!(table.capacity() >= 125);
    /// ```
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Removes all elements from the table.
    ///
    /// This operation preserves the table's slot count. All values are
    /// dropped.
    pub fn clear(&mut self) {
        for index in self.order.drain(..) {
            self.slots[index] = None;
        }
        self.populated = 0;
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// Grows the slot array by [`GROWTH_FACTOR`] steps until the table can
    /// take `additional` more insertions without rebuilding, then rebuilds
    /// once. Does nothing if the table already has room.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::new();
    /// table.reserve(500);
    /// assert_eq!(table.capacity(), 1024);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let required = self.populated.saturating_add(additional);
        if fits(required, self.slots.len()) {
            return;
        }

        let mut slots = self.slots.len();
        while !fits(required, slots) {
            slots = slots.saturating_mul(GROWTH_FACTOR);
        }
        self.rebuild_to(slots);
    }

    /// Returns a reference to the value matching `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |&n: &u32| n == 70).or_insert(70);
    ///
    /// assert_eq!(table.find(7, |&n| n == 70), Some(&70));
    /// assert_eq!(table.find(8, |&n| n == 80), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.locate(hash, eq);
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    /// Returns an iterator positioned at the value matching `eq`, if any.
    ///
    /// The iterator yields the matching value first, then every value that
    /// follows it in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in [10u32, 20, 30] {
    ///     table.entry(u64::from(n), |&v: &u32| v == n).or_insert(n);
    /// }
    ///
    /// let rest: Vec<&u32> = table.find_iter(20, |&n| n == 20).unwrap().collect();
    /// assert_eq!(rest, [&20, &30]);
    /// assert!(table.find_iter(40, |&n| n == 40).is_none());
    /// ```
    pub fn find_iter(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Iter<'_, V>> {
        let index = self.locate(hash, eq);
        self.slots[index].as_ref()?;
        Some(Iter {
            slots: &self.slots,
            order: self.order[self.positions[index]..].iter(),
        })
    }

    /// Returns a mutable reference to the value matching `eq`, if any.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.locate(hash, eq);
        self.slots[index].as_mut().map(|slot| &mut slot.value)
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_map::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     robin_map::hash_table::Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     robin_map::hash_table::Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let index = self.locate(hash, eq);
        if self.slots[index].is_some() {
            Entry::Occupied(OccupiedEntry { table: self, index })
        } else {
            Entry::Vacant(VacantEntry { table: self, hash })
        }
    }

    /// Inserts a value that is known not to be in the table.
    ///
    /// No lookup is performed: inserting a value equal to one already present
    /// leaves two copies in the table. Use [`entry`](HashTable::entry) when
    /// the value may already be present.
    pub fn insert_unique(&mut self, hash: u64, value: V) -> &mut V {
        let index = self.insert_slot(hash, value);
        &mut self.slot_mut(index).value
    }

    /// Removes and returns the value matching `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        if self.populated == 0 {
            return None;
        }

        let index = self.locate(hash, eq);
        self.erase_at(index)
    }

    /// Keeps only the values for which `keep` returns `true`.
    ///
    /// The survivors are reinserted in their current iteration order.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut V) -> bool) {
        let pending = self.evacuate_all();
        for mut slot in pending {
            if keep(&mut slot.value) {
                self.displace(slot.hash, slot.value);
            }
        }
    }

    #[inline(always)]
    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline(always)]
    fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() { 0 } else { next }
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot<V> {
        match &mut self.slots[index] {
            Some(slot) => slot,
            None => unreachable!("slot {index} is vacant"),
        }
    }

    /// Walks the probe sequence for `hash` and returns the index of the slot
    /// holding the matching value, or of the first free slot.
    ///
    /// Termination relies on the load bound: the table is never full.
    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> usize {
        let mut index = self.home(hash);
        while let Some(slot) = &self.slots[index] {
            if slot.hash == hash && eq(&slot.value) {
                break;
            }
            index = self.next(index);
        }
        index
    }

    /// Runs the load check, then the displacement walk.
    fn insert_slot(&mut self, hash: u64, value: V) -> usize {
        if !fits(self.populated + 1, self.slots.len()) {
            self.rebuild();
        }

        self.displace(hash, value)
    }

    /// Robin Hood displacement walk for a value not yet in the table.
    ///
    /// Returns the slot the new value settled in: the first slot where it
    /// displaced a resident, or the free slot that ended the walk. Later
    /// swaps in the same walk only move residents further along.
    fn displace(&mut self, hash: u64, value: V) -> usize {
        let mut carried = Slot {
            hash,
            psl: 1,
            value,
        };
        // Position of the carried element in `order`; `None` until the new
        // value has been registered.
        let mut position = None;
        let mut landed = None;
        let mut index = self.home(hash);

        loop {
            let Some(resident) = self.slots[index].as_mut() else {
                self.slots[index] = Some(carried);
                self.settle(index, position);
                return landed.unwrap_or(index);
            };

            if resident.psl < carried.psl {
                core::mem::swap(resident, &mut carried);
                let evicted = self.positions[index];
                self.settle(index, position);
                position = Some(evicted);
                landed.get_or_insert(index);
            }

            carried.psl += 1;
            index = self.next(index);
        }
    }

    /// Points the position index at `index` for the element now stored there.
    fn settle(&mut self, index: usize, position: Option<usize>) {
        match position {
            Some(position) => {
                self.order[position] = index;
                self.positions[index] = position;
            }
            None => {
                self.positions[index] = self.order.len();
                self.order.push(index);
                self.populated += 1;
            }
        }
    }

    /// Vacates `index` and unregisters it from the position index.
    ///
    /// Returns `None` if the slot was already free.
    fn evict(&mut self, index: usize) -> Option<Slot<V>> {
        let slot = self.slots[index].take()?;

        let position = self.positions[index];
        self.order.swap_remove(position);
        if let Some(&moved) = self.order.get(position) {
            self.positions[moved] = position;
        }
        self.populated -= 1;

        Some(slot)
    }

    /// Removes the element at `index`, then evacuates and replays the run of
    /// occupied slots that follows it so every survivor is reachable again.
    fn erase_at(&mut self, index: usize) -> Option<V> {
        let removed = self.evict(index)?;

        let mut pending = VecDeque::new();
        let mut cursor = self.next(index);
        while let Some(slot) = self.evict(cursor) {
            pending.push_back(slot);
            cursor = self.next(cursor);
        }

        trace_event!(trace, slot = index, evacuated = pending.len(), "repairing cluster");

        while let Some(slot) = pending.pop_front() {
            self.displace(slot.hash, slot.value);
        }

        Some(removed.value)
    }

    /// Takes every element out in position-index order, leaving the table
    /// empty with its slot count unchanged.
    fn evacuate_all(&mut self) -> VecDeque<Slot<V>> {
        let order = core::mem::take(&mut self.order);
        self.populated = 0;
        let pending = order
            .iter()
            .filter_map(|&index| self.slots[index].take())
            .collect();
        self.order = order;
        self.order.clear();
        pending
    }

    #[cold]
    fn rebuild(&mut self) {
        let mut slots = self.slots.len();
        loop {
            slots = slots.saturating_mul(GROWTH_FACTOR);
            if self.populated.saturating_mul(100) < slots.saturating_mul(REBUILD_LOAD_PERCENT) {
                break;
            }
        }

        self.rebuild_to(slots);
    }

    /// Reallocates at `slots` slots and replays every element, oldest
    /// position first.
    fn rebuild_to(&mut self, slots: usize) {
        trace_event!(
            debug,
            from_slots = self.slots.len(),
            to_slots = slots,
            len = self.populated,
            "rebuilding table"
        );

        let mut pending = self.evacuate_all();
        self.slots = vacant_slots(slots);
        self.positions = alloc::vec![0; slots];
        self.order.reserve(slots * MAX_LOAD_PERCENT / 100 + 1);

        while let Some(slot) = pending.pop_front() {
            self.displace(slot.hash, slot.value);
        }
    }

    /// Returns the probe sequence length of the value matching `eq`.
    ///
    /// A value in its home slot has a PSL of 1.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_length(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let index = self.locate(hash, eq);
        self.slots[index].as_ref().map(|slot| slot.psl)
    }

    /// Computes a histogram of probe sequence lengths for the current table
    /// state.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = Vec::new();
        for slot in self.slots.iter().flatten() {
            if counts.len() < slot.psl {
                counts.resize(slot.psl, 0);
            }
            counts[slot.psl - 1] += 1;
        }
        ProbeHistogram { counts }
    }

    /// Returns probe length and utilization statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let mut max_psl = 0;
        let mut total_psl = 0;
        for slot in self.slots.iter().flatten() {
            max_psl = max_psl.max(slot.psl);
            total_psl += slot.psl;
        }

        DebugStats {
            len: self.populated,
            slots: self.slots.len(),
            load_factor: self.populated as f64 / self.slots.len() as f64,
            max_psl,
            mean_psl: if self.populated == 0 {
                0.0
            } else {
                total_psl as f64 / self.populated as f64
            },
            total_bytes: self.slots.len() * core::mem::size_of::<Option<Slot<V>>>()
                + (self.order.capacity() + self.positions.len()) * core::mem::size_of::<usize>(),
        }
    }

    /// Panics if the slot array, position index, or probe lengths disagree.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(self.populated, occupied, "{self:#?}");
        assert_eq!(self.populated, self.order.len(), "{self:#?}");
        assert!(fits(self.populated, self.slots.len()), "{self:#?}");

        for (position, &index) in self.order.iter().enumerate() {
            assert!(self.slots[index].is_some(), "{self:#?}");
            assert_eq!(self.positions[index], position, "{self:#?}");
        }

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            let home = self.home(slot.hash);
            let distance = (index + self.slots.len() - home) % self.slots.len();
            assert_eq!(slot.psl, distance + 1, "slot {index}: {self:#?}");

            let mut cursor = home;
            while cursor != index {
                assert!(
                    self.slots[cursor].is_some(),
                    "slot {index} unreachable from {home}: {self:#?}"
                );
                cursor = self.next(cursor);
            }
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - the key is not present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - the key is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the entry's value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// let value = table.entry(1, |&n: &i32| n == 10).or_insert(10);
    /// assert_eq!(*value, 10);
    ///
    /// let value = table.entry(1, |&n: &i32| n == 10).or_insert(20);
    /// assert_eq!(*value, 10);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from `default` if the entry is vacant and
    /// returns a mutable reference to the entry's value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies an occupied entry in place. Returns `None` for a vacant
    /// entry.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the entry's value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
///
/// Created by [`HashTable::entry`] when no value matched.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value into the vacant entry and returns a mutable reference to
    /// it.
    ///
    /// The table is rebuilt first if the insertion would push it past
    /// [`MAX_LOAD_PERCENT`].
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.insert_unique(self.hash, value)
    }
}

/// A view into an occupied entry in a [`HashTable`].
///
/// Created by [`HashTable::entry`] when a value matched.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Some(slot) => &slot.value,
            None => unreachable!("slot {} is vacant", self.index),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.slot_mut(self.index).value
    }

    /// Converts the entry into a mutable reference to the value, bound to the
    /// table's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.slot_mut(self.index).value
    }

    /// Removes the value from the table and returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::hash_table::Entry;
    /// # use robin_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(5, |&n: &u8| n == 5).or_insert(5);
    ///
    /// let removed = match table.entry(5, |&n: &u8| n == 5) {
    ///     Entry::Occupied(entry) => entry.remove(),
    ///     Entry::Vacant(_) => unreachable!(),
    /// };
    /// assert_eq!(removed, 5);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(self) -> V {
        match self.table.erase_at(self.index) {
            Some(value) => value,
            None => unreachable!("slot {} is vacant", self.index),
        }
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: &'a [Option<Slot<V>>],
    order: core::slice::Iter<'a, usize>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            order: self.order.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let &index = self.order.next()?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter_mut`] method on [`HashTable`].
///
/// [`iter_mut`]: HashTable::iter_mut
pub struct IterMut<'a, V> {
    slots: NonNull<Option<Slot<V>>>,
    order: core::slice::Iter<'a, usize>,
    _phantom: PhantomData<&'a mut V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let &index = self.order.next()?;
        // SAFETY: `slots` points at the table's slot array, which is mutably
        // borrowed for `'a`. Every entry of `order` is in bounds, and `order`
        // holds each occupied slot index exactly once, so no slot is handed
        // out twice.
        let slot = unsafe { &mut *self.slots.as_ptr().add(index) };
        slot.as_mut().map(|slot| &mut slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
/// It yields owned `V` values in iteration order. The table is empty as
/// soon as the iterator is created.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    // Taken from the table up front, so the table is already empty and
    // consistent even if this iterator is leaked.
    slots: Vec<Option<Slot<V>>>,
    order: alloc::vec::IntoIter<usize>,
    _phantom: PhantomData<&'a mut HashTable<V>>,
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.order.next()?;
        self.slots[index].take().map(|slot| slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

/// An owning iterator over the values of a [`HashTable`], in iteration order.
pub struct IntoIter<V> {
    slots: Vec<Option<Slot<V>>>,
    order: alloc::vec::IntoIter<usize>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.order.next()?;
        self.slots[index].take().map(|slot| slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots,
            order: self.order.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    fn insert_item(table: &mut HashTable<Item>, hash: u64, key: u64, value: i32) {
        match table.entry(hash, |v| v.key == key) {
            Entry::Vacant(v) => {
                v.insert(Item { key, value });
            }
            Entry::Occupied(_) => panic!("unexpected occupied for {key}: {table:#?}"),
        }
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            insert_item(&mut table, hash, k, (k as i32) * 2);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }
        assert_eq!(table.len(), 32);
        table.check_invariants();

        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).map(|v| v.value), Some(k as i32 * 2));
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        let k = 42u64;
        let hash = hash_key(&state, k);

        insert_item(&mut table, hash, k, 7);

        match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(mut occ) => {
                let prev_value = occ.get().value;
                *occ.get_mut() = Item { key: k, value: 11 };
                assert_eq!(prev_value, 7, "{:#?}", table);
            }
            Entry::Vacant(_) => panic!("should be occupied: {}#{:02X} in {:#?}", k, hash, table),
        }
        let found = table.find(hash, |v| v.key == k).unwrap();
        assert_eq!(found.value, 11);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..5u64 {
            insert_item(&mut table, hash_key(&state, k), k, 1);
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            if let Some(v) = table.find_mut(hash, |v| v.key == k) {
                v.value += 9;
            }
        }
        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            let v = table.find(hash, |v| v.key == k).unwrap();
            assert_eq!(v.value, 10);
        }
    }

    #[test]
    fn remove_items() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..8u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }
        assert_eq!(table.len(), 8);
        for k in [0u64, 3, 7] {
            let hash = hash_key(&state, k);
            let removed = table.remove(hash, |v| v.key == k).expect("should remove");
            assert_eq!(removed.key, k);
            table.check_invariants();
        }
        assert_eq!(table.len(), 5);

        let hash = hash_key(&state, 1000);
        assert!(table.remove(hash, |v| v.key == 1000).is_none());
    }

    #[test]
    fn rebuild_grows_by_factor_until_half_full() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        assert_eq!(table.capacity(), 64);

        // 51 elements is 79.7% of 64 slots; the 52nd would exceed 80%.
        for k in 0..51u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }
        assert_eq!(table.capacity(), 64);

        insert_item(&mut table, hash_key(&state, 51), 51, 0);
        assert_eq!(table.capacity(), 256);
        table.check_invariants();

        for k in 52..100u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }
        assert_eq!(table.capacity(), 256);
        assert_eq!(table.len(), 100);
        table.check_invariants();
    }

    #[test]
    fn rebuild_preserves_iteration_order() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..60u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }
        assert_eq!(table.capacity(), 256);

        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn load_bound_holds_after_every_insert() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..5000u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
            assert!(table.len() * 100 <= table.capacity() * MAX_LOAD_PERCENT);
        }
        table.check_invariants();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..100000u64 {
            let hash = hash_key(&state, k);
            insert_item(&mut table, hash, k, k as i32);
        }

        assert_eq!(table.len(), 100000);
        for k in 0..100000u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: k as i32
                })
            );
        }
        table.check_invariants();
    }

    #[test]
    fn explicit_collision() {
        let mut table: HashTable<Item> = HashTable::new();
        let hash = 0;
        for k in 0..40u64 {
            insert_item(&mut table, hash, k, k as i32);
        }

        assert_eq!(table.len(), 40);
        for k in 0..40u64 {
            assert_eq!(table.probe_length(hash, |v| v.key == k), Some(k as usize + 1));
        }
        table.check_invariants();
    }

    #[test]
    fn robin_hood_displaces_shorter_probe() {
        let mut table: HashTable<Item> = HashTable::new();
        // Two elements homed at slot 3 fill slots 3 and 4.
        insert_item(&mut table, 3, 0, 0);
        insert_item(&mut table, 3, 1, 1);
        // An element homed at slot 4 finds it taken and settles at slot 5.
        insert_item(&mut table, 4, 2, 2);
        // A third element homed at slot 3 has travelled further than the
        // slot-4 element by the time it reaches slot 5, and takes it.
        insert_item(&mut table, 3, 3, 3);

        assert_eq!(table.probe_length(3, |v| v.key == 0), Some(1));
        assert_eq!(table.probe_length(3, |v| v.key == 1), Some(2));
        assert_eq!(table.probe_length(3, |v| v.key == 3), Some(3));
        assert_eq!(table.probe_length(4, |v| v.key == 2), Some(3));
        table.check_invariants();

        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, [0, 1, 2, 3]);
    }

    #[test]
    fn erase_repairs_cluster() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..3u64 {
            insert_item(&mut table, 10, k, k as i32);
        }

        assert_eq!(table.remove(10, |v| v.key == 1).map(|v| v.key), Some(1));
        table.check_invariants();

        assert_eq!(table.probe_length(10, |v| v.key == 0), Some(1));
        assert_eq!(table.probe_length(10, |v| v.key == 2), Some(2));
        assert!(table.find(10, |v| v.key == 1).is_none());
    }

    #[test]
    fn erase_repairs_cluster_across_wraparound() {
        let mut table: HashTable<Item> = HashTable::new();
        let last = (table.capacity() - 1) as u64;
        for k in 0..4u64 {
            insert_item(&mut table, last, k, 0);
        }
        insert_item(&mut table, 1, 10, 0);

        assert!(table.remove(last, |v| v.key == 0).is_some());
        table.check_invariants();
        for k in 1..4u64 {
            assert!(table.find(last, |v| v.key == k).is_some());
        }
        assert!(table.find(1, |v| v.key == 10).is_some());
        assert_eq!(table.probe_length(1, |v| v.key == 10), Some(2));
    }

    #[test]
    fn iter_and_drain() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 10..20u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }

        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, (10..20).collect::<Vec<_>>());
        assert_eq!(table.iter().len(), 10);

        for v in table.iter_mut() {
            v.value += 1;
        }

        let mut drained: Vec<Item> = table.drain().collect();
        drained.sort_by_key(|v| v.key);
        assert_eq!(drained.len(), 10);
        assert!(drained.iter().all(|v| v.value == v.key as i32 + 1));
        assert!(table.is_empty());
        table.check_invariants();
    }

    #[test]
    fn partial_drain_empties_table() {
        let mut table: HashTable<String> = HashTable::new();
        for k in 0..10u64 {
            table.insert_unique(k, k.to_string());
        }

        let mut drain = table.drain();
        assert_eq!(drain.next().as_deref(), Some("0"));
        drop(drain);

        assert!(table.is_empty());
        table.check_invariants();
        table.insert_unique(3, "again".to_string());
        assert_eq!(table.find(3, |s| s == "again").map(String::as_str), Some("again"));
    }

    #[test]
    fn find_iter_starts_at_match() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..6u64 {
            insert_item(&mut table, k * 3, k, k as i32);
        }
        table.remove(0, |v| v.key == 0);

        let all: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(all, [5, 1, 2, 3, 4]);

        let rest: Vec<u64> = table.find_iter(6, |v| v.key == 2).unwrap().map(|v| v.key).collect();
        assert_eq!(rest, [2, 3, 4]);
        assert_eq!(table.find_iter(15, |v| v.key == 5).unwrap().len(), 5);
        assert!(table.find_iter(0, |v| v.key == 0).is_none());
    }

    #[test]
    fn forgotten_drain_leaves_table_empty() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..10u64 {
            insert_item(&mut table, k, k, k as i32);
        }
        let capacity = table.capacity();

        core::mem::forget(table.drain());

        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        table.check_invariants();
        assert!(table.find(1, |v| v.key == 1).is_none());

        insert_item(&mut table, 1, 1, 10);
        assert_eq!(table.find(1, |v| v.key == 1).map(|v| v.value), Some(10));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn swap_remove_keeps_position_index_dense() {
        let mut table: HashTable<Item> = HashTable::new();
        // Spread homes so removals never trigger a repair run.
        for k in 0..5u64 {
            insert_item(&mut table, k * 4, k, 0);
        }

        table.remove(0, |v| v.key == 0);
        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, [4, 1, 2, 3]);
        table.check_invariants();
    }

    #[test]
    fn clear_keeps_capacity() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..100u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }
        let capacity = table.capacity();

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.iter().count(), 0);
        table.check_invariants();

        insert_item(&mut table, hash_key(&state, 7), 7, 70);
        assert_eq!(table.find(hash_key(&state, 7), |v| v.key == 7).map(|v| v.value), Some(70));
    }

    #[test]
    fn retain_keeps_order_of_survivors() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..50u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }

        table.retain(|v| v.key % 3 == 0);
        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, (0..50).filter(|k| k % 3 == 0).collect::<Vec<_>>());
        table.check_invariants();
    }

    #[test]
    fn reserve_avoids_rebuilds() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        table.reserve(1000);
        let capacity = table.capacity();
        assert_eq!(capacity, 4096);

        for k in 0..1000u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
        }
        assert_eq!(table.capacity(), capacity);
    }

    #[test]
    fn with_capacity_rounds_to_load_bound() {
        let table: HashTable<u8> = HashTable::with_capacity(0);
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);

        let table: HashTable<u8> = HashTable::with_capacity(1000);
        assert_eq!(table.capacity(), 1250);
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct StringItem {
        key: String,
        value: i32,
    }

    fn hash_string_key(state: &HashState, key: &str) -> u64 {
        let mut h = state.build_hasher();
        h.write(key.as_bytes());
        h.finish()
    }

    #[test]
    fn string_keys_survive_removal_churn() {
        let state = HashState::default();
        let mut table: HashTable<StringItem> = HashTable::new();
        for i in 0..300 {
            let key = alloc::format!("key_{i}");
            let hash = hash_string_key(&state, &key);
            table
                .entry(hash, |v| v.key == key)
                .or_insert(StringItem { key, value: i });
        }

        for i in (0..300).step_by(2) {
            let key = alloc::format!("key_{i}");
            let hash = hash_string_key(&state, &key);
            assert_eq!(table.remove(hash, |v| v.key == key).map(|v| v.value), Some(i));
        }
        table.check_invariants();

        for i in 0..300 {
            let key = alloc::format!("key_{i}");
            let hash = hash_string_key(&state, &key);
            let found = table.find(hash, |v| v.key == key).map(|v| v.value);
            assert_eq!(found, (i % 2 == 1).then_some(i));
        }
    }

    #[test]
    fn entry_or_insert_with() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        let hash = hash_key(&state, 5);

        let v = table
            .entry(hash, |v| v.key == 5)
            .or_insert_with(|| Item { key: 5, value: 50 });
        assert_eq!(v.value, 50);

        let v = table
            .entry(hash, |v| v.key == 5)
            .or_insert_with(|| Item { key: 5, value: 99 });
        assert_eq!(v.value, 50);
        assert_eq!(table.len(), 1);

        assert!(
            table
                .entry(hash_key(&state, 6), |v| v.key == 6)
                .and_modify(|v| v.value = 0)
                .is_none()
        );
    }

    #[test]
    fn histogram_and_stats() {
        let mut table: HashTable<u64> = HashTable::new();
        for k in 0..4u64 {
            table.insert_unique(0, k);
        }
        table.insert_unique(20, 20);

        assert_eq!(table.probe_histogram().counts(), &[2, 1, 1, 1]);
        assert_eq!(table.probe_histogram().total(), 5);

        let stats = table.debug_stats();
        assert_eq!(stats.len, 5);
        assert_eq!(stats.slots, 64);
        assert_eq!(stats.max_psl, 4);
        assert!((stats.mean_psl - 11.0 / 5.0).abs() < 1e-9);

        let empty: HashTable<u64> = HashTable::new();
        assert!(empty.probe_histogram().counts().is_empty());
        assert_eq!(empty.debug_stats().max_psl, 0);
    }

    #[test]
    fn test_clone() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..70u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }

        let mut cloned = table.clone();
        cloned.check_invariants();
        assert_eq!(cloned.len(), table.len());
        assert_eq!(cloned.capacity(), table.capacity());

        cloned.remove(hash_key(&state, 0), |v| v.key == 0);
        assert!(table.find(hash_key(&state, 0), |v| v.key == 0).is_some());
        assert!(cloned.find(hash_key(&state, 0), |v| v.key == 0).is_none());

        let values: Vec<i32> = table.into_iter().map(|v| v.value).collect();
        assert_eq!(values, (0..70).collect::<Vec<_>>());
    }

    #[test]
    fn debug_output_lists_slots() {
        let mut table: HashTable<u8> = HashTable::new();
        table.insert_unique(1, 1);
        let out = alloc::format!("{table:?}");
        assert!(out.contains("populated: 1"));
        assert!(out.contains("capacity: 64"));
    }
}
