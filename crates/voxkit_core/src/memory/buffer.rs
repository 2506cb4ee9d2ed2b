//! # Growable Buffer
//!
//! A typed dynamic array with explicit doubling growth and fallible allocation.

use bytemuck::Pod;

use crate::error::{CoreError, CoreResult};

/// A growable array of `T` with amortized O(1) appends.
///
/// Capacity is tracked explicitly: when `len == capacity` the next append
/// doubles it before storing. Element storage may move on growth, so callers
/// must not hold slices across appends (the borrow checker enforces this).
///
/// # Example
///
/// ```rust
/// use voxkit_core::GrowableBuffer;
///
/// let mut indices: GrowableBuffer<u16> = GrowableBuffer::with_capacity(2).unwrap();
/// indices.push(0).unwrap();
/// indices.push(2).unwrap();
/// indices.push(1).unwrap(); // grows 2 -> 4
/// assert_eq!(indices.capacity(), 4);
/// assert_eq!(indices.as_slice(), &[0, 2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GrowableBuffer<T> {
    /// Backing storage.
    data: Vec<T>,
    /// Logical capacity (doubles on growth).
    capacity: usize,
}

impl<T> GrowableBuffer<T> {
    /// Creates a buffer with room for at least `initial_capacity` elements.
    ///
    /// A requested capacity of zero is rounded up to one so doubling always
    /// makes progress.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Allocation` if the storage cannot be reserved.
    pub fn with_capacity(initial_capacity: usize) -> CoreResult<Self> {
        let capacity = initial_capacity.max(1);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| CoreError::Allocation { requested: capacity })?;
        Ok(Self { data, capacity })
    }

    /// Returns the number of stored elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no elements are stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current logical capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a value, doubling capacity first if the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Allocation` if growth fails. The buffer is left
    /// unchanged in that case.
    #[inline]
    pub fn push(&mut self, value: T) -> CoreResult<()> {
        if self.data.len() == self.capacity {
            self.grow_to(self.data.len() + 1)?;
        }
        self.data.push(value);
        Ok(())
    }

    /// Gets the element at `index`, or None past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Returns the stored elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterates over the stored elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Consumes the buffer, handing its storage to the caller.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Releases the backing storage. Length and capacity become zero.
    ///
    /// The buffer stays usable: the next push allocates again.
    pub fn free(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }

    /// Doubles capacity until at least `required` elements fit.
    ///
    /// Callers only grow when `required` exceeds the current capacity.
    fn grow_to(&mut self, required: usize) -> CoreResult<()> {
        let mut capacity = self.capacity.max(1);
        while capacity < required {
            capacity = capacity
                .checked_mul(2)
                .ok_or(CoreError::Allocation { requested: required })?;
        }
        debug_assert!(capacity > self.capacity);

        self.data
            .try_reserve_exact(capacity - self.data.len())
            .map_err(|_| CoreError::Allocation { requested: capacity })?;
        self.capacity = capacity;
        Ok(())
    }
}

impl<T: Copy> GrowableBuffer<T> {
    /// Appends every element of `values`, growing at most once.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Allocation` if growth fails.
    pub fn extend_from_slice(&mut self, values: &[T]) -> CoreResult<()> {
        let required = self.data.len() + values.len();
        if required > self.capacity {
            self.grow_to(required)?;
        }
        self.data.extend_from_slice(values);
        Ok(())
    }
}

impl<T: Pod> GrowableBuffer<T> {
    /// Returns the stored elements as raw bytes for GPU upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
