/// Simple vector set that ensures that all elements are unique. Elements keep
/// their insertion order (we expect the vector to be small).
#[derive(Debug, Clone)]
pub struct VecSet<T: Eq> {
    inner: Vec<T>,
}

impl<T: Eq> VecSet<T> {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Returns false if an equal element was already present.
    #[inline]
    pub fn push(&mut self, to_push: T) -> bool {
        if self.contains(&to_push) {
            return false;
        }
        self.inner.push(to_push);
        true
    }

    #[inline]
    pub fn remove(&mut self, to_remove: &T) -> bool {
        match self.inner.iter().position(|element| element == to_remove) {
            Some(index) => {
                self.inner.remove(index);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, element: &T) -> bool {
        self.inner.iter().any(|e| e == element)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Eq> Default for VecSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Vector set kept in ascending order at every insertion. Insertion walks from
/// the front, so the first element is always the least.
#[derive(Debug, Clone)]
pub struct SortedVecSet<T: Ord> {
    inner: Vec<T>,
}

impl<T: Ord> SortedVecSet<T> {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Returns false if an equal element was already present.
    pub fn insert(&mut self, to_insert: T) -> bool {
        let mut index = self.inner.len();
        for (i, element) in self.inner.iter().enumerate() {
            match element.cmp(&to_insert) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => return false,
                std::cmp::Ordering::Greater => {
                    index = i;
                    break;
                }
            }
        }
        self.inner.insert(index, to_insert);
        true
    }

    pub fn remove(&mut self, to_remove: &T) -> Option<T> {
        match self.inner.binary_search(to_remove) {
            Ok(index) => Some(self.inner.remove(index)),
            Err(_) => None,
        }
    }

    #[inline]
    pub fn contains(&self, element: &T) -> bool {
        self.inner.binary_search(element).is_ok()
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.inner.first()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Ord> Default for SortedVecSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
