//! Name-keyed entity collections in natural order.

use std::ops::Index;

use crate::util::natural_sort_by_name;

/// Entities keyed by group name, enumerated in natural order of the names.
///
/// `PROBE<2>` precedes `PROBE<10>` regardless of storage order, so
/// enumeration is stable across runs and producers.
#[derive(Clone, Debug)]
pub struct Collection<T> {
    items: Vec<(String, T)>,
}

impl<T> Collection<T> {
    /// Build from pairs in any order.
    pub fn from_unsorted(mut items: Vec<(String, T)>) -> Self {
        natural_sort_by_name(&mut items);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up by exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entity at position `index` in natural order.
    pub fn nth(&self, index: usize) -> Option<&T> {
        self.items.get(index).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Index<&str> for Collection<T> {
    type Output = T;

    /// Panics if no entity has this name.
    fn index(&self, name: &str) -> &T {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no entity named {:?}", name),
        }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = (&'a str, &'a T);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a T)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_enumeration() {
        let c = Collection::from_unsorted(vec![
            ("PROBE<1>".to_string(), 1),
            ("PROBE<10>".to_string(), 10),
            ("PROBE<2>".to_string(), 2),
        ]);
        assert_eq!(c.names().collect::<Vec<_>>(), vec!["PROBE<1>", "PROBE<2>", "PROBE<10>"]);
        assert_eq!(c.values().copied().collect::<Vec<_>>(), vec![1, 2, 10]);
        assert_eq!(c.nth(2), Some(&10));
        assert_eq!(c["PROBE<2>"], 2);
        assert!(c.get("probe<2>").is_none());
    }

    #[test]
    fn test_empty() {
        let c: Collection<u8> = Collection::default();
        assert!(c.is_empty());
        assert_eq!(c.nth(0), None);
        assert_eq!((&c).into_iter().count(), 0);
    }
}
