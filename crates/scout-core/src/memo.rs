/// Single-slot memoized value keyed by an input snapshot.
///
/// The value is recomputed only when asked for a key that differs from the
/// cached one; asking for the cached key returns the stored value untouched.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> &V {
        match self.entry.take() {
            Some((cached, value)) if cached == key => &self.entry.insert((cached, value)).1,
            _ => {
                let value = compute(&key);
                &self.entry.insert((key, value)).1
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((cached, value)) if cached == key => Some(value),
            _ => None,
        }
    }

    pub fn is_cached(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once_per_key() {
        let mut memo: Memo<u64, String> = Memo::new();
        let mut calls = 0;

        let v = memo
            .get_or_compute(1, |k| {
                calls += 1;
                format!("v{k}")
            })
            .clone();
        assert_eq!(v, "v1");

        memo.get_or_compute(1, |_| {
            calls += 1;
            String::new()
        });
        assert_eq!(calls, 1);
        assert!(memo.is_cached(&1));
    }

    #[test]
    fn test_new_key_replaces_entry() {
        let mut memo: Memo<(u64, &str), usize> = Memo::new();
        memo.get_or_compute((1, "all"), |_| 3);
        assert_eq!(*memo.get_or_compute((1, "tasks"), |_| 1), 1);
        assert!(!memo.is_cached(&(1, "all")));
        assert_eq!(memo.get(&(1, "tasks")), Some(&1));
    }

    #[test]
    fn test_invalidate_clears() {
        let mut memo: Memo<u8, u8> = Memo::default();
        memo.get_or_compute(7, |k| k * 2);
        memo.invalidate();
        assert!(memo.get(&7).is_none());
    }
}
