use std::sync::Arc;

/// Single entry cache for a derived value.
///
/// Holds the last computed value together with the key it was computed
/// from. A lookup with a different key recomputes and replaces it.
#[derive(Debug)]
pub(crate) struct Memo<K, T> {
    entry: Option<(K, Arc<T>)>,
}

impl<K, T> Default for Memo<K, T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: PartialEq, T> Memo<K, T> {
    pub(crate) fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> T) -> Arc<T> {
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                return value.clone();
            }
        }

        let value = Arc::new(compute());
        self.entry = Some((key, value.clone()));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recomputes_only_on_key_change() {
        let mut memo = Memo::<u64, u64>::default();
        let mut calls = 0;

        let a = memo.get_or_compute(1, || {
            calls += 1;
            10
        });
        let b = memo.get_or_compute(1, || {
            calls += 1;
            20
        });
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls, 1);

        let c = memo.get_or_compute(2, || {
            calls += 1;
            30
        });
        assert_eq!(*c, 30);
        assert_eq!(calls, 2);
    }
}
