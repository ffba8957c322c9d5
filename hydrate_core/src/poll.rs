//! Tagged outcome of a single poll.

/// Result of polling one source, with last-known-good retention made explicit.
///
/// - `Fresh(v)`: the poll succeeded and produced a valid value.
/// - `Stale(v)`: the poll failed; `v` is the retained last-known value.
/// - `Unknown`: the poll failed and nothing is known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    Fresh(T),
    Stale(T),
    Unknown,
}

impl<T> Poll<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Poll::Fresh(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Poll::Fresh(v) | Poll::Stale(v) => Some(v),
            Poll::Unknown => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Poll::Fresh(v) | Poll::Stale(v) => Some(v),
            Poll::Unknown => None,
        }
    }

    /// Anything that is not fresh becomes `Stale(last)`.
    pub fn or_retain(self, last: T) -> Poll<T> {
        match self {
            Poll::Fresh(v) => Poll::Fresh(v),
            Poll::Stale(_) | Poll::Unknown => Poll::Stale(last),
        }
    }

    /// Demote a fresh value that fails `valid` to `Unknown`.
    pub fn filter(self, valid: impl FnOnce(&T) -> bool) -> Poll<T> {
        match self {
            Poll::Fresh(v) if valid(&v) => Poll::Fresh(v),
            Poll::Fresh(_) => Poll::Unknown,
            other => other,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Poll<U> {
        match self {
            Poll::Fresh(v) => Poll::Fresh(f(v)),
            Poll::Stale(v) => Poll::Stale(f(v)),
            Poll::Unknown => Poll::Unknown,
        }
    }
}

impl<T, E> From<Result<T, E>> for Poll<T> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => Poll::Fresh(v),
            Err(_) => Poll::Unknown,
        }
    }
}

impl<T> From<Option<T>> for Poll<T> {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => Poll::Fresh(v),
            None => Poll::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_retain_keeps_fresh_and_replaces_failures() {
        assert_eq!(Poll::Fresh(3).or_retain(1), Poll::Fresh(3));
        assert_eq!(Poll::<i32>::Unknown.or_retain(1), Poll::Stale(1));
        assert_eq!(Poll::Stale(9).or_retain(1), Poll::Stale(1));
    }

    #[test]
    fn filter_demotes_invalid_fresh() {
        assert_eq!(Poll::Fresh(-1.0).filter(|v| *v >= 0.0), Poll::Unknown);
        assert_eq!(Poll::Fresh(2.0).filter(|v| *v >= 0.0), Poll::Fresh(2.0));
        assert_eq!(Poll::Stale(-1.0).filter(|v| *v >= 0.0), Poll::Stale(-1.0));
    }

    #[test]
    fn conversions() {
        let ok: Result<bool, ()> = Ok(true);
        assert_eq!(Poll::from(ok), Poll::Fresh(true));
        let err: Result<bool, ()> = Err(());
        assert_eq!(Poll::from(err), Poll::Unknown);
        assert_eq!(Poll::from(None::<u8>), Poll::Unknown);
        assert_eq!(Poll::Fresh(2).map(|v| v * 2).into_value(), Some(4));
        assert_eq!(Poll::<u8>::Unknown.value(), None);
    }
}
