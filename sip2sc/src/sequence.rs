/// Cyclic single-digit transaction sequence number for the AY field.
///
/// The first value handed out is 0.  After 9 the counter wraps to 0.
///
/// ```
/// use sip2sc::SequenceCounter;
/// let mut seq = SequenceCounter::new();
/// assert_eq!(seq.next(), 0);
/// assert_eq!(seq.next(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SequenceCounter {
    // None until the first value is handed out.
    current: Option<u8>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Advance the counter and return the new value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u8 {
        let next = match self.current {
            Some(n) if n < 9 => n + 1,
            _ => 0,
        };

        self.current = Some(next);
        next
    }

    /// Most recently returned value, if any.
    pub fn current(&self) -> Option<u8> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_after_nine() {
        let mut seq = SequenceCounter::new();
        let values: Vec<u8> = (0..11).map(|_| seq.next()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
    }

    #[test]
    fn current_tracks_last_value() {
        let mut seq = SequenceCounter::new();
        assert_eq!(seq.current(), None);
        seq.next();
        seq.next();
        assert_eq!(seq.current(), Some(1));
    }
}
