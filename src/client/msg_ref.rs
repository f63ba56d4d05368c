// ABOUTME: Reference numbers tying the segments of a concatenated message together
// ABOUTME: Sessions own their generator; the default counts up from 1 modulo 65536

/// Source of concatenation reference numbers.
///
/// Any `FnMut() -> u16` closure is a generator.
pub trait MessageRefGenerator {
    fn next_ref(&mut self) -> u16;
}

/// Counter owned by one session.
#[derive(Debug, Clone, Default)]
pub struct DefaultMessageRef {
    last: u16,
}

impl DefaultMessageRef {
    /// The first reference returned is `start + 1`.
    pub fn starting_at(start: u16) -> Self {
        Self { last: start }
    }
}

impl MessageRefGenerator for DefaultMessageRef {
    fn next_ref(&mut self) -> u16 {
        self.last = self.last.wrapping_add(1);
        self.last
    }
}

impl<F> MessageRefGenerator for F
where
    F: FnMut() -> u16,
{
    fn next_ref(&mut self) -> u16 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_counts_and_wraps() {
        let mut generator = DefaultMessageRef::default();
        assert_eq!(generator.next_ref(), 1);
        assert_eq!(generator.next_ref(), 2);

        let mut generator = DefaultMessageRef::starting_at(u16::MAX - 1);
        assert_eq!(generator.next_ref(), u16::MAX);
        assert_eq!(generator.next_ref(), 0);
    }

    #[test]
    fn independent_generators() {
        let mut a = DefaultMessageRef::default();
        let mut b = DefaultMessageRef::default();
        a.next_ref();
        assert_eq!(b.next_ref(), 1);
    }

    #[test]
    fn closures_are_generators() {
        let mut n: u16 = 100;
        let mut generator = move || {
            n += 10;
            n
        };
        assert_eq!(MessageRefGenerator::next_ref(&mut generator), 110);
    }
}
