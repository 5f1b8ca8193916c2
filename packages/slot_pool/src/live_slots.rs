use std::num::NonZero;

const BITS_PER_WORD: usize = u64::BITS as usize;

/// One bit per slot, set while the slot is live.
///
/// Only pools with [`FreePolicy::Checked`][crate::FreePolicy::Checked] carry one of these.
#[derive(Debug)]
pub(crate) struct LiveSlots {
    words: Box<[u64]>,
    slot_count: usize,
}

impl LiveSlots {
    #[must_use]
    pub(crate) fn new(slot_count: NonZero<usize>) -> Self {
        let word_count = slot_count.get().div_ceil(BITS_PER_WORD);

        Self {
            words: vec![0; word_count].into_boxed_slice(),
            slot_count: slot_count.get(),
        }
    }

    #[must_use]
    pub(crate) fn is_live(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);

        self.words.get(word).is_some_and(|bits| bits & mask != 0)
    }

    pub(crate) fn mark_live(&mut self, index: usize) {
        let (word, mask) = self.locate(index);

        let bits = self
            .words
            .get_mut(word)
            .expect("locate() only returns words inside the bitmap");
        *bits |= mask;
    }

    pub(crate) fn mark_free(&mut self, index: usize) {
        let (word, mask) = self.locate(index);

        let bits = self
            .words
            .get_mut(word)
            .expect("locate() only returns words inside the bitmap");
        *bits &= !mask;
    }

    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.slot_count,
            "slot index {index} out of bounds for pool of {} slots",
            self.slot_count
        );

        #[expect(
            clippy::integer_division,
            reason = "we want the word that holds the bit, rounding down is intended"
        )]
        let word = index / BITS_PER_WORD;
        let bit = index.wrapping_rem(BITS_PER_WORD);

        (word, 1_u64 << bit)
    }
}
