//! # Memory-Mapped I/O
//!
//! A [`VolatileRegion`] is a window of 32-bit words that something other
//! than the CPU may change at any time: a peripheral register block or a
//! buffer a DMA engine writes into. Every access is a volatile word access
//! and every index is checked against the window length.

use core::ptr::{self, NonNull};

use scp_core::{FwkError, FwkResult};

/// Anything that can be read as an array of 32-bit words
pub trait WordSource {
    /// Read the word at `index`, or `None` past the end
    fn word(&self, index: usize) -> Option<u32>;

    /// Number of readable words
    fn len_words(&self) -> usize;
}

impl WordSource for [u32] {
    fn word(&self, index: usize) -> Option<u32> {
        self.get(index).copied()
    }

    fn len_words(&self) -> usize {
        self.len()
    }
}

/// Window of volatile 32-bit words
#[derive(Debug, Clone, Copy)]
pub struct VolatileRegion {
    base: NonNull<u32>,
    words: usize,
}

// SAFETY: the region only ever issues volatile word accesses; the creator
// guarantees the memory stays mapped.
unsafe impl Send for VolatileRegion {}
unsafe impl Sync for VolatileRegion {}

impl VolatileRegion {
    /// Create a region of `words` words starting at `addr`
    ///
    /// Fails with [`FwkError::Param`] for a null address and
    /// [`FwkError::Align`] if `addr` is not word aligned.
    ///
    /// # Safety
    ///
    /// `addr .. addr + 4 * words` must be readable and writable with
    /// volatile word accesses for as long as the region (or any copy of it)
    /// is used.
    pub unsafe fn new(addr: usize, words: usize) -> FwkResult<Self> {
        if addr % core::mem::align_of::<u32>() != 0 {
            return Err(FwkError::Align);
        }
        let base = NonNull::new(addr as *mut u32).ok_or(FwkError::Param)?;
        Ok(Self { base, words })
    }

    /// Address of the first word
    #[inline]
    pub fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Length in words
    #[inline]
    pub const fn len(&self) -> usize {
        self.words
    }

    /// Whether the region has no words
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Volatile read of word `index`
    #[inline]
    pub fn read(&self, index: usize) -> Option<u32> {
        if index >= self.words {
            return None;
        }
        // SAFETY: index is in bounds; validity is the constructor's contract
        Some(unsafe { self.read_unchecked(index) })
    }

    /// Volatile write of word `index`
    #[inline]
    pub fn write(&self, index: usize, value: u32) -> FwkResult<()> {
        if index >= self.words {
            return Err(FwkError::Range);
        }
        // SAFETY: index is in bounds; validity is the constructor's contract
        unsafe { self.write_unchecked(index, value) };
        Ok(())
    }

    /// Volatile read without the bounds check
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn read_unchecked(&self, index: usize) -> u32 {
        // SAFETY: caller guarantees index < words
        unsafe { ptr::read_volatile(self.base.as_ptr().add(index)) }
    }

    /// Volatile write without the bounds check
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn write_unchecked(&self, index: usize, value: u32) {
        // SAFETY: caller guarantees index < words
        unsafe { ptr::write_volatile(self.base.as_ptr().add(index), value) }
    }

    /// Sub-window of `words` words starting at word `offset`
    pub fn window(&self, offset: usize, words: usize) -> FwkResult<Self> {
        let end = offset.checked_add(words).ok_or(FwkError::Range)?;
        if end > self.words {
            return Err(FwkError::NoMem);
        }
        // SAFETY: offset <= words, so the pointer stays inside the region
        let base = unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) };
        Ok(Self { base, words })
    }

    /// Copy `dest.len()` words starting at word `offset` into `dest`
    pub fn copy_to(&self, offset: usize, dest: &mut [u32]) -> FwkResult<()> {
        let end = offset.checked_add(dest.len()).ok_or(FwkError::Range)?;
        if end > self.words {
            return Err(FwkError::Range);
        }
        for (i, slot) in dest.iter_mut().enumerate() {
            // SAFETY: offset + i < end <= words
            *slot = unsafe { self.read_unchecked(offset + i) };
        }
        Ok(())
    }
}

impl WordSource for VolatileRegion {
    fn word(&self, index: usize) -> Option<u32> {
        self.read(index)
    }

    fn len_words(&self) -> usize {
        self.words
    }
}
