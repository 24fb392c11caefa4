//! Page index newtype for safe conversion between 0-based indices and
//! lopdf's 1-based page numbers.

/// A 0-based page index within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(u32);

impl PageIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Get the 1-indexed page number used as key by `lopdf::Document::get_pages`.
    #[must_use]
    pub const fn as_lopdf_page_number(self) -> u32 {
        self.0 + 1
    }

    /// Inverse of [`Self::as_lopdf_page_number`]. Page number 0 does not exist.
    #[must_use]
    pub const fn from_lopdf_page_number(number: u32) -> Option<Self> {
        match number.checked_sub(1) {
            Some(index) => Some(Self(index)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lopdf_page_numbers() {
        assert_eq!(PageIndex::new(0).as_lopdf_page_number(), 1);
        assert_eq!(PageIndex::new(5).as_lopdf_page_number(), 6);
        assert_eq!(PageIndex::from_lopdf_page_number(1), Some(PageIndex::new(0)));
        assert_eq!(PageIndex::from_lopdf_page_number(0), None);
    }
}
