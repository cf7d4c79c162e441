use hashbrown::HashMap;

/// UV code -> cardinal bits that are Same for every key producing that UV.
#[derive(Debug, Clone, Default)]
pub(crate) struct ValidityTable {
    masks: HashMap<u16, u8>,
}

impl ValidityTable {
    /// Narrows the mask of `code` to the bits `key_same` also has.
    #[inline]
    pub(crate) fn observe(&mut self, code: u16, key_same: u8) {
        self.masks
            .entry(code)
            .and_modify(|m| *m &= key_same)
            .or_insert(key_same & 0x0F);
    }

    #[inline]
    pub(crate) fn get(&self, code: u16) -> u8 {
        self.masks.get(&code).copied().unwrap_or(0)
    }
}
