//! Save flag bitfields and their compact encodings.

/// The save flags of the observed program, as one long run of bits.
///
/// Flag `n` is bit `n % 8` of byte `n / 8`, counting bytes in the order the
/// chunks were read.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FlagBitfield {
    bytes: Vec<u8>,
}

impl FlagBitfield {
    /// Concatenate flag chunks in read order.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut bytes = Vec::new();
        for chunk in chunks {
            bytes.extend_from_slice(chunk.as_ref());
        }

        FlagBitfield { bytes }
    }

    pub fn bit_count(&self) -> usize {
        self.bytes.len() * 8
    }

    pub fn is_set(&self, flag: u32) -> bool {
        self.bytes
            .get((flag / 8) as usize)
            .map_or(false, |byte| byte & (1 << (flag % 8)) != 0)
    }

    /// Iterate every set flag, in ascending order.
    pub fn iter_set<'a>(&'a self) -> impl Iterator<Item = u32> + 'a {
        self.bytes.iter().enumerate().flat_map(|(byte_i, byte)| {
            (0..8)
                .filter(move |i| byte & (1 << i) != 0)
                .map(move |i| byte_i as u32 * 8 + i)
        })
    }
}

/// A frozen catalog resolved against the game data.
///
/// Entry `i` is the flag reported as bit `i`, or `None` if the game data
/// does not define it; such bits are always clear. Only the first 64 entries
/// can be encoded.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OrderedFlags {
    flags: Vec<Option<u32>>,
}

impl OrderedFlags {
    pub fn new(flags: Vec<Option<u32>>) -> Self {
        OrderedFlags { flags }
    }

    /// Build a catalog from entries that carry their own bit position.
    ///
    /// Positions nobody claims stay clear.
    pub fn at_positions<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, Option<u32>)>,
    {
        let mut flags = Vec::new();
        for (position, flag) in entries {
            let i = position as usize;
            if flags.len() <= i {
                flags.resize(i + 1, None);
            }

            flags[i] = flag;
        }

        OrderedFlags { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Encode the catalog's flags as `Σ 2^i` over the set positions `i`.
    pub fn encode(&self, bits: &FlagBitfield) -> u64 {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| flag.map_or(false, |f| bits.is_set(f)))
            .fold(0, |sum, (i, _)| {
                sum | 1u64.checked_shl(i as u32).unwrap_or(0)
            })
    }

    /// Recover the catalog positions set in an encoded bitfield.
    #[cfg(test)]
    pub fn decode(&self, value: u64) -> Vec<usize> {
        (0..self.flags.len().min(64))
            .filter(|i| value & (1u64 << i) != 0)
            .collect()
    }
}
