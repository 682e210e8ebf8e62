//! Types to represent endianness.

use num_traits::{CheckedShl, PrimInt};

/// Indicates the byte order when reading words from memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Words are stored in memory least significant byte first.
    ///
    /// This is "backwards" compared to how English writes numbers.
    LittleEndian,

    /// Words are stored in memory most significant byte first.
    ///
    /// This is the same order as how English writes numbers.
    BigEndian,
}

impl Endianness {
    /// Assemble an integer out of the given bytes.
    ///
    /// Bytes that do not fit into `T` are shifted out of the result.
    pub fn decode<T>(self, bytes: &[u8]) -> T
    where
        T: PrimInt + CheckedShl + From<u8>,
    {
        let fold = |sum: T, byte: &u8| {
            sum.checked_shl(8).unwrap_or_else(T::zero) | <T as From<u8>>::from(*byte)
        };

        match self {
            Endianness::LittleEndian => bytes.iter().rev().fold(T::zero(), fold),
            Endianness::BigEndian => bytes.iter().fold(T::zero(), fold),
        }
    }

    /// Split an integer into `width` bytes.
    pub fn encode(self, value: u64, width: usize) -> Vec<u8> {
        let mut bytes: Vec<u8> = (0..width)
            .map(|i| {
                (i as u32)
                    .checked_mul(8)
                    .and_then(|shift| value.checked_shr(shift))
                    .unwrap_or(0) as u8
            })
            .collect();

        if self == Endianness::BigEndian {
            bytes.reverse();
        }

        bytes
    }
}
