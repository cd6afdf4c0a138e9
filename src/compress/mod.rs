//! Splay-tree adaptive decompression for compressed zones.
//!
//! Compressed zones carry no frequency table. The coder starts from a
//! complete balanced binary tree over 257 leaves (256 byte values plus an
//! end-of-data symbol) and, after every decoded symbol, splays the used leaf
//! one level toward the root. Frequently seen bytes therefore acquire shorter
//! codes as decoding proceeds, adapting to per-file statistics with zero
//! header overhead.

use bytes::Bytes;
use thiserror::Error;

use crate::input::BoundedStream;

/// Number of plain byte values.
const MAX_CHAR: usize = 256;
/// First leaf index; decoded byte = leaf - MAX_SUCC.
const MAX_SUCC: usize = MAX_CHAR + 1;
/// Node array size (nodes are indexed 1..=2*MAX_CHAR+1).
const TREE_SIZE: usize = 2 * MAX_SUCC + 1;
/// Root node index.
const ROOT: usize = 1;
/// The 257th symbol, used by writers as an end-of-data marker.
const END_SYMBOL: usize = MAX_CHAR;

/// Errors produced while inflating a compressed zone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    /// The compressed byte range was empty or unreadable
    #[error("compressed region is empty")]
    EmptyInput,

    /// Decoding produced no bytes at all
    #[error("compressed region decoded to zero bytes")]
    EmptyOutput,

    /// The bitstream ended in the middle of a symbol
    #[error("compressed bitstream truncated mid-symbol")]
    Truncated,
}

/// What to do when the bitstream ends in the middle of a symbol.
///
/// Legacy writers pad the last byte of a zone, and truncated files are
/// common; the original format family emits the partial node index as a
/// byte and carries on. That behavior is almost certainly best-effort
/// recovery rather than a format feature, so it is explicit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Emit the partially decoded node index wrapped to a byte, then stop
    #[default]
    EmitPartial,
    /// Treat mid-symbol truncation as a hard failure
    Fail,
}

/// Stateful adaptive binary-tree decoder.
///
/// One decoder inflates one zone; the tree state is not reused across zones.
pub struct SplayDecoder {
    left: [u16; TREE_SIZE],
    right: [u16; TREE_SIZE],
    up: [u16; TREE_SIZE],
}

impl SplayDecoder {
    /// Build the initial, unbiased code: a complete balanced binary tree
    /// with internal nodes `1..=256` and leaves `257..=513`.
    pub fn new() -> Self {
        let mut decoder = Self {
            left: [0; TREE_SIZE],
            right: [0; TREE_SIZE],
            up: [0; TREE_SIZE],
        };
        for node in ROOT..=MAX_CHAR {
            decoder.left[node] = (2 * node) as u16;
            decoder.right[node] = (2 * node + 1) as u16;
        }
        for node in 2..=2 * MAX_CHAR + 1 {
            decoder.up[node] = (node / 2) as u16;
        }
        decoder.up[ROOT] = ROOT as u16;
        decoder
    }

    /// Inflate up to `expected_len` bytes from the stream's current position
    /// to its active limit.
    ///
    /// Stops when `expected_len` bytes have been produced, when the writer's
    /// end-of-data symbol is decoded, or when the input runs out. An empty
    /// input or an empty result is always an error; a compressed zone never
    /// legitimately decodes to nothing.
    pub fn decompress(
        &mut self,
        input: &mut BoundedStream,
        expected_len: u64,
        policy: TruncationPolicy,
    ) -> Result<Bytes, DecompressError> {
        if input.at_end() {
            return Err(DecompressError::EmptyInput);
        }

        let mut output: Vec<u8> = Vec::with_capacity(expected_len as usize);
        let mut bit_buf: u8 = 0;
        let mut bit_count: u8 = 0;

        'decode: while (output.len() as u64) < expected_len {
            let mut node = ROOT;
            // walk down the tree one bit at a time until a leaf
            let leaf = loop {
                if bit_count == 0 {
                    match input.read_u8() {
                        Some(byte) => {
                            bit_buf = byte;
                            bit_count = 8;
                        }
                        None => {
                            if node != ROOT {
                                match policy {
                                    TruncationPolicy::EmitPartial => {
                                        output.push((node as i32 - MAX_SUCC as i32) as u8);
                                    }
                                    TruncationPolicy::Fail => {
                                        return Err(DecompressError::Truncated);
                                    }
                                }
                            }
                            break 'decode;
                        }
                    }
                }
                let go_right = bit_buf & 0x80 != 0;
                bit_buf <<= 1;
                bit_count -= 1;
                node = if go_right {
                    self.right[node] as usize
                } else {
                    self.left[node] as usize
                };
                if node > MAX_CHAR {
                    break node;
                }
            };
            let symbol = leaf - MAX_SUCC;
            if symbol == END_SYMBOL {
                break;
            }
            output.push(symbol as u8);
            self.splay(leaf);
        }

        if output.is_empty() {
            return Err(DecompressError::EmptyOutput);
        }
        Ok(Bytes::from(output))
    }

    /// Move the just-used leaf one level toward the root.
    ///
    /// At each step the leaf swaps places with its uncle under the
    /// grandparent (the classic semi-rotation of splay-prefix coding),
    /// then the walk continues from the grandparent.
    fn splay(&mut self, leaf: usize) {
        let mut a = leaf;
        while a != ROOT {
            let parent = self.up[a] as usize;
            if parent == ROOT {
                break;
            }
            let grand = self.up[parent] as usize;
            // locate the uncle and swap it with `a`
            let uncle = if self.left[grand] as usize == parent {
                let u = self.right[grand] as usize;
                self.right[grand] = a as u16;
                u
            } else {
                let u = self.left[grand] as usize;
                self.left[grand] = a as u16;
                u
            };
            if self.left[parent] as usize == a {
                self.left[parent] = uncle as u16;
            } else {
                self.right[parent] = uncle as u16;
            }
            self.up[a] = grand as u16;
            self.up[uncle] = parent as u16;
            a = grand;
        }
    }
}

impl Default for SplayDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inflate one zone with a fresh decoder.
pub fn decompress(
    input: &mut BoundedStream,
    expected_len: u64,
    policy: TruncationPolicy,
) -> Result<Bytes, DecompressError> {
    SplayDecoder::new().decompress(input, expected_len, policy)
}

/// Test-support encoder mirroring the decoder's tree, used to build
/// synthetic compressed zones.
#[cfg(test)]
pub(crate) fn splay_encode(data: &[u8]) -> Vec<u8> {
    let mut tree = SplayDecoder::new();
    let mut bits: Vec<bool> = Vec::new();
    for &byte in data {
        let leaf = byte as usize + MAX_SUCC;
        let mut path = Vec::new();
        let mut node = leaf;
        while node != ROOT {
            let parent = tree.up[node] as usize;
            path.push(tree.right[parent] as usize == node);
            node = parent;
        }
        path.reverse();
        bits.extend(path);
        tree.splay(leaf);
    }
    let mut packed = vec![0u8; bits.len().div_ceil(8)];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            packed[i / 8] |= 0x80 >> (i % 8);
        }
    }
    packed
}
