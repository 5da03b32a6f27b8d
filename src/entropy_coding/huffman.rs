// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;
use std::io::Read;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};

pub const HUFFMAN_MAX_BITS: usize = 16;
pub const HUFFMAN_MAX_SYMBOLS: usize = 256;
const LUT_BITS: usize = 8;

/// Canonical Huffman decoder built from a DHT segment.
#[derive(Clone)]
pub struct HuffmanTable {
    num_codes: usize,
    // Indexed by the next LUT_BITS bits of the stream. The high byte is the
    // symbol, the low byte is 1 plus the code length, or 0 for codes longer
    // than LUT_BITS.
    lut: [u16; 1 << LUT_BITS],
    // Symbols sorted by code.
    symbols: [u8; HUFFMAN_MAX_SYMBOLS],
    // Per code length minus one: smallest and largest code, or -1 if there
    // are no codes of that length, and the index into `symbols` of the
    // smallest code.
    min_codes: [i32; HUFFMAN_MAX_BITS],
    max_codes: [i32; HUFFMAN_MAX_BITS],
    first_symbol: [i32; HUFFMAN_MAX_BITS],
}

impl Default for HuffmanTable {
    fn default() -> Self {
        HuffmanTable {
            num_codes: 0,
            lut: [0; 1 << LUT_BITS],
            symbols: [0; HUFFMAN_MAX_SYMBOLS],
            min_codes: [-1; HUFFMAN_MAX_BITS],
            max_codes: [-1; HUFFMAN_MAX_BITS],
            first_symbol: [-1; HUFFMAN_MAX_BITS],
        }
    }
}

impl Debug for HuffmanTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuffmanTable")
            .field("num_codes", &self.num_codes)
            .field("symbols", &&self.symbols[..self.num_codes])
            .field("max_codes", &self.max_codes)
            .finish()
    }
}

impl HuffmanTable {
    /// Builds the decoder from the per-length code counts (lengths 1 to 16)
    /// and the symbols in canonical code order.
    pub fn new(counts: &[u8; HUFFMAN_MAX_BITS], symbols: &[u8]) -> Result<HuffmanTable> {
        let num_codes: usize = counts.iter().map(|&c| c as usize).sum();
        if num_codes == 0 {
            return Err(Error::EmptyHuffmanTable);
        }
        if num_codes > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::HuffmanTableTooLarge(num_codes));
        }
        if symbols.len() != num_codes {
            return Err(Error::DhtWrongLength);
        }

        let mut table = HuffmanTable {
            num_codes,
            ..Default::default()
        };
        table.symbols[..num_codes].copy_from_slice(symbols);

        let mut code = 0u32;
        let mut x = 0;
        for len in 0..LUT_BITS {
            code <<= 1;
            let shift = LUT_BITS - 1 - len;
            for _ in 0..counts[len] {
                // Every LUT index whose top len+1 bits equal `code` decodes
                // to this symbol.
                let base = ((code << shift) & 0xff) as usize;
                let entry = ((symbols[x] as u16) << 8) | (len as u16 + 2);
                for k in 0..1usize << shift {
                    table.lut[base | k] = entry;
                }
                code += 1;
                x += 1;
            }
        }

        let mut code = 0i32;
        let mut index = 0i32;
        for (len, &count) in counts.iter().enumerate() {
            if count != 0 {
                let count = count as i32;
                table.min_codes[len] = code;
                table.max_codes[len] = code + count - 1;
                table.first_symbol[len] = index;
                code += count;
                index += count;
            }
            code <<= 1;
        }
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.num_codes == 0
    }

    /// Decodes the next symbol.
    #[inline]
    pub fn decode<R: Read>(&self, br: &mut BitReader<R>) -> Result<u8> {
        if self.num_codes == 0 {
            return Err(Error::UninitializedHuffmanTable);
        }
        // Near the end of a segment fewer than 8 bits may remain; the
        // remaining symbols are then read bit by bit.
        if br.bits_available() >= LUT_BITS as u32 || br.try_ensure_bits(LUT_BITS as u32)? {
            let entry = self.lut[br.peek8()];
            if entry != 0 {
                br.consume_bits((entry & 0xff) as u32 - 1);
                return Ok((entry >> 8) as u8);
            }
        }
        self.decode_slow(br)
    }

    /// Decodes the next symbol one bit at a time.
    pub(crate) fn decode_slow<R: Read>(&self, br: &mut BitReader<R>) -> Result<u8> {
        let mut code = 0i32;
        for len in 0..HUFFMAN_MAX_BITS {
            code |= br.read_bit()? as i32;
            if code <= self.max_codes[len] {
                let index = self.first_symbol[len] + code - self.min_codes[len];
                return usize::try_from(index)
                    .ok()
                    .and_then(|i| self.symbols.get(i).copied())
                    .ok_or(Error::BadHuffmanCode);
            }
            code <<= 1;
        }
        Err(Error::BadHuffmanCode)
    }
}
