// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::entropy_coding::huffman::{HuffmanTable, HUFFMAN_MAX_BITS, HUFFMAN_MAX_SYMBOLS};
use crate::error::{Error, Result};
use crate::frame::coeff_order::UNZIG;
use crate::headers::frame_header::MAX_TQ;
use crate::util::tracing_wrappers::*;
use crate::BLOCK_SIZE;

/// Quantization step sizes in natural order.
pub type QuantTable = [i32; BLOCK_SIZE];

pub const NUM_QUANT_TABLES: usize = MAX_TQ as usize + 1;
pub const NUM_HUFFMAN_TABLES: usize = 4;
/// Huffman table class: DC or AC.
pub const DC_CLASS: usize = 0;
pub const AC_CLASS: usize = 1;

/// Huffman tables indexed by class, then destination.
pub type HuffmanTables = [[HuffmanTable; NUM_HUFFMAN_TABLES]; 2];

/// Reads every quantization table in a DQT payload of `n` bytes.
pub fn read_dqt<R: Read>(
    br: &mut BitReader<R>,
    mut n: usize,
    tables: &mut [QuantTable; NUM_QUANT_TABLES],
) -> Result<()> {
    while n > 0 {
        n -= 1;
        let pq_tq = br.read_byte()?;
        let tq = pq_tq & 0x0f;
        if tq > MAX_TQ {
            return Err(Error::BadTq(tq));
        }
        let table = &mut tables[tq as usize];
        match pq_tq >> 4 {
            0 => {
                if n < BLOCK_SIZE {
                    break;
                }
                n -= BLOCK_SIZE;
                let mut buf = [0u8; BLOCK_SIZE];
                br.read_full(&mut buf)?;
                for (zig, &q) in buf.iter().enumerate() {
                    table[UNZIG[zig]] = q as i32;
                }
            }
            1 => {
                if n < 2 * BLOCK_SIZE {
                    break;
                }
                n -= 2 * BLOCK_SIZE;
                let mut buf = [0u8; 2 * BLOCK_SIZE];
                br.read_full(&mut buf)?;
                for (zig, q) in buf.chunks_exact(2).enumerate() {
                    table[UNZIG[zig]] = u16::from_be_bytes([q[0], q[1]]) as i32;
                }
            }
            pq => return Err(Error::BadPq(pq)),
        }
        debug!(tq, precision = pq_tq >> 4, "DQT");
    }
    if n != 0 {
        return Err(Error::DqtWrongLength);
    }
    Ok(())
}

/// Reads every Huffman table in a DHT payload of `n` bytes. `baseline`
/// frames may only use destinations 0 and 1.
pub fn read_dht<R: Read>(
    br: &mut BitReader<R>,
    mut n: usize,
    baseline: bool,
    tables: &mut HuffmanTables,
) -> Result<()> {
    const HEADER_LEN: usize = 1 + HUFFMAN_MAX_BITS;
    while n > 0 {
        if n < HEADER_LEN {
            return Err(Error::DhtWrongLength);
        }
        let mut header = [0u8; HEADER_LEN];
        br.read_full(&mut header)?;
        let tc = header[0] >> 4;
        if tc as usize > AC_CLASS {
            return Err(Error::BadTc(tc));
        }
        let th = header[0] & 0x0f;
        if th as usize >= NUM_HUFFMAN_TABLES || (baseline && th > 1) {
            return Err(Error::BadTh(th));
        }
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts.copy_from_slice(&header[1..]);
        let num_codes: usize = counts.iter().map(|&c| c as usize).sum();
        if num_codes == 0 {
            return Err(Error::EmptyHuffmanTable);
        }
        if num_codes > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::HuffmanTableTooLarge(num_codes));
        }
        n = n
            .checked_sub(HEADER_LEN + num_codes)
            .ok_or(Error::DhtWrongLength)?;
        let mut symbols = [0u8; HUFFMAN_MAX_SYMBOLS];
        let symbols = &mut symbols[..num_codes];
        br.read_full(symbols)?;
        tables[tc as usize][th as usize] = HuffmanTable::new(&counts, symbols)?;
        debug!(tc, th, num_codes, "DHT");
    }
    Ok(())
}

/// Reads a DRI payload and returns the restart interval in MCUs.
pub fn read_dri<R: Read>(br: &mut BitReader<R>, n: usize) -> Result<u16> {
    if n != 2 {
        return Err(Error::DriWrongLength);
    }
    let interval = br.read_u16()?;
    debug!(interval, "DRI");
    Ok(interval)
}
