// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Entropy decoding of a single 8x8 block (T.81 F.2.2 and G.1.2).

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::entropy_coding::decode::{read_eob_run, receive_extend};
use crate::entropy_coding::huffman::HuffmanTable;
use crate::error::{Error, Result};
use crate::frame::coeff_order::UNZIG;
use crate::frame::Block;
use crate::headers::{ScanHeader, MAX_COMPONENTS};
use crate::util::tracing_wrappers::*;

/// Largest DC difference category, i.e. the most bits one RECEIVE reads.
const MAX_DC_CATEGORY: u8 = 16;
/// AC symbol for a run of 16 zero coefficients.
const ZRL_RUN: u8 = 0x0f;

/// Entropy decoder state shared by the blocks of a scan.
#[derive(Debug, Default)]
pub struct ScanState {
    /// DC predictor per frame component.
    pub dc_pred: [i32; MAX_COMPONENTS],
    /// Blocks left in the current end-of-band run, this one excluded.
    pub eob_run: u16,
}

impl ScanState {
    /// Restores the state at the start of a scan or after a restart marker.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Decodes the coefficients of band `ss..=se` for a sequential scan or the
/// first progressive pass over the band, scaled by `2^al`.
pub fn decode_block<R: Read>(
    br: &mut BitReader<R>,
    scan: &ScanHeader,
    block: &mut Block,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    component: usize,
    state: &mut ScanState,
) -> Result<()> {
    let (se, al) = (scan.se as usize, scan.al);
    let mut zig = scan.ss as usize;
    if zig == 0 {
        zig = 1;
        let t = dc_table.decode(br)?;
        if t > MAX_DC_CATEGORY {
            return Err(Error::ExcessiveDcComponent(t));
        }
        let diff = receive_extend(br, t)?;
        let pred = &mut state.dc_pred[component];
        *pred = pred.wrapping_add(diff);
        block[0] = *pred << al;
    }

    if zig > se {
        return Ok(());
    }
    if state.eob_run > 0 {
        state.eob_run -= 1;
        return Ok(());
    }
    while zig <= se {
        let symbol = ac_table.decode(br)?;
        trace!(symbol, zig);
        let (run, size) = (symbol >> 4, symbol & 0x0f);
        if size != 0 {
            zig += run as usize;
            if zig > se {
                break;
            }
            block[UNZIG[zig]] = receive_extend(br, size)? << al;
        } else if run == ZRL_RUN {
            zig += 15;
        } else {
            state.eob_run = read_eob_run(br, run)? - 1;
            break;
        }
        zig += 1;
    }
    Ok(())
}

/// Applies a successive approximation refinement pass (`ah != 0`) over band
/// `ss..=se` to a block decoded by earlier scans.
pub fn refine_block<R: Read>(
    br: &mut BitReader<R>,
    scan: &ScanHeader,
    block: &mut Block,
    ac_table: &HuffmanTable,
    state: &mut ScanState,
) -> Result<()> {
    let delta = 1i32 << scan.al;
    let (ss, se) = (scan.ss as usize, scan.se as usize);

    // DC refinement is a single bit.
    if ss == 0 {
        debug_assert_eq!(se, 0);
        if br.read_bit()? {
            block[0] |= delta;
        }
        return Ok(());
    }

    let mut zig = ss;
    if state.eob_run == 0 {
        while zig <= se {
            let symbol = ac_table.decode(br)?;
            trace!(symbol, zig);
            let (run, size) = (symbol >> 4, symbol & 0x0f);
            let mut value = 0;
            match size {
                0 if run != ZRL_RUN => {
                    // The run includes this block and is consumed below.
                    state.eob_run = read_eob_run(br, run)?;
                    break;
                }
                0 => {}
                1 => value = if br.read_bit()? { delta } else { -delta },
                _ => return Err(Error::UnexpectedRefinementCode(symbol)),
            }
            zig = refine_non_zeroes(br, block, zig, se, run as i32, delta)?;
            if zig > se {
                return Err(Error::TooManyCoefficients);
            }
            if value != 0 {
                block[UNZIG[zig]] = value;
            }
            zig += 1;
        }
    }
    if state.eob_run > 0 {
        state.eob_run -= 1;
        refine_non_zeroes(br, block, zig, se, -1, delta)?;
    }
    Ok(())
}

/// Reads a correction bit for every nonzero coefficient from `zig` on,
/// stopping at the zero coefficient that follows `skip_zeroes` others, or
/// after `se`. A negative `skip_zeroes` never stops early. Returns where it
/// stopped.
fn refine_non_zeroes<R: Read>(
    br: &mut BitReader<R>,
    block: &mut Block,
    mut zig: usize,
    se: usize,
    mut skip_zeroes: i32,
    delta: i32,
) -> Result<usize> {
    while zig <= se {
        let c = &mut block[UNZIG[zig]];
        if *c == 0 {
            if skip_zeroes == 0 {
                break;
            }
            skip_zeroes -= 1;
        } else if br.read_bit()? {
            *c = if *c >= 0 {
                c.wrapping_add(delta)
            } else {
                c.wrapping_sub(delta)
            };
        }
        zig += 1;
    }
    Ok(zig)
}
