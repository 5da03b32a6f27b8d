// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Integer 8x8 inverse DCT.
//!
//! Each 1-D pass is the Chen-Wang butterfly with multipliers scaled by
//! 2048 (11 bits of fraction). The row pass keeps 3 extra bits of
//! precision, which the column pass removes along with its own 8 + 3
//! bits of scaling.
//!
//! Intermediate values are 64-bit. Pass outputs are stored back as `i32`,
//! so blocks built from out-of-range coefficients wrap instead of
//! overflowing.

use crate::{BLOCK_DIM, BLOCK_SIZE};

const W1: i64 = 2841; // 2048*sqrt(2)*cos(1*pi/16)
const W2: i64 = 2676; // 2048*sqrt(2)*cos(2*pi/16)
const W3: i64 = 2408; // 2048*sqrt(2)*cos(3*pi/16)
const W5: i64 = 1609; // 2048*sqrt(2)*cos(5*pi/16)
const W6: i64 = 1108; // 2048*sqrt(2)*cos(6*pi/16)
const W7: i64 = 565; // 2048*sqrt(2)*cos(7*pi/16)

const W1PW7: i64 = W1 + W7;
const W1MW7: i64 = W1 - W7;
const W2PW6: i64 = W2 + W6;
const W2MW6: i64 = W2 - W6;
const W3PW5: i64 = W3 + W5;
const W3MW5: i64 = W3 - W5;

const R2: i64 = 181; // 256/sqrt(2)

#[inline(always)]
fn idct_row(s: &mut [i32]) {
    if s[1..].iter().all(|&c| c == 0) {
        let dc = s[0].wrapping_shl(3);
        s.fill(dc);
        return;
    }

    let mut x0 = ((s[0] as i64) << 11) + 128;
    let mut x1 = (s[4] as i64) << 11;
    let mut x2 = s[6] as i64;
    let mut x3 = s[2] as i64;
    let mut x4 = s[1] as i64;
    let mut x5 = s[7] as i64;
    let mut x6 = s[5] as i64;
    let mut x7 = s[3] as i64;

    let mut x8 = W7 * (x4 + x5);
    x4 = x8 + W1MW7 * x4;
    x5 = x8 - W1PW7 * x5;
    x8 = W3 * (x6 + x7);
    x6 = x8 - W3MW5 * x6;
    x7 = x8 - W3PW5 * x7;

    x8 = x0 + x1;
    x0 -= x1;
    x1 = W6 * (x3 + x2);
    x2 = x1 - W2PW6 * x2;
    x3 = x1 + W2MW6 * x3;
    x1 = x4 + x6;
    x4 -= x6;
    x6 = x5 + x7;
    x5 -= x7;

    x7 = x8 + x3;
    x8 -= x3;
    x3 = x0 + x2;
    x0 -= x2;
    x2 = (R2 * (x4 + x5) + 128) >> 8;
    x4 = (R2 * (x4 - x5) + 128) >> 8;

    s[0] = ((x7 + x1) >> 8) as i32;
    s[1] = ((x3 + x2) >> 8) as i32;
    s[2] = ((x0 + x4) >> 8) as i32;
    s[3] = ((x8 + x6) >> 8) as i32;
    s[4] = ((x8 - x6) >> 8) as i32;
    s[5] = ((x0 - x4) >> 8) as i32;
    s[6] = ((x3 - x2) >> 8) as i32;
    s[7] = ((x7 - x1) >> 8) as i32;
}

// After the row pass most columns have nonzero AC terms, so there is no
// DC-only shortcut here.
#[inline(always)]
fn idct_column(block: &mut [i32; BLOCK_SIZE], x: usize) {
    let at = |k: usize| x + BLOCK_DIM * k;
    let load = |k: usize| block[at(k)] as i64;

    let mut y0 = (load(0) << 8) + 8192;
    let mut y1 = load(4) << 8;
    let mut y2 = load(6);
    let mut y3 = load(2);
    let mut y4 = load(1);
    let mut y5 = load(7);
    let mut y6 = load(5);
    let mut y7 = load(3);

    let mut y8 = W7 * (y4 + y5) + 4;
    y4 = (y8 + W1MW7 * y4) >> 3;
    y5 = (y8 - W1PW7 * y5) >> 3;
    y8 = W3 * (y6 + y7) + 4;
    y6 = (y8 - W3MW5 * y6) >> 3;
    y7 = (y8 - W3PW5 * y7) >> 3;

    y8 = y0 + y1;
    y0 -= y1;
    y1 = W6 * (y3 + y2) + 4;
    y2 = (y1 - W2PW6 * y2) >> 3;
    y3 = (y1 + W2MW6 * y3) >> 3;
    y1 = y4 + y6;
    y4 -= y6;
    y6 = y5 + y7;
    y5 -= y7;

    y7 = y8 + y3;
    y8 -= y3;
    y3 = y0 + y2;
    y0 -= y2;
    y2 = (R2 * (y4 + y5) + 128) >> 8;
    y4 = (R2 * (y4 - y5) + 128) >> 8;

    block[at(0)] = ((y7 + y1) >> 14) as i32;
    block[at(1)] = ((y3 + y2) >> 14) as i32;
    block[at(2)] = ((y0 + y4) >> 14) as i32;
    block[at(3)] = ((y8 + y6) >> 14) as i32;
    block[at(4)] = ((y8 - y6) >> 14) as i32;
    block[at(5)] = ((y0 - y4) >> 14) as i32;
    block[at(6)] = ((y3 - y2) >> 14) as i32;
    block[at(7)] = ((y7 - y1) >> 14) as i32;
}

/// Horizontal pass only. Exposed so the intermediate values can be checked.
pub fn idct_rows(block: &mut [i32; BLOCK_SIZE]) {
    for row in block.chunks_exact_mut(BLOCK_DIM) {
        idct_row(row);
    }
}

/// In-place 2-D inverse DCT of dequantized coefficients in natural order.
/// The output samples are centered on zero.
pub fn idct2d(block: &mut [i32; BLOCK_SIZE]) {
    idct_rows(block);
    for x in 0..BLOCK_DIM {
        idct_column(block, x);
    }
}

/// Level-shifts samples by +128, clamps them to `[0, 255]` and writes them
/// as an 8x8 tile starting at `out[0]`, with rows `stride` bytes apart.
pub fn store_block(block: &[i32; BLOCK_SIZE], out: &mut [u8], stride: usize) {
    debug_assert!(out.len() >= (BLOCK_DIM - 1) * stride + BLOCK_DIM);
    for (row, samples) in block.chunks_exact(BLOCK_DIM).enumerate() {
        let dst = &mut out[row * stride..row * stride + BLOCK_DIM];
        for (d, &c) in dst.iter_mut().zip(samples) {
            *d = c.saturating_add(128).clamp(0, 255) as u8;
        }
    }
}
