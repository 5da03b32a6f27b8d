// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::{BLOCK_DIM, BLOCK_SIZE};

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Direct evaluation of T.81 A.3.3, without rounding.
pub fn idct2d(coeffs: &[i32; BLOCK_SIZE]) -> [f64; BLOCK_SIZE] {
    let mut basis = [[0.0f64; BLOCK_DIM]; BLOCK_DIM];
    for (u, row) in basis.iter_mut().enumerate() {
        for (x, b) in row.iter_mut().enumerate() {
            *b = alpha(u) * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos();
        }
    }
    let mut out = [0.0; BLOCK_SIZE];
    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            let mut sum = 0.0;
            for v in 0..BLOCK_DIM {
                for u in 0..BLOCK_DIM {
                    sum += basis[u][x] * basis[v][y] * coeffs[v * BLOCK_DIM + u] as f64;
                }
            }
            out[y * BLOCK_DIM + x] = sum / 4.0;
        }
    }
    out
}
