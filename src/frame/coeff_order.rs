// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::BLOCK_SIZE;

/// Maps a zig-zag index to the natural (row-major) index of the same
/// coefficient (T.81 Figure A.6).
pub const UNZIG: [usize; BLOCK_SIZE] = [
    0, 1, 8, 16, 9, 2, 3, 10, //
    17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, //
    27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, //
    29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, //
    53, 60, 61, 54, 47, 55, 62, 63, //
];

/// Inverse of [`UNZIG`]: natural index to zig-zag index.
pub const ZIG: [usize; BLOCK_SIZE] = invert(&UNZIG);

const fn invert(order: &[usize; BLOCK_SIZE]) -> [usize; BLOCK_SIZE] {
    let mut inverse = [0; BLOCK_SIZE];
    let mut i = 0;
    while i < BLOCK_SIZE {
        inverse[order[i]] = i;
        i += 1;
    }
    inverse
}
