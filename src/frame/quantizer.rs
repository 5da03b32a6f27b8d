// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::frame::Block;
use crate::headers::QuantTable;

/// Scales each coefficient by its quantization step. Both are in natural
/// order.
#[inline]
pub fn dequantize(block: &mut Block, table: &QuantTable) {
    for (c, &q) in block.iter_mut().zip(table.iter()) {
        *c = c.wrapping_mul(q);
    }
}
