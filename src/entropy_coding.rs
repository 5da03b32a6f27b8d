// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Huffman-coded entropy data, as specified in ITU-T T.81 Annex C and F.2.2.

pub mod decode;
pub mod huffman;
