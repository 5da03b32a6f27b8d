// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Marker segment parsers (ITU-T T.81 Annex B).
//!
//! Every parser receives the payload length `n`, i.e. the segment length
//! field minus the two bytes of the field itself, and must consume exactly
//! `n` bytes on success.

pub mod app;
pub mod frame_header;
pub mod marker;
pub mod scan_header;
pub mod tables;

pub use app::*;
pub use frame_header::*;
pub use marker::Marker;
pub use scan_header::*;
pub use tables::*;
