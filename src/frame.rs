// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use array_init::array_init;

use crate::entropy_coding::huffman::HuffmanTable;
use crate::error::Result;
use crate::headers::{FrameHeader, HuffmanTables, QuantTable, NUM_QUANT_TABLES};
use crate::image::Plane;
use crate::util::tracing_wrappers::*;
use crate::util::try_filled_vec;
use crate::{BLOCK_DIM, BLOCK_SIZE};

pub mod block;
pub mod coeff_order;
pub mod decode;
pub mod quantizer;

/// 64 DCT coefficients in natural order.
pub type Block = [i32; BLOCK_SIZE];

/// Everything the segments read so far have established about the frame.
#[derive(Debug)]
pub struct FrameState {
    pub quant_tables: [QuantTable; NUM_QUANT_TABLES],
    pub huffman_tables: HuffmanTables,
    /// MCUs between restart markers, or 0 when restart markers are off.
    pub restart_interval: u16,
    /// Set by SOF0, which allows only two Huffman tables per class.
    pub baseline: bool,
    pub jfif: bool,
    /// Raw transform byte of an Adobe APP14 segment.
    pub adobe_transform: Option<u8>,
    pub header: Option<FrameHeader>,
    /// One plane per component, allocated by the first scan.
    pub planes: Vec<Plane>,
    /// Per component, coefficients carried between progressive scans.
    /// Allocated by the first scan that names the component.
    coefficients: Vec<Vec<Block>>,
}

impl Default for FrameState {
    fn default() -> Self {
        FrameState {
            quant_tables: [[0; BLOCK_SIZE]; NUM_QUANT_TABLES],
            huffman_tables: array_init(|_| array_init(|_| HuffmanTable::default())),
            restart_interval: 0,
            baseline: false,
            jfif: false,
            adobe_transform: None,
            header: None,
            planes: Vec::new(),
            coefficients: Vec::new(),
        }
    }
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the sample planes on first use. Each component's plane
    /// covers whole MCUs.
    fn ensure_planes(&mut self, header: &FrameHeader) -> Result<()> {
        if !self.planes.is_empty() {
            return Ok(());
        }
        let (mcu_cols, mcu_rows) = header.mcu_grid();
        for c in header.components.iter() {
            let size = (BLOCK_DIM * c.h * mcu_cols, BLOCK_DIM * c.v * mcu_rows);
            self.planes.push(Plane::new(size)?);
        }
        debug!(num_planes = self.planes.len(), "allocated planes");
        Ok(())
    }

    /// Allocates the progressive coefficient buffer of component `index`
    /// on first use.
    fn ensure_coefficients(&mut self, header: &FrameHeader, index: usize) -> Result<()> {
        if self.coefficients.len() < header.num_components() {
            self.coefficients.resize_with(header.num_components(), Vec::new);
        }
        if self.coefficients[index].is_empty() {
            let (mcu_cols, mcu_rows) = header.mcu_grid();
            let c = &header.components[index];
            let num_blocks = mcu_cols * mcu_rows * c.h * c.v;
            self.coefficients[index] = try_filled_vec(num_blocks, [0; BLOCK_SIZE])?;
            debug!(index, num_blocks, "allocated coefficients");
        }
        Ok(())
    }
}
