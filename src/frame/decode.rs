// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};
use crate::frame::block::{decode_block, refine_block, ScanState};
use crate::frame::quantizer::dequantize;
use crate::frame::{Block, FrameState};
use crate::headers::marker::{RST0, RST7};
use crate::headers::{FrameHeader, ScanComponent, ScanHeader, AC_CLASS, DC_CLASS};
use crate::util::tracing_wrappers::*;
use crate::var_dct::idct::{idct2d, store_block};
use crate::{BLOCK_DIM, BLOCK_SIZE};

/// Counts MCUs and checks the restart marker due after every
/// `interval` of them.
struct RestartTracker {
    interval: usize,
    total: usize,
    mcu: usize,
    expected: u8,
}

impl RestartTracker {
    fn new(interval: u16, total: usize) -> Self {
        RestartTracker {
            interval: interval as usize,
            total,
            mcu: 0,
            expected: RST0,
        }
    }

    /// Called after each MCU. No marker follows the last MCU of a scan.
    fn end_mcu<R: Read>(&mut self, br: &mut BitReader<R>, state: &mut ScanState) -> Result<()> {
        self.mcu += 1;
        if self.interval == 0 || self.mcu % self.interval != 0 || self.mcu >= self.total {
            return Ok(());
        }
        let mut marker = [0u8; 2];
        br.read_full(&mut marker)?;
        if marker != [0xff, self.expected] {
            return Err(Error::BadRestartMarker(marker[0], marker[1], self.expected));
        }
        debug!(mcu = self.mcu, marker = self.expected, "restart");
        self.expected = if self.expected == RST7 {
            RST0
        } else {
            self.expected + 1
        };
        br.reset_bits();
        state.reset();
        Ok(())
    }
}

impl FrameState {
    /// Decodes the entropy-coded segment following a scan header, updating
    /// the sample planes and, for progressive frames, the stored
    /// coefficients.
    #[instrument(level = "debug", skip_all, err)]
    pub fn decode_scan<R: Read>(&mut self, br: &mut BitReader<R>, scan: &ScanHeader) -> Result<()> {
        let header = self.header.clone().ok_or(Error::MissingSof)?;
        self.ensure_planes(&header)?;
        if header.progressive {
            for sc in scan.components.iter() {
                self.ensure_coefficients(&header, sc.index)?;
            }
        }

        br.reset_bits();
        let mut state = ScanState::default();

        if let [sc] = scan.components[..] {
            // Non-interleaved: one block per MCU, over the component's own
            // block grid.
            let (xblocks, yblocks) = component_blocks(&header, sc.index);
            let mut restarts = RestartTracker::new(self.restart_interval, xblocks * yblocks);
            for by in 0..yblocks {
                for bx in 0..xblocks {
                    trace!(bx, by, "MCU");
                    self.process_block(br, &header, scan, &sc, bx, by, &mut state)?;
                    restarts.end_mcu(br, &mut state)?;
                }
            }
            return Ok(());
        }

        let (mcu_cols, mcu_rows) = header.mcu_grid();
        let mut restarts = RestartTracker::new(self.restart_interval, mcu_cols * mcu_rows);
        for my in 0..mcu_rows {
            for mx in 0..mcu_cols {
                trace!(mx, my, "MCU");
                for sc in scan.components.iter() {
                    let c = &header.components[sc.index];
                    // The h x v blocks of the component in raster order.
                    for j in 0..c.h * c.v {
                        let bx = c.h * mx + j % c.h;
                        let by = c.v * my + j / c.h;
                        self.process_block(br, &header, scan, sc, bx, by, &mut state)?;
                    }
                }
                restarts.end_mcu(br, &mut state)?;
            }
        }
        Ok(())
    }

    /// Decodes block (`bx`, `by`) of a scan component. The block is
    /// reconstructed into its plane unless later progressive scans still
    /// have to refine it.
    fn process_block<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        header: &FrameHeader,
        scan: &ScanHeader,
        sc: &ScanComponent,
        bx: usize,
        by: usize,
        state: &mut ScanState,
    ) -> Result<()> {
        let c = &header.components[sc.index];
        let ac_table = &self.huffman_tables[AC_CLASS][sc.ac_table];
        let dc_table = &self.huffman_tables[DC_CLASS][sc.dc_table];

        let stored = if header.progressive {
            let (mcu_cols, _) = header.mcu_grid();
            Some(by * mcu_cols * c.h + bx)
        } else {
            None
        };
        let mut block: Block = match stored {
            Some(i) => self.coefficients[sc.index][i],
            None => [0; BLOCK_SIZE],
        };

        if scan.ah != 0 {
            refine_block(br, scan, &mut block, ac_table, state)?;
        } else {
            decode_block(br, scan, &mut block, dc_table, ac_table, sc.index, state)?;
        }

        if let Some(i) = stored {
            self.coefficients[sc.index][i] = block;
            if !scan.is_final_pass() {
                return Ok(());
            }
        }

        dequantize(&mut block, &self.quant_tables[c.tq as usize]);
        idct2d(&mut block);
        let plane = &mut self.planes[sc.index];
        let stride = plane.stride();
        store_block(&block, plane.block_mut(bx, by), stride);
        Ok(())
    }
}

/// Number of blocks horizontally and vertically that hold samples of
/// component `index` (T.81 A.1.1). Blocks past these, up to the MCU
/// boundary, are only coded in interleaved scans.
fn component_blocks(header: &FrameHeader, index: usize) -> (usize, usize) {
    let h_max = header.components.iter().map(|c| c.h).max().unwrap_or(1);
    let v_max = header.components.iter().map(|c| c.v).max().unwrap_or(1);
    let c = &header.components[index];
    let xsize = (header.width * c.h).div_ceil(h_max);
    let ysize = (header.height * c.v).div_ceil(v_max);
    (xsize.div_ceil(BLOCK_DIM), ysize.div_ceil(BLOCK_DIM))
}
