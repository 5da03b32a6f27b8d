// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};
use crate::headers::frame_header::{FrameHeader, MAX_COMPONENTS};
use crate::headers::tables::NUM_HUFFMAN_TABLES;
use crate::util::tracing_wrappers::*;
use crate::BLOCK_SIZE;

/// Upper bound on the summed sampling factors of an interleaved scan
/// (T.81 B.2.3).
const MAX_BLOCKS_PER_MCU: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    /// Index into the frame's component list.
    pub index: usize,
    pub dc_table: usize,
    pub ac_table: usize,
}

/// Scan header as read from SOS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    /// Spectral selection start, as a zig-zag index.
    pub ss: u8,
    /// Spectral selection end, inclusive.
    pub se: u8,
    /// Successive approximation bit position high.
    pub ah: u8,
    /// Successive approximation bit position low.
    pub al: u8,
}

impl ScanHeader {
    /// Whether this is the last pass touching the coefficients it covers, so
    /// that blocks can be reconstructed afterwards.
    pub fn is_final_pass(&self) -> bool {
        self.se as usize == BLOCK_SIZE - 1 && self.al == 0
    }

    #[instrument(level = "debug", skip(br, frame), err)]
    pub fn read<R: Read>(
        br: &mut BitReader<R>,
        n: usize,
        frame: &FrameHeader,
        baseline: bool,
    ) -> Result<Self> {
        let frame_components = frame.num_components();
        if n < 6 || n > 4 + 2 * frame_components || n % 2 != 0 {
            return Err(Error::SosWrongLength);
        }
        let mut buf = [0u8; 4 + 2 * MAX_COMPONENTS];
        let buf = &mut buf[..n];
        br.read_full(buf)?;
        let num_components = buf[0] as usize;
        if n != 4 + 2 * num_components {
            return Err(Error::SosComponentCountMismatch);
        }

        let max_table = if baseline { 1 } else { NUM_HUFFMAN_TABLES as u8 - 1 };
        let mut components: Vec<ScanComponent> = Vec::with_capacity(num_components);
        let mut total_hv = 0;
        for params in buf[1..1 + 2 * num_components].chunks_exact(2) {
            let selector = params[0];
            let index = frame
                .components
                .iter()
                .position(|c| c.id == selector)
                .ok_or(Error::UnknownComponentSelector(selector))?;
            if components.iter().any(|c| c.index == index) {
                return Err(Error::RepeatedComponentSelector(selector));
            }
            let component = &frame.components[index];
            total_hv += component.h * component.v;
            let (td, ta) = (params[1] >> 4, params[1] & 0x0f);
            if td > max_table {
                return Err(Error::BadTd(td));
            }
            if ta > max_table {
                return Err(Error::BadTa(ta));
            }
            components.push(ScanComponent {
                index,
                dc_table: td as usize,
                ac_table: ta as usize,
            });
        }
        if frame_components > 1 && total_hv > MAX_BLOCKS_PER_MCU {
            return Err(Error::TotalSamplingFactorsTooLarge(total_hv));
        }

        let mut header = ScanHeader {
            components,
            ss: 0,
            se: BLOCK_SIZE as u8 - 1,
            ah: 0,
            al: 0,
        };
        if frame.progressive {
            let tail = &buf[1 + 2 * num_components..];
            let (ss, se) = (tail[0], tail[1]);
            let (ah, al) = (tail[2] >> 4, tail[2] & 0x0f);
            if (ss == 0 && se != 0) || ss > se || se as usize >= BLOCK_SIZE {
                return Err(Error::BadSpectralSelection(ss, se));
            }
            if ss != 0 && num_components != 1 {
                return Err(Error::InterleavedAcScan);
            }
            if ah != 0 && ah != al + 1 {
                return Err(Error::BadSuccessiveApproximation(ah, al));
            }
            header.ss = ss;
            header.se = se;
            header.ah = ah;
            header.al = al;
        }
        debug!(?header);
        Ok(header)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::headers::frame_header::Component;

    fn frame(progressive: bool, sampling: &[(usize, usize)]) -> FrameHeader {
        FrameHeader {
            progressive,
            width: 16,
            height: 16,
            components: sampling
                .iter()
                .enumerate()
                .map(|(i, &(h, v))| Component {
                    h,
                    v,
                    id: i as u8 + 1,
                    tq: 0,
                })
                .collect(),
        }
    }

    fn sos_payload(components: &[(u8, u8)], tail: [u8; 3]) -> Vec<u8> {
        let mut payload = vec![components.len() as u8];
        for &(id, tables) in components {
            payload.extend_from_slice(&[id, tables]);
        }
        payload.extend_from_slice(&tail);
        payload
    }

    fn read(payload: &[u8], frame: &FrameHeader, baseline: bool) -> Result<ScanHeader> {
        let mut br = BitReader::new(payload);
        ScanHeader::read(&mut br, payload.len(), frame, baseline)
    }

    #[test]
    fn baseline_ignores_spectral_fields() -> Result<()> {
        let frame = frame(false, &[(2, 2), (1, 1), (1, 1)]);
        let payload = sos_payload(&[(1, 0x00), (2, 0x11), (3, 0x11)], [5, 9, 0x21]);
        let header = read(&payload, &frame, true)?;
        assert_eq!((header.ss, header.se, header.ah, header.al), (0, 63, 0, 0));
        assert_eq!(
            header.components[1],
            ScanComponent {
                index: 1,
                dc_table: 1,
                ac_table: 1
            }
        );
        assert!(header.is_final_pass());
        Ok(())
    }

    #[test]
    fn progressive_refinement() -> Result<()> {
        let frame = frame(true, &[(1, 1), (1, 1), (1, 1)]);
        let header = read(&sos_payload(&[(2, 0x03)], [1, 5, 0x21]), &frame, false)?;
        assert_eq!(header.components[0].index, 1);
        assert_eq!(header.components[0].ac_table, 3);
        assert_eq!((header.ss, header.se, header.ah, header.al), (1, 5, 2, 1));
        assert!(!header.is_final_pass());
        Ok(())
    }

    #[test]
    fn bad_successive_approximation() {
        let frame = frame(true, &[(1, 1)]);
        let err = read(&sos_payload(&[(1, 0x00)], [0, 0, 0x20]), &frame, false).unwrap_err();
        assert!(matches!(err, Error::BadSuccessiveApproximation(2, 0)));
        assert!(err.to_string().contains("bad successive approximation"));
    }

    #[test]
    fn bad_spectral_selection() {
        let frame = frame(true, &[(1, 1), (1, 1), (1, 1)]);
        for (ss, se) in [(0, 5), (6, 5), (1, 64)] {
            assert!(matches!(
                read(&sos_payload(&[(1, 0x00)], [ss, se, 0]), &frame, false),
                Err(Error::BadSpectralSelection(..))
            ));
        }
        assert!(matches!(
            read(&sos_payload(&[(1, 0x00), (2, 0x00)], [1, 5, 0]), &frame, false),
            Err(Error::InterleavedAcScan)
        ));
    }

    #[test]
    fn selector_validation() {
        let frame = frame(false, &[(1, 1), (1, 1), (1, 1)]);
        assert!(matches!(
            read(&sos_payload(&[(9, 0x00)], [0, 63, 0]), &frame, true),
            Err(Error::UnknownComponentSelector(9))
        ));
        assert!(matches!(
            read(&sos_payload(&[(1, 0x00), (1, 0x00)], [0, 63, 0]), &frame, true),
            Err(Error::RepeatedComponentSelector(1))
        ));
        assert!(matches!(
            read(&sos_payload(&[(1, 0x20)], [0, 63, 0]), &frame, true),
            Err(Error::BadTd(2))
        ));
        assert!(matches!(
            read(&sos_payload(&[(1, 0x04)], [0, 63, 0]), &frame, false),
            Err(Error::BadTa(4))
        ));
    }

    #[test]
    fn length_validation() {
        let frame = frame(false, &[(1, 1)]);
        // Two selectors do not fit a one-component frame.
        assert!(matches!(
            read(&sos_payload(&[(1, 0x00), (2, 0x00)], [0, 63, 0]), &frame, true),
            Err(Error::SosWrongLength)
        ));
        let frame = self::frame(false, &[(1, 1), (1, 1), (1, 1)]);
        let mut payload = sos_payload(&[(1, 0x00), (2, 0x00)], [0, 63, 0]);
        payload[0] = 1;
        assert!(matches!(
            read(&payload, &frame, true),
            Err(Error::SosComponentCountMismatch)
        ));
    }

    #[test]
    fn too_many_blocks_per_mcu() {
        let frame = frame(false, &[(4, 2), (2, 1), (2, 1)]);
        assert!(matches!(
            read(&sos_payload(&[(1, 0x00), (2, 0x00), (3, 0x00)], [0, 63, 0]), &frame, true),
            Err(Error::TotalSamplingFactorsTooLarge(12))
        ));
    }
}
