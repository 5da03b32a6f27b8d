// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

pub const MAX_COMPONENTS: usize = 4;
pub const MAX_TQ: u8 = 3;

/// Frame component specification (T.81 B.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Component {
    /// Horizontal sampling factor.
    pub h: usize,
    /// Vertical sampling factor.
    pub v: usize,
    /// Component identifier.
    pub id: u8,
    /// Quantization table destination selector.
    pub tq: u8,
}

/// Frame header as read from SOF0, SOF1 or SOF2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub progressive: bool,
    pub width: usize,
    pub height: usize,
    pub components: Vec<Component>,
}

impl FrameHeader {
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Number of MCUs horizontally and vertically, from the luma sampling
    /// factors.
    pub fn mcu_grid(&self) -> (usize, usize) {
        let h0 = self.components[0].h;
        let v0 = self.components[0].v;
        (self.width.div_ceil(8 * h0), self.height.div_ceil(8 * v0))
    }

    #[instrument(level = "debug", skip(br), err)]
    pub fn read<R: Read>(br: &mut BitReader<R>, n: usize, progressive: bool) -> Result<Self> {
        let num_components = match n {
            9 => 1,
            15 => 3,
            18 => 4,
            _ => return Err(Error::UnsupportedComponentCount),
        };
        let mut buf = [0u8; 6 + 3 * MAX_COMPONENTS];
        let buf = &mut buf[..n];
        br.read_full(buf)?;
        if buf[0] != 8 {
            return Err(Error::UnsupportedPrecision(buf[0]));
        }
        let height = BigEndian::read_u16(&buf[1..3]) as usize;
        let width = BigEndian::read_u16(&buf[3..5]) as usize;
        if buf[5] as usize != num_components {
            return Err(Error::SofWrongLength);
        }

        let mut components: Vec<Component> = Vec::with_capacity(num_components);
        for i in 0..num_components {
            let params = &buf[6 + 3 * i..9 + 3 * i];
            let id = params[0];
            if components.iter().any(|c| c.id == id) {
                return Err(Error::RepeatedComponentId(id));
            }
            let tq = params[2];
            if tq > MAX_TQ {
                return Err(Error::BadTq(tq));
            }
            let hv = params[1];
            let (h, v) = ((hv >> 4) as usize, (hv & 0x0f) as usize);
            if !(1..=4).contains(&h) || !(1..=4).contains(&v) {
                return Err(Error::BadSamplingFactors(h as u8, v as u8));
            }
            if h == 3 || v == 3 {
                return Err(Error::UnsupportedSubsampling);
            }
            let (h, v) = match num_components {
                // A single component is non-interleaved by definition (T.81
                // A.2), so its MCU is one block whatever factors it declares.
                1 => (1, 1),
                3 => {
                    let supported = match i {
                        // Luma (h, v) must be one of (1, 1), (1, 2), (2, 1),
                        // (2, 2), (4, 1) or (4, 2).
                        0 => v != 4,
                        1 => components[0].h % h == 0 && components[0].v % v == 0,
                        _ => components[1].h == h && components[1].v == v,
                    };
                    if !supported {
                        return Err(Error::UnsupportedSubsampling);
                    }
                    (h, v)
                }
                _ => {
                    // Only [0x11 0x11 0x11 0x11] and [0x22 0x11 0x11 0x22]
                    // are in use for CMYK and YCbCrK.
                    let supported = match i {
                        0 => hv == 0x11 || hv == 0x22,
                        1 | 2 => hv == 0x11,
                        _ => components[0].h == h && components[0].v == v,
                    };
                    if !supported {
                        return Err(Error::UnsupportedSubsampling);
                    }
                    (h, v)
                }
            };
            components.push(Component { h, v, id, tq });
        }

        let header = FrameHeader {
            progressive,
            width,
            height,
            components,
        };
        debug!(?header);
        Ok(header)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn sof_payload(components: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut payload = vec![8, 0, 17, 0, 33, components.len() as u8];
        for &(id, hv, tq) in components {
            payload.extend_from_slice(&[id, hv, tq]);
        }
        payload
    }

    fn read(payload: &[u8]) -> Result<FrameHeader> {
        let mut br = BitReader::new(payload);
        FrameHeader::read(&mut br, payload.len(), false)
    }

    #[test]
    fn ycbcr_420() -> Result<()> {
        let header = read(&sof_payload(&[(1, 0x22, 0), (2, 0x11, 1), (3, 0x11, 1)]))?;
        assert_eq!((header.width, header.height), (33, 17));
        assert_eq!(header.components[0], Component { h: 2, v: 2, id: 1, tq: 0 });
        assert_eq!(header.components[2].tq, 1);
        assert_eq!(header.mcu_grid(), (3, 2));
        Ok(())
    }

    #[test]
    fn grayscale_sampling_is_forced_to_one() -> Result<()> {
        let header = read(&sof_payload(&[(1, 0x21, 0)]))?;
        assert_eq!((header.components[0].h, header.components[0].v), (1, 1));
        assert_eq!(header.mcu_grid(), (5, 3));
        Ok(())
    }

    #[test]
    fn two_components_are_unsupported() {
        let err = read(&sof_payload(&[(1, 0x11, 0), (2, 0x11, 0)])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedComponentCount));
    }

    #[test]
    fn count_byte_must_match_length() {
        let mut payload = sof_payload(&[(1, 0x11, 0), (2, 0x11, 0), (3, 0x11, 0)]);
        payload[5] = 1;
        assert!(matches!(read(&payload), Err(Error::SofWrongLength)));
    }

    #[test]
    fn twelve_bit_precision() {
        let mut payload = sof_payload(&[(1, 0x11, 0)]);
        payload[0] = 12;
        assert!(matches!(read(&payload), Err(Error::UnsupportedPrecision(12))));
    }

    #[test]
    fn rejected_sampling_factors() {
        for components in [
            [(1, 0x33, 0), (2, 0x11, 0), (3, 0x11, 0)],
            [(1, 0x14, 0), (2, 0x11, 0), (3, 0x11, 0)],
            [(1, 0x21, 0), (2, 0x12, 0), (3, 0x12, 0)],
            [(1, 0x22, 0), (2, 0x11, 0), (3, 0x21, 0)],
        ] {
            assert!(matches!(
                read(&sof_payload(&components)),
                Err(Error::UnsupportedSubsampling)
            ));
        }
        assert!(matches!(
            read(&sof_payload(&[(1, 0x05, 0)])),
            Err(Error::BadSamplingFactors(0, 5))
        ));
    }

    #[test]
    fn four_component_patterns() -> Result<()> {
        read(&sof_payload(&[(1, 0x22, 0), (2, 0x11, 0), (3, 0x11, 0), (4, 0x22, 0)]))?;
        read(&sof_payload(&[(1, 0x11, 0), (2, 0x11, 0), (3, 0x11, 0), (4, 0x11, 0)]))?;
        assert!(matches!(
            read(&sof_payload(&[(1, 0x21, 0), (2, 0x11, 0), (3, 0x11, 0), (4, 0x21, 0)])),
            Err(Error::UnsupportedSubsampling)
        ));
        assert!(matches!(
            read(&sof_payload(&[(1, 0x22, 0), (2, 0x11, 0), (3, 0x11, 0), (4, 0x11, 0)])),
            Err(Error::UnsupportedSubsampling)
        ));
        Ok(())
    }

    #[test]
    fn component_ids_are_unique() {
        assert!(matches!(
            read(&sof_payload(&[(7, 0x11, 0), (8, 0x11, 0), (7, 0x11, 0)])),
            Err(Error::RepeatedComponentId(7))
        ));
    }

    #[test]
    fn quant_selector_bound() {
        assert!(matches!(
            read(&sof_payload(&[(1, 0x11, 4)])),
            Err(Error::BadTq(4))
        ));
    }
}
