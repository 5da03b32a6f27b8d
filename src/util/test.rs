// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Helpers for building synthetic JPEG streams in tests.

use std::collections::HashMap;

use crate::headers::marker::{DHT, DQT, DRI, EOI, SOI, SOS};

pub fn abs_delta(left: i32, right: i32) -> i32 {
    (left - right).abs()
}

macro_rules! assert_all_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        let (left_val, right_val, max_error) = (&$left, &$right, $max_error);
        assert_eq!(left_val.len(), right_val.len(), "length mismatch");
        for index in 0..left_val.len() {
            let delta = $crate::util::test::abs_delta(left_val[index] as i32, right_val[index] as i32);
            if delta > max_error {
                panic!(
                    "assertion failed: `(left ≈ right)`\n left[{}]: `{}`,\n right[{}]: `{}`,\n max_error: `{}`",
                    index, left_val[index], index, right_val[index], max_error
                );
            }
        }
    };
}
pub(crate) use assert_all_almost_eq;

/// MSB-first bit writer with JPEG byte stuffing.
#[derive(Default)]
pub struct BitWriter {
    data: Vec<u8>,
    acc: u64,
    nbits: u32,
}

impl BitWriter {
    pub fn write(&mut self, bits: u32, n: u32) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }
        self.acc = (self.acc << n) | (bits as u64 & ((1u64 << n) - 1));
        self.nbits += n;
        while self.nbits >= 8 {
            let byte = (self.acc >> (self.nbits - 8)) as u8;
            self.data.push(byte);
            if byte == 0xff {
                self.data.push(0x00);
            }
            self.nbits -= 8;
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write(bit as u32, 1);
    }

    /// Pads the last byte with 1 bits and returns the stuffed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.write((1 << pad) - 1, pad);
        }
        self.data
    }
}

/// Canonical Huffman code as an encoder sees it.
#[derive(Clone)]
pub struct TestHuffmanTable {
    pub counts: [u8; 16],
    pub symbols: Vec<u8>,
    codes: HashMap<u8, (u32, u32)>,
}

impl TestHuffmanTable {
    pub fn new(counts: [u8; 16], symbols: Vec<u8>) -> TestHuffmanTable {
        let mut codes = HashMap::new();
        let mut code = 0u32;
        let mut index = 0;
        for (len, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                codes.insert(symbols[index], (code, len as u32 + 1));
                code += 1;
                index += 1;
            }
            code <<= 1;
        }
        TestHuffmanTable {
            counts,
            symbols,
            codes,
        }
    }

    /// Table K.3, luminance DC differences.
    pub fn standard_dc() -> TestHuffmanTable {
        Self::new(
            [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
            (0..12).collect(),
        )
    }

    /// Every run/size symbol with size <= 10, each with an 8-bit code.
    pub fn flat_ac() -> TestHuffmanTable {
        let symbols: Vec<u8> = (0..16u8)
            .flat_map(|run| (0..=10u8).map(move |size| (run << 4) | size))
            .collect();
        let mut counts = [0; 16];
        counts[7] = symbols.len() as u8;
        Self::new(counts, symbols)
    }

    pub fn code(&self, symbol: u8) -> (u32, u32) {
        self.codes[&symbol]
    }
}

fn category(value: i32) -> u32 {
    32 - value.unsigned_abs().leading_zeros()
}

/// Entropy encoder for hand-built scans.
#[derive(Default)]
pub struct ScanWriter {
    bits: BitWriter,
}

impl ScanWriter {
    pub fn symbol(&mut self, table: &TestHuffmanTable, symbol: u8) -> &mut Self {
        let (code, len) = table.code(symbol);
        self.bits.write(code, len);
        self
    }

    fn value(&mut self, value: i32, size: u32) {
        let raw = if value < 0 { value - 1 } else { value };
        self.bits.write(raw as u32, size);
    }

    /// A DC difference: its category symbol followed by the value bits.
    pub fn dc(&mut self, table: &TestHuffmanTable, diff: i32) -> &mut Self {
        let size = category(diff);
        self.symbol(table, size as u8);
        self.value(diff, size);
        self
    }

    /// `run` zero coefficients followed by a nonzero `value`.
    pub fn ac(&mut self, table: &TestHuffmanTable, run: u8, value: i32) -> &mut Self {
        let size = category(value);
        assert!(run < 16 && size > 0);
        self.symbol(table, (run << 4) | size as u8);
        self.value(value, size);
        self
    }

    pub fn eob(&mut self, table: &TestHuffmanTable) -> &mut Self {
        self.symbol(table, 0x00)
    }

    /// An end-of-band run covering `run` blocks, this one included.
    pub fn eob_run(&mut self, table: &TestHuffmanTable, run: u16) -> &mut Self {
        assert!(run > 0);
        let r = 15 - run.leading_zeros();
        self.symbol(table, (r as u8) << 4);
        self.bits.write(run as u32 - (1 << r), r);
        self
    }

    pub fn bit(&mut self, bit: bool) -> &mut Self {
        self.bits.write_bit(bit);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.bits.finish()
    }
}

/// Frame component as (id, h, v, tq).
pub type TestComponent = (u8, u8, u8, u8);

/// Assembles marker segments into a JPEG byte stream.
pub struct JpegWriter {
    data: Vec<u8>,
}

impl JpegWriter {
    pub fn new() -> JpegWriter {
        JpegWriter {
            data: vec![0xff, SOI],
        }
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn marker(&mut self, marker: u8) -> &mut Self {
        self.raw(&[0xff, marker])
    }

    pub fn segment(&mut self, marker: u8, payload: &[u8]) -> &mut Self {
        let len = (payload.len() + 2) as u16;
        self.marker(marker);
        self.raw(&len.to_be_bytes());
        self.raw(payload)
    }

    pub fn jfif(&mut self) -> &mut Self {
        self.segment(
            0xe0,
            &[b'J', b'F', b'I', b'F', 0, 1, 2, 0, 0, 1, 0, 1, 0, 0],
        )
    }

    pub fn adobe(&mut self, transform: u8) -> &mut Self {
        self.segment(
            0xee,
            &[b'A', b'd', b'o', b'b', b'e', 0, 100, 0, 0, 0, 0, transform],
        )
    }

    /// An 8-bit quantization table given in zig-zag order.
    pub fn dqt(&mut self, id: u8, table: &[u8; 64]) -> &mut Self {
        let mut payload = vec![id];
        payload.extend_from_slice(table);
        self.segment(DQT, &payload)
    }

    /// A quantization table whose entries are all `value`.
    pub fn flat_dqt(&mut self, id: u8, value: u8) -> &mut Self {
        self.dqt(id, &[value; 64])
    }

    pub fn dht(&mut self, class: u8, id: u8, table: &TestHuffmanTable) -> &mut Self {
        let mut payload = vec![(class << 4) | id];
        payload.extend_from_slice(&table.counts);
        payload.extend_from_slice(&table.symbols);
        self.segment(DHT, &payload)
    }

    pub fn sof(
        &mut self,
        marker: u8,
        width: u16,
        height: u16,
        components: &[TestComponent],
    ) -> &mut Self {
        let mut payload = vec![8];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components.len() as u8);
        for &(id, h, v, tq) in components {
            payload.extend_from_slice(&[id, (h << 4) | v, tq]);
        }
        self.segment(marker, &payload)
    }

    pub fn dri(&mut self, interval: u16) -> &mut Self {
        self.segment(DRI, &interval.to_be_bytes())
    }

    /// A scan header for (component id, DC table, AC table) selectors, then
    /// the entropy-coded data.
    pub fn sos(
        &mut self,
        components: &[(u8, u8, u8)],
        (ss, se, ah, al): (u8, u8, u8, u8),
        data: &[u8],
    ) -> &mut Self {
        let mut payload = vec![components.len() as u8];
        for &(id, td, ta) in components {
            payload.extend_from_slice(&[id, (td << 4) | ta]);
        }
        payload.extend_from_slice(&[ss, se, (ah << 4) | al]);
        self.segment(SOS, &payload);
        self.raw(data)
    }

    pub fn baseline_scan(&mut self, components: &[(u8, u8, u8)], data: &[u8]) -> &mut Self {
        self.sos(components, (0, 63, 0, 0), data)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        self.marker(EOI);
        std::mem::take(&mut self.data)
    }
}

/// Entropy data for `n` blocks with the given DC differences and no AC
/// coefficients.
pub fn dc_only_blocks(
    dc: &TestHuffmanTable,
    ac: &TestHuffmanTable,
    diffs: impl IntoIterator<Item = i32>,
) -> Vec<u8> {
    let mut scan = ScanWriter::default();
    for diff in diffs {
        scan.dc(dc, diff).eob(ac);
    }
    scan.finish()
}
