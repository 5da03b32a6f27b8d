// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;
use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

const LOOKAHEAD_SIZE: usize = 4096;

/// Buffered view of the input that can give back the last one or two bytes
/// taken from it.
///
/// Entropy decoding peeks 8 bits ahead, so it can overshoot the end of the
/// entropy-coded segment by one byte, or by two when the overshoot lands on a
/// `0xff 0x00` stuffed pair. The buffer therefore always keeps the two most
/// recently consumed bytes around.
///
/// State changes only through the consume family (`consume_raw`,
/// `consume_stuffed`, `consume_into`, `consume_skip`) and `rewind`.
struct Lookahead<R> {
    reader: R,
    buf: Box<[u8; LOOKAHEAD_SIZE]>,
    // buf[pos..end] are buffered but not yet consumed.
    pos: usize,
    end: usize,
    // Number of bytes `rewind` gives back: 0, 1 or 2.
    rewindable: usize,
}

impl<R: Read> Lookahead<R> {
    fn new(reader: R) -> Self {
        Lookahead {
            reader,
            buf: Box::new([0; LOOKAHEAD_SIZE]),
            pos: 0,
            end: 0,
            rewindable: 0,
        }
    }

    /// Refills the buffer. Returns false at end of stream.
    fn fill(&mut self) -> Result<bool> {
        debug_assert_eq!(self.pos, self.end, "fill called when unread bytes exist");
        if self.end > 2 {
            self.buf.copy_within(self.end - 2..self.end, 0);
            self.pos = 2;
            self.end = 2;
        }
        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.end += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next(&mut self) -> Result<Option<u8>> {
        while self.pos == self.end {
            if !self.fill()? {
                return Ok(None);
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Takes the next byte, ignoring byte stuffing.
    fn consume_raw(&mut self) -> Result<Option<u8>> {
        let byte = self.next()?;
        if byte.is_some() {
            self.rewindable = 0;
        }
        Ok(byte)
    }

    /// Takes the next entropy-coded byte, folding a `0xff 0x00` pair into
    /// `0xff`.
    fn consume_stuffed(&mut self) -> Result<u8> {
        if self.pos + 2 <= self.end {
            let byte = self.buf[self.pos];
            self.pos += 1;
            self.rewindable = 1;
            if byte != 0xff {
                return Ok(byte);
            }
            if self.buf[self.pos] != 0x00 {
                return Err(Error::MissingFF00);
            }
            self.pos += 1;
            self.rewindable = 2;
            return Ok(0xff);
        }

        self.rewindable = 0;
        let byte = self.next()?.ok_or(Error::ShortHuffmanData)?;
        self.rewindable = 1;
        if byte != 0xff {
            return Ok(byte);
        }
        let stuffing = self.next()?.ok_or(Error::ShortHuffmanData)?;
        self.rewindable = 2;
        if stuffing != 0x00 {
            return Err(Error::MissingFF00);
        }
        Ok(0xff)
    }

    fn consume_into(&mut self, mut out: &mut [u8]) -> Result<()> {
        self.rewindable = 0;
        loop {
            let n = out.len().min(self.end - self.pos);
            out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            out = &mut out[n..];
            if out.is_empty() {
                return Ok(());
            }
            if !self.fill()? {
                return Err(Error::UnexpectedEof);
            }
        }
    }

    fn consume_skip(&mut self, mut n: usize) -> Result<()> {
        self.rewindable = 0;
        loop {
            let m = n.min(self.end - self.pos);
            self.pos += m;
            n -= m;
            if n == 0 {
                return Ok(());
            }
            if !self.fill()? {
                return Err(Error::UnexpectedEof);
            }
        }
    }

    /// Gives back the bytes taken by the most recent stuffed consume.
    fn rewind(&mut self) {
        self.pos -= self.rewindable;
        self.rewindable = 0;
    }
}

/// Reads JPEG segments and MSB-first entropy-coded bits from a byte source.
///
/// The `nbits` least significant bits of `acc` are the unread bits, consumed
/// from the most significant end. `mask` is `1 << (nbits - 1)`, or 0 when no
/// bits are buffered.
pub struct BitReader<R> {
    bytes: Lookahead<R>,
    acc: u32,
    mask: u32,
    nbits: u32,
}

impl<R> Debug for BitReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ buffered: [{} bytes], acc: {:0width$b}, rewindable: {} }}",
            self.bytes.end - self.bytes.pos,
            self.acc & self.mask.wrapping_shl(1).wrapping_sub(1),
            self.bytes.rewindable,
            width = self.nbits as usize
        )
    }
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> BitReader<R> {
        BitReader {
            bytes: Lookahead::new(reader),
            acc: 0,
            mask: 0,
            nbits: 0,
        }
    }

    /// Gives a byte over-read by the entropy decoder back to the byte stream,
    /// dropping its bits from the accumulator if they are still unread.
    fn unread_stuffed_byte(&mut self) {
        self.bytes.rewind();
        if self.nbits >= 8 {
            self.acc >>= 8;
            self.nbits -= 8;
            self.mask >>= 8;
        }
    }

    /// Undoes any entropy decoder overshoot before reading segment bytes.
    fn settle(&mut self) {
        if self.bytes.rewindable != 0 && self.nbits >= 8 {
            self.unread_stuffed_byte();
        }
    }

    /// Reads a single byte, ignoring byte stuffing.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.bytes.consume_raw()?.ok_or(Error::UnexpectedEof)
    }

    /// Fills `buf` completely, ignoring byte stuffing.
    pub fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        self.settle();
        self.bytes.consume_into(buf)
    }

    /// Reads a big-endian 16-bit value.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_full(&mut buf)?;
        Ok(BigEndian::read_u16(&buf))
    }

    /// Skips `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.settle();
        self.bytes.consume_skip(n)
    }

    /// Discards all buffered bits, e.g. at the start of a scan or after a
    /// restart marker.
    pub fn reset_bits(&mut self) {
        self.acc = 0;
        self.mask = 0;
        self.nbits = 0;
    }

    pub fn bits_available(&self) -> u32 {
        self.nbits
    }

    /// Pulls entropy-coded bytes into the accumulator until at least `n` bits
    /// are buffered. Callers check `bits_available() < n` first.
    pub fn ensure_bits(&mut self, n: u32) -> Result<()> {
        debug_assert!(n <= 16);
        loop {
            let byte = self.bytes.consume_stuffed()?;
            self.acc = (self.acc << 8) | byte as u32;
            self.nbits += 8;
            self.mask = if self.mask == 0 { 1 << 7 } else { self.mask << 8 };
            if self.nbits >= n {
                return Ok(());
            }
        }
    }

    /// Like `ensure_bits`, but when the entropy-coded segment ends first,
    /// gives back any over-read byte and returns `Ok(false)`.
    pub fn try_ensure_bits(&mut self, n: u32) -> Result<bool> {
        match self.ensure_bits(n) {
            Ok(()) => Ok(true),
            Err(Error::MissingFF00 | Error::ShortHuffmanData) => {
                if self.bytes.rewindable != 0 {
                    self.unread_stuffed_byte();
                }
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the next 8 buffered bits without consuming them.
    pub fn peek8(&self) -> usize {
        debug_assert!(self.nbits >= 8);
        ((self.acc >> (self.nbits - 8)) & 0xff) as usize
    }

    /// Drops `n` buffered bits.
    pub fn consume_bits(&mut self, n: u32) {
        debug_assert!(n <= self.nbits);
        self.nbits -= n;
        self.mask >>= n;
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.nbits == 0 {
            self.ensure_bits(1)?;
        }
        let bit = self.acc & self.mask != 0;
        self.consume_bits(1);
        Ok(bit)
    }

    /// Reads `n <= 16` bits as an unsigned value.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if self.nbits < n {
            self.ensure_bits(n)?;
        }
        let ret = (self.acc >> (self.nbits - n)) & ((1u32 << n) - 1);
        self.consume_bits(n);
        Ok(ret)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    /// Hands out at most `chunk` bytes per `read` call.
    struct Chunked<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Chunked<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn reads_bits_msb_first() -> Result<()> {
        let mut br = BitReader::new(&[0b1010_0000, 0b1111_0000][..]);
        assert!(br.read_bit()?);
        assert!(!br.read_bit()?);
        assert_eq!(br.read_bits(6)?, 0b10_0000);
        assert_eq!(br.read_bits(4)?, 0b1111);
        assert_eq!(br.bits_available(), 4);
        Ok(())
    }

    #[test]
    fn unstuffs_ff00() -> Result<()> {
        let mut br = BitReader::new(&[0xff, 0x00, 0x12][..]);
        assert_eq!(br.read_bits(16)?, 0xff12);
        Ok(())
    }

    #[test]
    fn marker_in_entropy_data() {
        let mut br = BitReader::new(&[0xff, 0xd9][..]);
        assert!(matches!(br.read_bits(8), Err(Error::MissingFF00)));
    }

    #[test]
    fn end_of_data_is_short_huffman_data() {
        let mut br = BitReader::new(&[0x12][..]);
        assert!(matches!(br.read_bits(16), Err(Error::ShortHuffmanData)));
    }

    #[test]
    fn overshoot_is_given_back_before_segment_reads() -> Result<()> {
        // One byte of entropy data, then an EOI marker.
        let mut br = BitReader::new(&[0xa5, 0xff, 0xd9][..]);
        assert_eq!(br.read_bits(4)?, 0xa);
        // Asking for 8 bits hits the marker; the pair is handed back.
        assert!(!br.try_ensure_bits(8)?);
        assert_eq!(br.read_bits(4)?, 0x5);
        let mut marker = [0; 2];
        br.read_full(&mut marker)?;
        assert_eq!(marker, [0xff, 0xd9]);
        Ok(())
    }

    #[test]
    fn unused_whole_byte_returns_to_stream() -> Result<()> {
        let mut br = BitReader::new(&[0x80, 0x42, 0xff, 0xd9][..]);
        assert!(br.read_bit()?);
        br.ensure_bits(15)?;
        // Seven bits of 0x80 are consumed below; 0x42 was pulled in but unused.
        assert_eq!(br.read_bits(7)?, 0);
        let mut rest = [0; 3];
        br.read_full(&mut rest)?;
        assert_eq!(rest, [0x42, 0xff, 0xd9]);
        Ok(())
    }

    #[test]
    fn rewind_across_refills() -> Result<()> {
        let data = [0x11, 0xff, 0x00, 0x22, 0xff, 0xd0, 0x33];
        for chunk in 1..data.len() {
            let mut br = BitReader::new(Chunked {
                data: &data,
                chunk,
            });
            assert_eq!(br.read_bits(16)?, 0x11ff);
            assert_eq!(br.read_bits(8)?, 0x22);
            assert!(!br.try_ensure_bits(8)?);
            let mut marker = [0; 2];
            br.read_full(&mut marker)?;
            assert_eq!(marker, [0xff, 0xd0], "chunk size {chunk}");
            assert_eq!(br.read_byte()?, 0x33);
        }
        Ok(())
    }

    #[test]
    fn truncated_segment() {
        let mut br = BitReader::new(&[0x00][..]);
        let mut buf = [0; 4];
        assert!(matches!(br.read_full(&mut buf), Err(Error::UnexpectedEof)));
        let mut br = BitReader::new(&[][..]);
        assert!(matches!(br.read_byte(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn u16_is_big_endian() -> Result<()> {
        let mut br = BitReader::new(&[0x01, 0x02][..]);
        assert_eq!(br.read_u16()?, 0x0102);
        Ok(())
    }
}
