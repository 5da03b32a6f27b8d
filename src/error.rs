// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::HUFFMAN_MAX_SYMBOLS;

/// Broad classification of an [`Error`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// The stream violates the JPEG standard.
    Format,
    /// The stream is valid but uses a feature this decoder does not implement.
    Unsupported,
    /// The underlying byte source failed, or allocation failed.
    Io,
}

#[derive(Error, Debug)]
pub enum Error {
    // Stream and I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected end of stream")]
    UnexpectedEof,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Image size too large: {0}x{1}")]
    ImageTooLarge(usize, usize),

    // Marker and segment structure.
    #[error("invalid JPEG format: missing SOI marker")]
    MissingSoi,
    #[error("invalid JPEG format: missing SOF marker")]
    MissingSof,
    #[error("invalid JPEG format: missing SOS marker")]
    MissingSos,
    #[error("invalid JPEG format: multiple SOF markers")]
    MultipleSof,
    #[error("invalid JPEG format: short segment length")]
    ShortSegmentLength,
    #[error("invalid JPEG format: unknown marker 0xff{0:02x}")]
    UnknownMarker(u8),
    #[error("unsupported JPEG feature: unknown marker 0xff{0:02x}")]
    UnsupportedMarker(u8),

    // Frame header.
    #[error("unsupported JPEG feature: number of components")]
    UnsupportedComponentCount,
    #[error("unsupported JPEG feature: precision {0}")]
    UnsupportedPrecision(u8),
    #[error("invalid JPEG format: SOF has wrong length")]
    SofWrongLength,
    #[error("invalid JPEG format: repeated component identifier {0}")]
    RepeatedComponentId(u8),
    #[error("invalid JPEG format: bad Tq value {0}")]
    BadTq(u8),
    #[error("invalid JPEG format: luma/chroma sampling factors {0}x{1}")]
    BadSamplingFactors(u8, u8),
    #[error("unsupported JPEG feature: luma/chroma subsampling ratio")]
    UnsupportedSubsampling,
    #[error("invalid JPEG format: invalid image size {0}x{1}")]
    InvalidImageSize(usize, usize),

    // Tables.
    #[error("invalid JPEG format: DQT has wrong length")]
    DqtWrongLength,
    #[error("invalid JPEG format: bad Pq value {0}")]
    BadPq(u8),
    #[error("invalid JPEG format: DHT has wrong length")]
    DhtWrongLength,
    #[error("invalid JPEG format: bad Tc value {0}")]
    BadTc(u8),
    #[error("invalid JPEG format: bad Th value {0}")]
    BadTh(u8),
    #[error("invalid JPEG format: Huffman table has zero length")]
    EmptyHuffmanTable,
    #[error("invalid JPEG format: Huffman table has excessive length {0}, max is {max}", max = HUFFMAN_MAX_SYMBOLS)]
    HuffmanTableTooLarge(usize),
    #[error("invalid JPEG format: DRI has wrong length")]
    DriWrongLength,

    // Scan header.
    #[error("invalid JPEG format: SOS has wrong length")]
    SosWrongLength,
    #[error("invalid JPEG format: SOS length inconsistent with number of components")]
    SosComponentCountMismatch,
    #[error("invalid JPEG format: unknown component selector {0}")]
    UnknownComponentSelector(u8),
    #[error("invalid JPEG format: repeated component selector {0}")]
    RepeatedComponentSelector(u8),
    #[error("invalid JPEG format: bad Td value {0}")]
    BadTd(u8),
    #[error("invalid JPEG format: bad Ta value {0}")]
    BadTa(u8),
    #[error("invalid JPEG format: total sampling factors too large: {0}")]
    TotalSamplingFactorsTooLarge(usize),
    #[error("invalid JPEG format: bad spectral selection bounds {0}..={1}")]
    BadSpectralSelection(u8, u8),
    #[error("invalid JPEG format: progressive AC coefficients for more than one component")]
    InterleavedAcScan,
    #[error("invalid JPEG format: bad successive approximation values ah={0} al={1}")]
    BadSuccessiveApproximation(u8, u8),

    // Entropy-coded data.
    #[error("invalid JPEG format: missing 0xff00 sequence")]
    MissingFF00,
    #[error("invalid JPEG format: short Huffman data")]
    ShortHuffmanData,
    #[error("invalid JPEG format: uninitialized Huffman table")]
    UninitializedHuffmanTable,
    #[error("invalid JPEG format: bad Huffman code")]
    BadHuffmanCode,
    #[error("unsupported JPEG feature: excessive DC component category {0}")]
    ExcessiveDcComponent(u8),
    #[error("invalid JPEG format: unexpected Huffman code {0:#04x} in refinement scan")]
    UnexpectedRefinementCode(u8),
    #[error("invalid JPEG format: too many coefficients")]
    TooManyCoefficients,
    #[error("invalid JPEG format: bad RST marker 0x{0:02x}{1:02x}, expected 0xff{2:02x}")]
    BadRestartMarker(u8, u8, u8),

    // Color.
    #[error("unsupported JPEG feature: unknown color model: 4-component JPEG doesn't have Adobe APP14 metadata")]
    UnknownColorModel,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            Io(_) | UnexpectedEof | OutOfMemory(_) | ImageTooLarge(..) => ErrorKind::Io,
            UnsupportedMarker(_)
            | UnsupportedComponentCount
            | UnsupportedPrecision(_)
            | UnsupportedSubsampling
            | ExcessiveDcComponent(_)
            | UnknownColorModel => ErrorKind::Unsupported,
            _ => ErrorKind::Format,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
