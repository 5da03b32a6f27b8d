// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Start Of Frame (Baseline).
pub const SOF0: u8 = 0xc0;
/// Start Of Frame (Extended Sequential).
pub const SOF1: u8 = 0xc1;
/// Start Of Frame (Progressive).
pub const SOF2: u8 = 0xc2;
pub const DHT: u8 = 0xc4;
pub const RST0: u8 = 0xd0;
pub const RST7: u8 = 0xd7;
pub const SOI: u8 = 0xd8;
pub const EOI: u8 = 0xd9;
pub const SOS: u8 = 0xda;
pub const DQT: u8 = 0xdb;
pub const DRI: u8 = 0xdd;
pub const APP0: u8 = 0xe0;
pub const APP14: u8 = 0xee;
pub const APP15: u8 = 0xef;
pub const COM: u8 = 0xfe;

/// The segment kinds the decoder distinguishes, keyed by marker code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// SOF0, SOF1 or SOF2. Only SOF0 restricts the frame to two Huffman
    /// tables per class.
    Sof { baseline: bool, progressive: bool },
    Dht,
    Dqt,
    Dri,
    Sos,
    Soi,
    Eoi,
    Rst(u8),
    /// APP0, which may carry a JFIF signature.
    Jfif,
    /// APP14, which may carry an Adobe signature.
    Adobe,
    /// Any other APPn segment, or a comment.
    Ignored(u8),
    Unknown(u8),
}

impl From<u8> for Marker {
    fn from(code: u8) -> Marker {
        match code {
            SOF0 => Marker::Sof {
                baseline: true,
                progressive: false,
            },
            SOF1 => Marker::Sof {
                baseline: false,
                progressive: false,
            },
            SOF2 => Marker::Sof {
                baseline: false,
                progressive: true,
            },
            DHT => Marker::Dht,
            DQT => Marker::Dqt,
            DRI => Marker::Dri,
            SOS => Marker::Sos,
            SOI => Marker::Soi,
            EOI => Marker::Eoi,
            RST0..=RST7 => Marker::Rst(code - RST0),
            APP0 => Marker::Jfif,
            APP14 => Marker::Adobe,
            APP0..=APP15 | COM => Marker::Ignored(code),
            _ => Marker::Unknown(code),
        }
    }
}

impl Marker {
    /// Whether a 16-bit length field follows the marker.
    pub fn has_payload(self) -> bool {
        !matches!(self, Marker::Soi | Marker::Eoi | Marker::Rst(_))
    }
}
