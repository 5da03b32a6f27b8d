// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::{ImageConfig, JpegDecoderOptions};
use crate::bit_reader::BitReader;
use crate::color::{assemble, color_model};
use crate::error::{Error, Result};
use crate::frame::FrameState;
use crate::headers::marker::SOI;
use crate::headers::{
    read_app0, read_app14, read_dht, read_dqt, read_dri, FrameHeader, Marker, ScanHeader,
};
use crate::image::Image;
use crate::util::tracing_wrappers::*;

/// Markers with a code below this one are reserved (T.81 Table B.1), so
/// meeting one is a format error rather than a missing feature.
const FIRST_ASSIGNED_MARKER: u8 = 0xc0;

/// Decodes one JPEG stream. All decoding state lives here and is dropped
/// with the decoder.
pub struct JpegDecoder<R> {
    br: BitReader<R>,
    options: JpegDecoderOptions,
    frame: FrameState,
}

impl<R: Read> JpegDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, JpegDecoderOptions::default())
    }

    pub fn with_options(reader: R, options: JpegDecoderOptions) -> Self {
        JpegDecoder {
            br: BitReader::new(reader),
            options,
            frame: FrameState::new(),
        }
    }

    /// Reads the whole stream up to EOI and returns the decoded image.
    pub fn decode(mut self) -> Result<Image> {
        self.read_segments(false)?;
        assemble(self.frame)
    }

    /// Reads just enough of the stream to tell the color model and size.
    pub fn decode_config(mut self) -> Result<ImageConfig> {
        self.read_segments(true)?;
        let header = self.frame.header.as_ref().ok_or(Error::MissingSof)?;
        Ok(ImageConfig {
            color_model: color_model(header, self.frame.jfif, self.frame.adobe_transform),
            width: header.width,
            height: header.height,
        })
    }

    /// Processes segments until EOI. With `config_only`, stops at the frame
    /// header if a JFIF marker came first, and otherwise at the first scan,
    /// leaving table segments uninterpreted.
    #[instrument(level = "debug", skip(self), err)]
    fn read_segments(&mut self, config_only: bool) -> Result<()> {
        let mut soi = [0u8; 2];
        self.br.read_full(&mut soi)?;
        if soi != [0xff, SOI] {
            return Err(Error::MissingSoi);
        }

        loop {
            let code = self.next_marker()?;
            let marker = Marker::from(code);
            match marker {
                Marker::Eoi => return Ok(()),
                Marker::Rst(_) => {
                    // Some encoders emit one after the last scan.
                    warn!(code, "restart marker outside of a scan");
                    continue;
                }
                // A repeated SOI.
                _ if !marker.has_payload() => return Err(Error::UnsupportedMarker(code)),
                _ => {}
            }

            let n = (self.br.read_u16()? as usize)
                .checked_sub(2)
                .ok_or(Error::ShortSegmentLength)?;
            debug!(?marker, n, "segment");

            match marker {
                Marker::Sof {
                    baseline,
                    progressive,
                } => {
                    self.read_frame_header(n, baseline, progressive, config_only)?;
                    if config_only && self.frame.jfif {
                        return Ok(());
                    }
                }
                Marker::Dht | Marker::Dqt | Marker::Dri if config_only => self.br.skip(n)?,
                Marker::Dht => read_dht(
                    &mut self.br,
                    n,
                    self.frame.baseline,
                    &mut self.frame.huffman_tables,
                )?,
                Marker::Dqt => read_dqt(&mut self.br, n, &mut self.frame.quant_tables)?,
                Marker::Dri => self.frame.restart_interval = read_dri(&mut self.br, n)?,
                Marker::Sos if config_only => return Ok(()),
                Marker::Sos => self.read_scan(n)?,
                Marker::Jfif => self.frame.jfif |= read_app0(&mut self.br, n)?,
                Marker::Adobe => {
                    if let Some(transform) = read_app14(&mut self.br, n)? {
                        self.frame.adobe_transform = Some(transform);
                    }
                }
                Marker::Ignored(_) => self.br.skip(n)?,
                Marker::Unknown(code) if code < FIRST_ASSIGNED_MARKER => {
                    return Err(Error::UnknownMarker(code))
                }
                Marker::Unknown(_) => return Err(Error::UnsupportedMarker(code)),
                Marker::Soi | Marker::Eoi | Marker::Rst(_) => {
                    unreachable!("marker without payload: {marker:?}")
                }
            }
        }
    }

    /// Returns the code of the next marker, skipping extraneous bytes and
    /// fill bytes before it.
    fn next_marker(&mut self) -> Result<u8> {
        loop {
            let mut buf = [0u8; 2];
            self.br.read_full(&mut buf)?;
            let mut skipped = 0usize;
            while buf[0] != 0xff {
                buf = [buf[1], self.br.read_byte()?];
                skipped += 1;
            }
            if skipped > 0 {
                warn!(skipped, "extraneous bytes before marker");
            }
            let mut code = buf[1];
            if code == 0 {
                warn!("extraneous 0xff00 between segments");
                continue;
            }
            while code == 0xff {
                code = self.br.read_byte()?;
            }
            return Ok(code);
        }
    }

    fn read_frame_header(
        &mut self,
        n: usize,
        baseline: bool,
        progressive: bool,
        config_only: bool,
    ) -> Result<()> {
        if self.frame.header.is_some() {
            return Err(Error::MultipleSof);
        }
        let header = FrameHeader::read(&mut self.br, n, progressive)?;
        if !config_only {
            self.check_size(&header)?;
        }
        self.frame.baseline = baseline;
        self.frame.header = Some(header);
        Ok(())
    }

    fn check_size(&self, header: &FrameHeader) -> Result<()> {
        let (width, height) = (header.width, header.height);
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }
        if let Some(limit) = self.options.pixel_limit {
            if width.saturating_mul(height) > limit {
                return Err(Error::ImageTooLarge(width, height));
            }
        }
        Ok(())
    }

    fn read_scan(&mut self, n: usize) -> Result<()> {
        let header = self.frame.header.as_ref().ok_or(Error::MissingSof)?;
        let scan = ScanHeader::read(&mut self.br, n, header, self.frame.baseline)?;
        self.frame.decode_scan(&mut self.br, &scan)
    }
}
