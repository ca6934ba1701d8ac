// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV container encoding and decoding.
//!
//! Mono, 16-bit signed, little-endian PCM behind the standard 44-byte
//! RIFF header. Encoding and decoding are exact inverses: the decoded
//! sample sequence is bit-for-bit the encoded one.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::AudioBuffer;
use crate::error::{Error, Result};

fn spec_for(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encode a buffer as WAV bytes
pub fn encode(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let capacity = buffer.len() * 2 + 44;
    let mut cursor = Cursor::new(Vec::with_capacity(capacity));
    {
        let mut writer = WavWriter::new(&mut cursor, spec_for(buffer.sample_rate()))
            .map_err(|e| Error::Storage(e.to_string()))?;
        for &sample in buffer.samples() {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Storage(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| Error::Storage(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

/// Decode WAV bytes back into a buffer.
///
/// Rejects anything other than the mono 16-bit format this crate writes.
pub fn decode(bytes: &[u8]) -> Result<AudioBuffer> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| Error::Storage(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int
    {
        return Err(Error::Storage(format!(
            "unsupported WAV format: {} ch, {} bit",
            spec.channels, spec.bits_per_sample
        )));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Storage(e.to_string()))?;
    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Write a buffer to a WAV file
pub fn write_file<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    let bytes = encode(buffer)?;
    fs::write(path, bytes)?;
    Ok(())
}
