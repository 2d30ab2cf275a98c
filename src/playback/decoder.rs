use crate::error::DecodeError;
use crate::types::sample_buffer::SampleBuffer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

const I16_SCALE: f32 = 32768.0;

/// Decodes raw signed 16-bit little-endian PCM into normalized `f32` samples.
///
/// A trailing odd byte is dropped silently rather than treated as an error, as is a
/// trailing partial frame when `channels > 1`. Fails only when the input yields no
/// complete frame.
pub fn decode_pcm_s16le(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<SampleBuffer, DecodeError> {
    if sample_rate == 0 || channels == 0 {
        return Err(DecodeError::InvalidFormat {
            sample_rate,
            channels,
        });
    }
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let frame_count = bytes.len() / 2 / channels as usize;
    if frame_count == 0 {
        return Err(DecodeError::NoFrames {
            bytes: bytes.len(),
            channels,
        });
    }

    let used = frame_count * channels as usize * 2;
    let samples: Vec<f32> = bytes[..used]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
        .collect();

    Ok(SampleBuffer::new(samples, sample_rate, channels))
}

/// Decodes the generation collaborator's base64 transport encoding into raw bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(BASE64.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_normalizes_extremes() {
        let buffer = decode_pcm_s16le(&pcm(&[i16::MIN, 0, i16::MAX, -16384]), 24_000, 1).unwrap();
        let samples = buffer.samples();
        assert_eq!(samples[0], -1.0);
        assert_eq!(samples[1], 0.0);
        assert!(samples[2] < 1.0 && samples[2] > 0.9999);
        assert_eq!(samples[3], -0.5);
    }

    #[test]
    fn test_duration_from_byte_length() {
        for (len, channels, rate) in [(48_000usize, 1u16, 24_000u32), (9_600, 2, 24_000), (320, 1, 16_000)] {
            let bytes = vec![0u8; len];
            let buffer = decode_pcm_s16le(&bytes, rate, channels).unwrap();
            let expected = (len / 2 / channels as usize) as f64 / rate as f64;
            assert_eq!(buffer.duration(), expected);
        }
    }

    #[test]
    fn test_odd_length_drops_last_byte() {
        let mut bytes = pcm(&[100, -100, 200]);
        bytes.push(0x7f);
        let buffer = decode_pcm_s16le(&bytes, 24_000, 1).unwrap();
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.samples()[2], 200.0 / 32768.0);
    }

    #[test]
    fn test_deinterleaves_stereo() {
        let bytes = pcm(&[16384, -16384, 8192, -8192]);
        let buffer = decode_pcm_s16le(&bytes, 8_000, 2).unwrap();
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channel(0).collect::<Vec<_>>(), vec![0.5, 0.25]);
        assert_eq!(buffer.channel(1).collect::<Vec<_>>(), vec![-0.5, -0.25]);
    }

    #[test]
    fn test_rejects_empty_and_frameless_input() {
        assert!(matches!(decode_pcm_s16le(&[], 24_000, 1), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_pcm_s16le(&[0x01], 24_000, 1),
            Err(DecodeError::NoFrames { bytes: 1, .. })
        ));
        assert!(matches!(
            decode_pcm_s16le(&[0, 0], 24_000, 2),
            Err(DecodeError::NoFrames { .. })
        ));
        assert!(matches!(
            decode_pcm_s16le(&[0, 0], 0, 1),
            Err(DecodeError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_base64_payload() {
        let bytes = decode_base64("AAABAA==\n").unwrap();
        assert_eq!(bytes, vec![0, 0, 1, 0]);
        assert!(matches!(decode_base64("not base64!"), Err(DecodeError::Base64(_))));
    }
}
