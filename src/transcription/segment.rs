//! In-memory WAV segmentation for long recordings.

/// Split interleaved samples into WAV-encoded segments of at most `chunk_frames` frames.
///
/// Every segment is a complete WAV file with the given spec. Empty input yields no segments.
pub fn split_wav(
    samples: &[i16],
    spec: hound::WavSpec,
    chunk_frames: usize,
) -> Result<Vec<Vec<u8>>, hound::Error> {
    let channels = spec.channels.max(1) as usize;
    let chunk_samples = chunk_frames.max(1) * channels;

    samples
        .chunks(chunk_samples)
        .map(|chunk| encode_wav(chunk, spec))
        .collect()
}

fn encode_wav(samples: &[i16], spec: hound::WavSpec) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono() -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    fn frames_in(bytes: &[u8]) -> u32 {
        hound::WavReader::new(std::io::Cursor::new(bytes))
            .unwrap()
            .duration()
    }

    #[test]
    fn test_split_even_and_remainder() {
        let samples: Vec<i16> = (0..25).collect();
        let parts = split_wav(&samples, mono(), 10).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(frames_in(&parts[0]), 10);
        assert_eq!(frames_in(&parts[2]), 5);
    }

    #[test]
    fn test_split_keeps_stereo_frames_together() {
        let spec = hound::WavSpec { channels: 2, ..mono() };
        let samples: Vec<i16> = vec![0; 2 * 15];
        let parts = split_wav(&samples, spec, 10).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(frames_in(&parts[0]), 10);
        assert_eq!(frames_in(&parts[1]), 5);
    }

    #[test]
    fn test_segment_preserves_samples() {
        let samples: Vec<i16> = vec![1, -2, 3, -4];
        let parts = split_wav(&samples, mono(), 100).unwrap();
        assert_eq!(parts.len(), 1);
        let decoded: Vec<i16> = hound::WavReader::new(std::io::Cursor::new(&parts[0]))
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_wav(&[], mono(), 10).unwrap().is_empty());
    }
}
