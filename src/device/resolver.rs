//! Frame-size Resolver (C5).
//!
//! When no advertised size fits under the requested ceiling, the resolver
//! returns the last pair it examined in enumeration order, not the
//! smallest available size. This is almost certainly a bug, but
//! wire-compatible behavior wins — see `DESIGN.md`.

use crate::device::{FrameSize, FrameSizeRef, Stream};

/// Resolve `(w, h)` against a stream's advertised formats. Returns `None`
/// only if the stream has zero formats or every format has zero frame
/// sizes. Formats and their frame-size lists are expected to be
/// non-empty for a well-formed device, so this is effectively
/// unreachable in practice.
pub fn resolve(stream: &Stream, w: u32, h: u32) -> Option<FrameSizeRef> {
    let mut best: Option<(FrameSizeRef, FrameSize)> = None;
    let mut last: Option<FrameSizeRef> = None;

    for (format_idx, format) in stream.formats.iter().enumerate() {
        for (size_idx, &fs) in format.frame_sizes.iter().enumerate() {
            let candidate = FrameSizeRef { format_idx, size_idx };
            last = Some(candidate);

            if fs.width == w && fs.height == h {
                return Some(candidate);
            }

            if fs.width <= w && fs.height <= h {
                let better = match best {
                    None => true,
                    Some((_, cur)) => (fs.width, fs.height) > (cur.width, cur.height),
                };
                if better {
                    best = Some((candidate, fs));
                }
            }
        }
    }

    best.map(|(r, _)| r).or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Format;

    fn stream_with(sizes: &[(u32, u32)]) -> Stream {
        Stream::new(
            1,
            vec![Format {
                pixel_format: "YUYV".to_string(),
                frame_sizes: sizes.iter().map(|&(w, h)| FrameSize::new(w, h)).collect(),
            }],
        )
    }

    fn size_at(stream: &Stream, r: FrameSizeRef) -> FrameSize {
        stream.formats[r.format_idx].frame_sizes[r.size_idx]
    }

    #[test]
    fn exact_match_wins_regardless_of_position() {
        let stream = stream_with(&[(640, 480), (1920, 1080), (1280, 720)]);
        let r = resolve(&stream, 1280, 720).unwrap();
        assert_eq!(size_at(&stream, r), FrameSize::new(1280, 720));
    }

    #[test]
    fn max_ceiling_returns_lexicographic_maximum() {
        let stream = stream_with(&[(640, 480), (1280, 720), (1920, 1080)]);
        let r = resolve(&stream, u32::MAX, u32::MAX).unwrap();
        assert_eq!(size_at(&stream, r), FrameSize::new(1920, 1080));
    }

    #[test]
    fn best_fit_under_ceiling() {
        let stream = stream_with(&[(640, 480), (1280, 720), (1920, 1080)]);
        let r = resolve(&stream, 1000, 1000).unwrap();
        assert_eq!(size_at(&stream, r), FrameSize::new(640, 480));
    }

    #[test]
    fn no_fit_under_ceiling_returns_last_examined() {
        // Every advertised size exceeds the ceiling in at least one
        // dimension; the last-enumerated pair wins, not the smallest.
        let stream = stream_with(&[(1920, 1080), (1280, 720)]);
        let r = resolve(&stream, 100, 100).unwrap();
        assert_eq!(size_at(&stream, r), FrameSize::new(1280, 720));
    }

    #[test]
    fn single_format_single_size_always_resolves() {
        let stream = stream_with(&[(320, 240)]);
        let r = resolve(&stream, 1, 1).unwrap();
        assert_eq!(size_at(&stream, r), FrameSize::new(320, 240));
    }
}
