// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use crate::TrackPoint;

/// Source of XML events for [read_track_points], so that the same GPX walk
/// serves both in-memory documents and (possibly decompressed) streams.
trait EventSource {
    fn next_event(&mut self) -> quick_xml::Result<quick_xml::events::Event<'_>>;
}

/// Streamed GPX. Event data borrows from an internal scratch buffer,
/// which is reused for every event.
struct StreamEvents<R: io::BufRead> {
    reader: quick_xml::Reader<R>,
    scratch: Vec<u8>,
}

impl<R: io::BufRead> StreamEvents<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: quick_xml::Reader::from_reader(reader),
            scratch: Vec::default(),
        }
    }
}

impl<R: io::BufRead> EventSource for StreamEvents<R> {
    fn next_event(&mut self) -> quick_xml::Result<quick_xml::events::Event<'_>> {
        self.scratch.clear();
        self.reader.read_event_into(&mut self.scratch)
    }
}

/// In-memory GPX. Event data borrows straight from the document.
struct SliceEvents<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> EventSource for SliceEvents<'a> {
    fn next_event(&mut self) -> quick_xml::Result<quick_xml::events::Event<'_>> {
        self.0.read_event()
    }
}

/// Reads all track points (`<trkpt>`) from a [GPX](https://www.topografix.com/gpx.asp) document
/// held in memory, in document order. All tracks and track segments are concatenated.
pub fn read_from_buffer(data: &[u8]) -> Result<Vec<TrackPoint>, quick_xml::Error> {
    read_track_points(SliceEvents(quick_xml::Reader::from_reader(data)))
}

/// Reads all track points (`<trkpt>`) from a [GPX](https://www.topografix.com/gpx.asp) stream,
/// in document order. All tracks and track segments are concatenated.
pub fn read_from_io<R: io::BufRead>(reader: R) -> Result<Vec<TrackPoint>, quick_xml::Error> {
    read_track_points(StreamEvents::new(reader))
}

fn read_track_points<E: EventSource>(mut events: E) -> Result<Vec<TrackPoint>, quick_xml::Error> {
    let mut points = Vec::default();

    // Point currently being parsed; `Some(None)` if inside a <trkpt> with invalid coordinates.
    let mut current: Option<Option<TrackPoint>> = None;
    let mut in_ele = false;

    loop {
        match events.next_event()? {
            quick_xml::events::Event::Start(start) => match start.local_name().as_ref() {
                b"trkpt" => current = Some(parse_trkpt(&start)),
                b"ele" => in_ele = current.is_some(),
                _ => {}
            },

            quick_xml::events::Event::Empty(start) => {
                if start.local_name().as_ref() == b"trkpt" {
                    if let Some(pt) = parse_trkpt(&start) {
                        points.push(pt);
                    }
                }
            }

            quick_xml::events::Event::Text(text) => {
                if in_ele {
                    if let Some(Some(ref mut pt)) = current {
                        match from_utf8(&text).ok().and_then(|s| s.trim().parse().ok()) {
                            Some(ele) => pt.elevation = ele,
                            None => log::warn!("ignoring invalid track point elevation"),
                        }
                    }
                }
            }

            quick_xml::events::Event::End(end) => match end.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(Some(pt)) = current.take() {
                        points.push(pt);
                    }
                    in_ele = false;
                }
                b"ele" => in_ele = false,
                _ => {}
            },

            quick_xml::events::Event::Eof => break,

            _ => {}
        }
    }

    Ok(points)
}

fn parse_trkpt(start: &quick_xml::events::BytesStart<'_>) -> Option<TrackPoint> {
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes() {
        let Ok(attr) = attr else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"lat" => lat = parse_coordinate(&attr.value).unwrap_or(f64::NAN),
            b"lon" => lon = parse_coordinate(&attr.value).unwrap_or(f64::NAN),
            _ => {}
        }
    }

    if lat.is_finite() && lon.is_finite() {
        Some(TrackPoint {
            lat,
            lon,
            elevation: 0.0,
        })
    } else {
        log::warn!("skipping track point without valid lat/lon");
        None
    }
}

fn parse_coordinate(value: &[u8]) -> Option<f64> {
    from_utf8(value).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_GPX: &[u8] = include_bytes!("test_fixtures/track.gpx");

    fn expected_points() -> Vec<TrackPoint> {
        vec![
            TrackPoint::new(52.2297, 21.0122, 100.5),
            TrackPoint::new(52.2299, 21.0131, 101.0),
            TrackPoint::new(52.2301, 21.0140, 0.0),
            TrackPoint::new(52.2310, 21.0141, 103.25),
            TrackPoint::new(52.2320, 21.0142, 104.0),
        ]
    }

    #[test]
    fn parse_from_buf() -> Result<(), quick_xml::Error> {
        assert_eq!(read_from_buffer(SIMPLE_GPX)?, expected_points());
        Ok(())
    }

    #[test]
    fn parse_from_io() -> Result<(), quick_xml::Error> {
        assert_eq!(
            read_from_io(io::Cursor::new(SIMPLE_GPX))?,
            expected_points()
        );
        Ok(())
    }

    #[test]
    fn parse_prefixed_namespace() -> Result<(), quick_xml::Error> {
        const DATA: &[u8] = br#"<?xml version="1.0"?>
<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1">
  <g:trk><g:trkseg>
    <g:trkpt lat="1.5" lon="2.5"><g:ele>7</g:ele></g:trkpt>
    <g:trkpt lat="1.6" lon="2.6"/>
  </g:trkseg></g:trk>
</g:gpx>"#;

        assert_eq!(
            read_from_buffer(DATA)?,
            vec![TrackPoint::new(1.5, 2.5, 7.0), TrackPoint::new(1.6, 2.6, 0.0)]
        );
        Ok(())
    }

    #[test]
    fn parse_without_track_points() -> Result<(), quick_xml::Error> {
        const DATA: &[u8] = br#"<gpx><wpt lat="1" lon="2"><ele>3</ele></wpt></gpx>"#;
        assert_eq!(read_from_buffer(DATA)?, vec![]);
        Ok(())
    }

    #[test]
    fn parse_malformed() {
        const DATA: &[u8] = br#"<gpx><trk><trkseg><trkpt lat="1" lon="2"></trkseg></gpx>"#;
        assert!(read_from_buffer(DATA).is_err());
    }
}
