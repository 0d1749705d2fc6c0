mod common;

use common::ChunkedReader;
use proptest::prelude::*;
use simbridge_communication::{FrameDecoder, FrameOutcome};
use simbridge_core::{Event, FrameParseError, LinkError};
use std::io::Read;

fn decode_all<R: Read>(reader: R) -> Vec<Event> {
    let mut decoder = FrameDecoder::new(reader);
    let mut events = Vec::new();
    loop {
        match decoder.next_event() {
            Ok(event) => events.push(event),
            Err(LinkError::Closed) => return events,
            Err(e) => panic!("unexpected link error: {}", e),
        }
    }
}

fn bitmap_frame(x: u16, y: u16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
    let mut frame = format!("$b{},{},{},{}\n", x, y, w, h).into_bytes();
    frame.extend_from_slice(pixels);
    frame
}

fn mixed_stream() -> (Vec<u8>, Vec<Event>) {
    let pixels: Vec<u8> = (0..24).collect();
    let mut stream = Vec::new();
    stream.extend_from_slice(b"boot: washer sim v2\r\n");
    stream.extend_from_slice(&bitmap_frame(10, 20, 3, 4, &pixels));
    stream.extend_from_slice(b"$R1,2,3,4,5\n");
    stream.extend_from_slice(b"$G12,1\n");
    stream.extend_from_slice(b"$M800.0,795.5,1,0.3\n");
    // Pixel bytes that look like frame syntax must not confuse the decoder.
    stream.extend_from_slice(&bitmap_frame(0, 0, 1, 1, b"$\n"));
    stream.extend_from_slice(b"$Zfoo\n");

    let expected = vec![
        Event::LogLine {
            text: "boot: washer sim v2".to_string(),
        },
        Event::BitmapBlit {
            x: 10,
            y: 20,
            w: 3,
            h: 4,
            pixels,
        },
        Event::RectDraw {
            x: 1,
            y: 2,
            w: 3,
            h: 4,
            color: 5,
        },
        Event::GpioUpdate { pin: 12, value: 1 },
        Event::MotorTelemetry {
            target: 800.0,
            current: 795.5,
            direction: 1,
        },
        Event::BitmapBlit {
            x: 0,
            y: 0,
            w: 1,
            h: 1,
            pixels: b"$\n".to_vec(),
        },
        Event::LogLine {
            text: "$Zfoo".to_string(),
        },
    ];

    (stream, expected)
}

#[test]
fn test_mixed_stream_in_order() {
    let (stream, expected) = mixed_stream();
    assert_eq!(decode_all(ChunkedReader::whole(stream)), expected);
}

#[test]
fn test_bytewise_reads_match_whole_reads() {
    let (stream, expected) = mixed_stream();
    assert_eq!(decode_all(ChunkedReader::bytewise(stream.clone())), expected);
    assert_eq!(
        decode_all(ChunkedReader::bytewise(stream).with_timeouts()),
        expected
    );
}

#[test]
fn test_bitmap_consumes_exactly_payload() {
    let pixels = vec![0xAB; 2 * 3 * 2];
    let mut stream = bitmap_frame(5, 6, 2, 3, &pixels);
    stream.extend_from_slice(b"$G1,0\n");

    let mut decoder = FrameDecoder::new(ChunkedReader::new(stream, vec![3, 1, 7]));
    match decoder.next_frame().unwrap() {
        FrameOutcome::Event(Event::BitmapBlit { pixels: got, .. }) => assert_eq!(got, pixels),
        other => panic!("expected bitmap, got {:?}", other),
    }
    assert_eq!(
        decoder.next_event().unwrap(),
        Event::GpioUpdate { pin: 1, value: 0 }
    );
}

#[test]
fn test_malformed_bitmap_header_does_not_desync() {
    let mut decoder = FrameDecoder::new(ChunkedReader::whole(
        b"$bX,1,1\nAABB\n$R1,2,3,4,5\n".to_vec(),
    ));

    assert!(matches!(
        decoder.next_frame().unwrap(),
        FrameOutcome::Discarded(FrameParseError::MalformedHeader { .. })
    ));

    let events: Vec<Event> = decoder.filter_map(|item| item.ok()).collect();
    let rects: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::RectDraw { .. }))
        .collect();
    assert_eq!(
        rects,
        vec![&Event::RectDraw {
            x: 1,
            y: 2,
            w: 3,
            h: 4,
            color: 5
        }]
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::BitmapBlit { .. })));
}

#[test]
fn test_bitmap_header_wrong_field_count() {
    let events = decode_all(ChunkedReader::whole(b"$b1,2,3\n$G2,1\n".to_vec()));
    assert_eq!(events, vec![Event::GpioUpdate { pin: 2, value: 1 }]);
}

#[test]
fn test_zero_area_bitmap() {
    let events = decode_all(ChunkedReader::whole(b"$b4,5,0,9\n$b4,5,9,0\n".to_vec()));
    assert_eq!(
        events,
        vec![
            Event::BitmapBlit {
                x: 4,
                y: 5,
                w: 0,
                h: 9,
                pixels: vec![]
            },
            Event::BitmapBlit {
                x: 4,
                y: 5,
                w: 9,
                h: 0,
                pixels: vec![]
            }
        ]
    );
}

#[test]
fn test_unknown_sigil_frame_is_log() {
    let events = decode_all(ChunkedReader::whole(b"$Zfoo\n".to_vec()));
    assert_eq!(
        events,
        vec![Event::LogLine {
            text: "$Zfoo".to_string()
        }]
    );
}

#[test]
fn test_plain_line_is_trimmed_log() {
    let events = decode_all(ChunkedReader::whole(b"  drum speed ok \t\r\n".to_vec()));
    assert_eq!(
        events,
        vec![Event::LogLine {
            text: "drum speed ok".to_string()
        }]
    );
}

#[test]
fn test_malformed_text_frames_are_dropped() {
    let events = decode_all(ChunkedReader::whole(
        b"$R1,2,3\n$Gx,1\n$M1.0\n$G7,0\n".to_vec(),
    ));
    assert_eq!(events, vec![Event::GpioUpdate { pin: 7, value: 0 }]);
}

#[test]
fn test_eof_mid_bitmap_is_link_error() {
    let stream = bitmap_frame(0, 0, 4, 4, &[0u8; 10]);
    let mut decoder = FrameDecoder::new(ChunkedReader::whole(stream));
    assert_eq!(decoder.next_event(), Err(LinkError::Closed));
}

#[test]
fn test_eof_mid_line_is_link_error() {
    let mut decoder = FrameDecoder::new(ChunkedReader::whole(b"$G1,".to_vec()));
    assert_eq!(decoder.next_event(), Err(LinkError::Closed));
}

#[test]
fn test_huge_bitmap_cut_short_is_link_error() {
    let mut stream = b"$b1,1,65535,65535\n".to_vec();
    stream.extend_from_slice(&[0x5A; 300]);
    let mut decoder = FrameDecoder::new(ChunkedReader::new(stream, vec![7, 64]));
    assert_eq!(decoder.next_event(), Err(LinkError::Closed));
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (any::<u16>(), any::<u16>(), 0u16..6, 0u16..6)
            .prop_flat_map(|(x, y, w, h)| {
                let len = usize::from(w) * usize::from(h) * 2;
                proptest::collection::vec(any::<u8>(), len)
                    .prop_map(move |pixels| Event::BitmapBlit { x, y, w, h, pixels })
            }),
        (any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>())
            .prop_map(|(x, y, w, h, color)| Event::RectDraw { x, y, w, h, color }),
        (any::<i32>(), any::<i32>()).prop_map(|(pin, value)| Event::GpioUpdate { pin, value }),
        (-1000i32..1000, -1000i32..1000, -1i32..=1).prop_map(|(t, c, direction)| {
            Event::MotorTelemetry {
                target: f64::from(t) / 4.0,
                current: f64::from(c) / 4.0,
                direction,
            }
        }),
        "[a-zA-Z0-9]([a-zA-Z0-9 :=.]{0,30}[a-zA-Z0-9])?".prop_map(|text| Event::LogLine { text }),
    ]
}

fn wire_bytes(event: &Event) -> Vec<u8> {
    match event {
        Event::BitmapBlit { x, y, w, h, pixels } => bitmap_frame(*x, *y, *w, *h, pixels),
        Event::RectDraw { x, y, w, h, color } => {
            format!("$R{},{},{},{},{}\n", x, y, w, h, color).into_bytes()
        }
        Event::GpioUpdate { pin, value } => format!("$G{},{}\n", pin, value).into_bytes(),
        Event::MotorTelemetry {
            target,
            current,
            direction,
        } => format!("$M{},{},{}\n", target, current, direction).into_bytes(),
        Event::LogLine { text } => format!("{}\n", text).into_bytes(),
    }
}

proptest! {
    #[test]
    fn prop_chunk_boundaries_do_not_change_events(
        events in proptest::collection::vec(arb_event(), 0..12),
        chunks in proptest::collection::vec(1usize..17, 1..6),
    ) {
        let stream: Vec<u8> = events.iter().flat_map(wire_bytes).collect();

        let whole = decode_all(ChunkedReader::whole(stream.clone()));
        let chunked = decode_all(ChunkedReader::new(stream, chunks));

        prop_assert_eq!(&whole, &events);
        prop_assert_eq!(&chunked, &events);
    }
}
