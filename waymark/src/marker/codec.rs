//! Persisted encoding of the marker collection.
//!
//! The collection is stored as a JSON array of
//! `{"latitude": f64, "longitude": f64, "address": string|null}` records.
//! There is no version field, so the format must round-trip exactly.

use thiserror::Error;

use super::model::Marker;

/// Errors from encoding or decoding the marker collection.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The collection could not be serialized.
    #[error("failed to encode markers: {0}")]
    Encode(#[source] serde_json::Error),

    /// The persisted blob is not a valid marker list.
    #[error("failed to decode markers: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode an ordered marker list.
pub fn encode_markers(markers: &[Marker]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(markers).map_err(CodecError::Encode)
}

/// Decode an ordered marker list.
pub fn decode_markers(data: &[u8]) -> Result<Vec<Marker>, CodecError> {
    serde_json::from_slice(data).map_err(CodecError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn test_decode_known_blob() {
        let blob = br#"[{"latitude":0.0,"longitude":0.0009,"address":"Main St, Springfield, ST, USA"},
                        {"latitude":-33.5,"longitude":151.25,"address":null}]"#;
        let markers = decode_markers(blob).unwrap();

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].coordinate(), Coordinate::new(0.0, 0.0009));
        assert_eq!(markers[0].address(), Some("Main St, Springfield, ST, USA"));
        assert_eq!(markers[1].address(), None);
    }

    #[test]
    fn test_encode_empty_list() {
        assert_eq!(encode_markers(&[]).unwrap(), b"[]".to_vec());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_markers(b"not json"),
            Err(CodecError::Decode(_))
        ));
        assert!(decode_markers(br#"{"latitude": 1.0}"#).is_err());
        assert!(decode_markers(br#"[{"latitude": 1.0}]"#).is_err());
    }

    #[test]
    fn test_non_finite_coordinates_do_not_roundtrip() {
        let marker = Marker::new(Coordinate::new(f64::NAN, 0.0), None);
        // JSON has no NaN; serde_json writes null, which cannot decode back
        let encoded = encode_markers(&[marker]).unwrap();
        assert!(decode_markers(&encoded).is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn marker_strategy() -> impl Strategy<Value = Marker> {
            (
                -90.0..90.0_f64,
                -180.0..180.0_f64,
                proptest::option::of(".{0,40}"),
            )
                .prop_map(|(lat, lon, address)| Marker::new(Coordinate::new(lat, lon), address))
        }

        proptest! {
            #[test]
            fn test_encoding_roundtrips_exactly(
                markers in proptest::collection::vec(marker_strategy(), 1..20)
            ) {
                let encoded = encode_markers(&markers)?;
                let decoded = decode_markers(&encoded)?;
                prop_assert_eq!(&decoded, &markers);

                let reencoded = encode_markers(&decoded)?;
                prop_assert_eq!(reencoded, encoded);
            }
        }
    }
}
