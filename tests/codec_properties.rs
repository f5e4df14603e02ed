//! Property tests for the codec and strategy selector.

use proptest::prelude::*;
use uidl_compressor::{
    client::PayloadDecoder, CompressionStrategy, GzipCodec, PayloadForm, StrategySelector,
};

fn uidl_like() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 0..64)
        .prop_map(|keys| {
            let changes: Vec<String> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| format!("{{\"{k}\":{i}}}"))
                .collect();
            format!("for(;;);[{}]", changes.join(","))
        })
}

proptest! {
    #[test]
    fn gzip_base64_recovers_any_payload(raw in prop::collection::vec(any::<u8>(), 0..4096)) {
        let codec = GzipCodec::new();
        let encoded = codec.compress_encode(&raw).unwrap();
        prop_assert_eq!(codec.decode_decompress(&encoded).unwrap(), raw);
    }

    #[test]
    fn encoded_length_follows_base64(raw in prop::collection::vec(any::<u8>(), 0..2048)) {
        let codec = GzipCodec::new();
        let compressed = codec.compress(&raw).unwrap();
        let encoded = codec.encode(&compressed);
        prop_assert_eq!(encoded.len(), compressed.len().div_ceil(3) * 4);
    }

    #[test]
    fn repeated_selection_is_identical(raw in prop::collection::vec(any::<u8>(), 0..4096)) {
        let selector = StrategySelector::new().with_strategy(CompressionStrategy::Strict);

        let first = selector.select(raw.clone()).unwrap();
        let second = selector.select(raw).unwrap();

        prop_assert_eq!(first.measurement, second.measurement);
        prop_assert_eq!(first.body, second.body);
    }

    #[test]
    fn adaptive_never_sends_more_than_raw_or_encoded(payload in uidl_like()) {
        let selection = StrategySelector::new()
            .with_strategy(CompressionStrategy::Adaptive)
            .select(payload.clone().into_bytes())
            .unwrap();
        let m = selection.measurement.unwrap();

        prop_assert_eq!(selection.sent_bytes(), m.raw_bytes.min(m.encoded_bytes));
        match selection.form {
            PayloadForm::Raw => prop_assert!(m.encoded_bytes > m.raw_bytes),
            PayloadForm::Encoded => prop_assert!(m.encoded_bytes <= m.raw_bytes),
        }
    }

    #[test]
    fn client_recovers_every_strategy(payload in uidl_like(), level in 0u32..=9) {
        let decoder = PayloadDecoder::new();
        for strategy in CompressionStrategy::all() {
            let selection = StrategySelector::new()
                .with_strategy(*strategy)
                .with_codec(GzipCodec::with_level(level))
                .select(payload.clone().into_bytes())
                .unwrap();

            // Sniffing alone must be enough for bodies that carry the prefix
            let text = decoder.decode_text(&selection.body, None).unwrap();
            prop_assert_eq!(&text, &payload);
        }
    }
}
