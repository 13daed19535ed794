use voxbridge_engine::{
    AudioTranscoder, DecoderFactory, DecoderRegistry, NullSynthesizer, PassthroughTranscoder,
    RegistryDecoderFactory, SpeechSynthesizer,
};

#[tokio::test]
async fn test_null_decoder_through_registry_factory() {
    let factory = RegistryDecoderFactory::new(DecoderRegistry::new(), "null", 16_000);
    let mut decoder = factory.create("zh").unwrap();
    assert_eq!(decoder.language(), "zh");

    // 100ms of 16kHz 16-bit mono
    let chunk = vec![0u8; 3200];
    let outcome = decoder.accept_chunk(&chunk).await.unwrap();
    assert!(outcome.into_final().is_none());

    let hyp = decoder.flush().await.unwrap();
    assert!(hyp.is_final);
    assert!(hyp.text.is_empty());
}

#[tokio::test]
async fn test_unknown_engine_fails_at_factory() {
    let factory = RegistryDecoderFactory::new(DecoderRegistry::new(), "missing", 16_000);
    assert!(factory.create("zh").is_err());
}

#[tokio::test]
async fn test_synthesize_and_transcode_chunks() {
    let synth = NullSynthesizer::new().with_chunks(vec![vec![1u8; 4096], vec![2u8; 4096]]);
    let transcoder = PassthroughTranscoder;

    let mut rx = synth.synthesize("你好世界", "zh-CN-NullNeural").await.unwrap();
    let mut total = 0usize;
    while let Some(block) = rx.recv().await {
        let pcm = transcoder.decode(&block).await.unwrap();
        total += pcm.len();
    }
    assert_eq!(total, 8192);
}

#[tokio::test]
async fn test_voice_catalog_round_trip() {
    let synth = NullSynthesizer::new();
    let voices = synth.voices().await.unwrap();
    assert!(!voices.is_empty());
    let json = serde_json::to_string(&voices).unwrap();
    assert!(json.contains("short_name"));
}
