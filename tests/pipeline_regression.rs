use std::io::Write;

use tweet_clean::{
    CancelToken, CleanError, ContractionTable, Corpus, EmojiOracle, FailurePolicy,
    FrequencyCorrector, PipelineConfig, Preprocessor, RawRecord, ReferenceList, Stage, score,
    top_ngrams,
};

const FIXTURE: &str = "I'm @user at https://x.co!!! 😀 sooooo happy #great 123";

fn tweets() -> Vec<&'static str> {
    vec![
        FIXTURE,
        "Can't sleep... took 2 ibuprofen/aspirin @doc_who",
        "",
        "well-known fact: this &amp; that ✨✨",
        "WOW!!!?? http://t.co/AbC the best #2020",
        "   spaced    out   ",
    ]
}

#[test]
fn end_to_end_fixture() {
    let preprocessor = Preprocessor::new().unwrap();
    let processed = preprocessor
        .preprocess(Corpus::from_texts([FIXTURE]))
        .unwrap();
    assert_eq!(processed.corpus.into_texts(), vec!["i am at !  so happy"]);
}

#[test]
fn output_length_and_order_match_input() {
    let input = tweets();
    let preprocessor = Preprocessor::new().unwrap();
    let processed = preprocessor.preprocess(Corpus::from_texts(input.clone())).unwrap();

    assert_eq!(processed.corpus.len(), input.len());
    let indices: Vec<usize> = processed.corpus.iter().map(|r| r.index()).collect();
    assert_eq!(indices, (0..input.len()).collect::<Vec<_>>());
    assert_eq!(processed.report.stages_applied.len(), Stage::DEFAULT_ORDER.len());
}

#[test]
fn hashtags_are_removed_before_numbers() {
    let preprocessor = Preprocessor::new().unwrap();
    // The whole hashtag goes, digits included
    assert_eq!(preprocessor.clean_text("#2020 is cool 123").unwrap(), "is cool");
}

#[test]
fn parallel_matches_sequential() {
    let sequential = Preprocessor::new().unwrap();
    let parallel = Preprocessor::builder(PipelineConfig {
        parallel: true,
        ..PipelineConfig::default()
    })
    .build()
    .unwrap();

    let corpus = Corpus::from_texts(tweets());
    let a = sequential.preprocess(corpus.clone()).unwrap();
    let b = parallel.preprocess(corpus).unwrap();
    assert_eq!(a.corpus, b.corpus);
}

#[test]
fn skipped_records_keep_their_original_indices() {
    let raw = vec![
        RawRecord::from("Hello @you"),
        RawRecord::Missing,
        RawRecord::Bytes(vec![0xc3, 0x28]),
        RawRecord::from("Bye!!!"),
    ];
    let ingested = Corpus::ingest(raw, FailurePolicy::SkipAndReport).unwrap();
    assert_eq!(ingested.skipped, vec![1, 2]);

    let processed = Preprocessor::new().unwrap().preprocess(ingested.corpus).unwrap();
    let out: Vec<(usize, &str)> = processed
        .corpus
        .iter()
        .map(|r| (r.index(), r.text()))
        .collect();
    assert_eq!(out, vec![(0, "hello"), (3, "bye!")]);
}

#[test]
fn invalid_record_fails_batch_by_default() {
    let raw = vec![Some("ok"), None];
    let err = Corpus::ingest(raw, PipelineConfig::default().failure_policy).unwrap_err();
    assert!(matches!(err, CleanError::InvalidInput { index: 1, .. }));
}

/// Cancels the run the first time it is consulted.
struct CancellingOracle(CancelToken);

impl EmojiOracle for CancellingOracle {
    fn is_emoji(&self, _grapheme: &str) -> bool {
        self.0.cancel();
        false
    }
}

#[test]
fn cancellation_takes_effect_at_the_next_stage_boundary() {
    let token = CancelToken::new();
    let config = PipelineConfig {
        spelling_correction: true,
        ..PipelineConfig::default()
    };
    let preprocessor = Preprocessor::builder(config)
        .with_emoji_oracle(CancellingOracle(token.clone()))
        .with_spelling(FrequencyCorrector::from_counts("t", [("cafe", 1u64)]))
        .with_cancel_token(token)
        .build()
        .unwrap();

    // The emoji stage finishes; spelling never starts
    let err = preprocessor
        .preprocess(Corpus::from_texts(["café"]))
        .unwrap_err();
    assert!(matches!(
        err,
        CleanError::Cancelled {
            completed: 11,
            total: 12
        }
    ));
}

#[test]
fn file_backed_resources() {
    let mut contractions = tempfile::NamedTempFile::new().unwrap();
    writeln!(contractions, "# slang").unwrap();
    writeln!(contractions, "idk\tI do not know").unwrap();

    let mut frequencies = tempfile::NamedTempFile::new().unwrap();
    writeln!(frequencies, "i 300").unwrap();
    writeln!(frequencies, "do 200").unwrap();
    writeln!(frequencies, "not 150").unwrap();
    writeln!(frequencies, "know 90").unwrap();
    writeln!(frequencies, "happy 120").unwrap();
    writeln!(frequencies, "so 80").unwrap();
    writeln!(frequencies, "lol 15").unwrap();

    let config = PipelineConfig {
        spelling_correction: true,
        ..PipelineConfig::default()
    };
    let preprocessor = Preprocessor::builder(config)
        .with_contractions(ContractionTable::load(contractions.path()).unwrap())
        .with_spelling(FrequencyCorrector::load(frequencies.path()).unwrap())
        .build()
        .unwrap();

    let processed = preprocessor
        .preprocess(Corpus::from_texts(["IDK lol", "sooo happy"]))
        .unwrap();
    assert_eq!(
        processed.corpus.into_texts(),
        vec!["I do not know lol", "so happy"]
    );

    let versions = &processed.report.resource_versions;
    assert_eq!(
        versions.get("contractions").map(String::as_str),
        Some(contractions.path().display().to_string().as_str())
    );
    assert!(versions.contains_key("spelling"));
}

#[test]
fn missing_resource_is_fatal() {
    let err = ContractionTable::load(std::path::Path::new("/nonexistent/table.tsv")).unwrap_err();
    assert!(matches!(err, CleanError::ResourceLoad { .. }));
}

#[test]
fn config_loaded_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"replacements": {{"number": "NUM"}}, "elongation_min_run": 3}}"#
    )
    .unwrap();
    let config = PipelineConfig::from_json_file(file.path()).unwrap();
    let preprocessor = Preprocessor::builder(config).build().unwrap();
    assert_eq!(
        preprocessor.clean_text("took 2 pills, feeling sooo good").unwrap(),
        "took NUM pills, feeling so good"
    );
}

#[test]
fn scoring_cleaned_corpus() {
    let mut meds = tempfile::NamedTempFile::new().unwrap();
    writeln!(meds, "aspirin").unwrap();
    writeln!(meds, "ibuprofen").unwrap();
    let reference = ReferenceList::load(meds.path()).unwrap();

    assert_eq!(
        score(&Corpus::from_texts(["take aspirin now"]), &reference),
        vec![1]
    );

    let processed = Preprocessor::new()
        .unwrap()
        .preprocess(Corpus::from_texts(["Took ASPIRIN/ibuprofen", "nothing"]))
        .unwrap();
    assert_eq!(score(&processed.corpus, &reference), vec![2, 0]);
}

#[test]
fn ngrams_over_cleaned_text() {
    let processed = Preprocessor::new()
        .unwrap()
        .preprocess(Corpus::from_texts([
            "Headache again, want aspirin",
            "want aspirin NOW",
        ]))
        .unwrap();
    let texts = processed.corpus.into_texts();
    let top = top_ngrams(&texts, 2, 1, true).unwrap();
    assert_eq!(top, vec![("want aspirin".to_string(), 2)]);
}
