// End-to-end fitting through the public API: corpus building, EM fitting and
// topic reporting.

use approx::assert_abs_diff_eq;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::SeedableRng;

use plsa::{fit, ConvergenceMetric, Corpus, EmEngine, PlsaConfig, PlsaError, Silent};

fn animals() -> Corpus {
    Corpus::from_documents(vec![
        vec!["cat", "dog"],
        vec!["dog", "dog", "fish"],
        vec!["cat", "fish"],
    ])
}

/// Two clearly separated themes sharing no words.
fn two_themes() -> Corpus {
    let mut docs = Vec::new();
    for _ in 0..6 {
        docs.push(vec!["stock", "market", "stock", "price", "market"]);
        docs.push(vec!["goal", "match", "team", "goal", "team"]);
    }
    Corpus::from_documents(docs)
}

#[test]
fn fitted_columns_sum_to_one() {
    let corpus = animals();
    let model = fit(&corpus, PlsaConfig::new(2).seed(2024).max_iterations(10_000), &mut Silent).unwrap();
    assert!(model.iterations() < 10_000);
    for s in model.word_topic().sum_axis(Axis(0)).iter() {
        assert_abs_diff_eq!(*s, 1.0, epsilon = 1e-6);
    }
    for s in model.topic_document().sum_axis(Axis(0)).iter() {
        assert_abs_diff_eq!(*s, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn top_words_are_stable_across_calls() {
    let corpus = animals();
    let model = fit(&corpus, PlsaConfig::new(2).seed(8), &mut Silent).unwrap();
    let first = model.top_words(2);
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|words| words.len() == 2));
    assert_eq!(first, model.top_words(2));
}

#[test]
fn separates_disjoint_themes() {
    let corpus = two_themes();
    let config = PlsaConfig::new(2)
        .seed(31)
        .metric(ConvergenceMetric::LogLikelihood)
        .convergence_threshold(1e-6)
        .max_iterations(10_000);
    let model = fit(&corpus, config, &mut Silent).unwrap();

    let finance = ["stock", "market", "price"];
    let sports = ["goal", "match", "team"];
    let topics = model.top_words(3);
    let finance_topic = topics.iter().position(|t| t.iter().any(|w| w == "stock")).unwrap();
    let mut finance_words = topics[finance_topic].clone();
    let mut sports_words = topics[1 - finance_topic].clone();
    finance_words.sort();
    sports_words.sort();
    let mut expected_finance: Vec<&str> = finance.to_vec();
    let mut expected_sports: Vec<&str> = sports.to_vec();
    expected_finance.sort();
    expected_sports.sort();
    assert_eq!(finance_words, expected_finance);
    assert_eq!(sports_words, expected_sports);

    let dominant = model.dominant_topics();
    for (d, &k) in dominant.iter().enumerate() {
        let expected = if d % 2 == 0 { finance_topic } else { 1 - finance_topic };
        assert_eq!(k, expected, "document {}", d);
    }
}

#[test]
fn topics_report_uses_configured_word_count() {
    let corpus = two_themes();
    let model = fit(&corpus, PlsaConfig::new(2).seed(4).top_n_words(4), &mut Silent).unwrap();
    let topics = model.topics();
    assert_eq!(topics.len(), 2);
    for (k, topic) in topics.iter().enumerate() {
        assert_eq!(topic.index, k);
        assert_eq!(topic.words.len(), 4);
        assert!(topic.words.windows(2).all(|w| w[0].probability >= w[1].probability));
    }
}

#[test]
fn engine_exposes_steps_between_initialization_and_fit() {
    let corpus = animals();
    let mut rng = StdRng::seed_from_u64(12);
    let mut engine = EmEngine::new(&corpus, PlsaConfig::new(2), &mut rng).unwrap();
    let before = engine.metric().unwrap();
    engine.step().unwrap();
    engine.step().unwrap();
    assert_eq!(engine.iterations(), 2);
    assert!(engine.metric().unwrap().is_finite());
    assert!(before.is_finite());
    let model = engine.fit(&mut Silent).unwrap();
    assert!(model.iterations() >= 3);
}

#[test]
fn invalid_configurations_are_reported() {
    let empty = Corpus::from_documents(Vec::<Vec<String>>::new());
    let err = fit(&empty, PlsaConfig::new(2).seed(0), &mut Silent).unwrap_err();
    assert!(matches!(err, PlsaError::InvalidConfiguration(_)));

    let corpus = animals();
    let err = fit(&corpus, PlsaConfig::new(0), &mut Silent).unwrap_err();
    assert!(matches!(err, PlsaError::InvalidConfiguration(_)));
    assert!(err.to_string().starts_with("Invalid configuration"));
}
