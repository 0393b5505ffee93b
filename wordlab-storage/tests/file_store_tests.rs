use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use tempfile::TempDir;
use wordlab_core::*;
use wordlab_storage::JsonFileStore;

fn experiment(stimulus: &str) -> Experiment {
    Experiment::new(NewExperiment {
        name: Some("colours".to_string()),
        stimulus: stimulus.to_string(),
        selected_models: vec![ModelSpec::new(ProviderId::Anthropic, "claude-3-haiku-20240307")],
        configs: vec![ExperimentConfig::new(0.5, 20)],
        samples_per_config: 2,
    })
    .unwrap()
}

fn sample(experiment: &Experiment, word: &str) -> Sample {
    Sample::new(
        experiment.id,
        ProviderId::Anthropic,
        "claude-3-haiku-20240307",
        0.5,
        20,
        word,
        250,
        Decimal::new(12, 6),
    )
}

async fn store() -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().join("data")).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_open_creates_layout() {
    let (_dir, store) = store().await;
    for sub in ["experiments", "samples", "results"] {
        assert!(store.root().join(sub).is_dir());
    }
}

#[tokio::test]
async fn test_experiment_round_trip_and_overwrite() {
    let (_dir, store) = store().await;
    let mut exp = experiment("Name a colour");

    store.save_experiment(&exp).await.unwrap();
    exp.start().unwrap();
    exp.complete(Decimal::new(24, 6)).unwrap();
    store.save_experiment(&exp).await.unwrap();

    let loaded = store.load_experiment(&exp.id).await.unwrap().unwrap();
    assert_eq!(loaded, exp);
    assert_eq!(loaded.status, ExperimentStatus::Completed);
}

#[rstest]
#[case::single(&["red"])]
#[case::repeated_word(&["red", "blue", "red"])]
#[case::many(&["a", "b", "c", "d", "e", "f", "g", "h"])]
#[tokio::test]
async fn test_samples_append_in_order(#[case] words: &[&str]) {
    let (_dir, store) = store().await;
    let exp = experiment("Name a colour");

    for word in words {
        store.save_sample(&sample(&exp, word)).await.unwrap();
    }

    let loaded = store.samples_for(&exp.id).await.unwrap();
    let loaded_words: Vec<&str> = loaded.iter().map(|s| s.word.as_str()).collect();
    assert_eq!(loaded_words, words.to_vec());
    assert_eq!(loaded[0].cost, Decimal::new(12, 6));
}

#[tokio::test]
async fn test_missing_documents() {
    let (_dir, store) = store().await;
    let id = ExperimentId::new();

    assert!(store.load_experiment(&id).await.unwrap().is_none());
    assert!(store.load_results(&id).await.unwrap().is_none());
    assert!(store.samples_for(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_results_round_trip() {
    let (_dir, store) = store().await;
    let exp = experiment("Name a colour");
    let results = ExperimentResults::empty(exp.id, exp.created_at);

    store.save_results(&results).await.unwrap();
    let loaded = store.load_results(&exp.id).await.unwrap().unwrap();
    assert_eq!(loaded, results);
}

#[tokio::test]
async fn test_list_skips_corrupt_files_and_sorts_newest_first() {
    let (_dir, store) = store().await;
    let older = experiment("first");
    let newer = experiment("second");

    store.save_experiment(&older).await.unwrap();
    store.save_experiment(&newer).await.unwrap();
    std::fs::write(store.root().join("experiments").join("garbage.json"), b"{not json").unwrap();
    std::fs::write(store.root().join("experiments").join("notes.txt"), b"ignored").unwrap();

    let listed = store.list_experiments().await.unwrap();
    let ids: Vec<ExperimentId> = listed.iter().map(|e| e.id).collect();

    assert_eq!(listed.len(), 2);
    if newer.created_at > older.created_at {
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}

#[tokio::test]
async fn test_reopen_sees_existing_data() {
    let dir = TempDir::new().unwrap();
    let exp = experiment("persisted");
    {
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.save_experiment(&exp).await.unwrap();
        store.save_sample(&sample(&exp, "green")).await.unwrap();
    }

    let store = JsonFileStore::open(dir.path()).await.unwrap();
    assert!(store.load_experiment(&exp.id).await.unwrap().is_some());
    assert_eq!(store.samples_for(&exp.id).await.unwrap().len(), 1);
}
