use std::{env, sync::Once};

use student_registry::{
    config::{self, SummarizationProvider},
    records::Student,
    summarization::get_summarization_client,
};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() -> &'static config::Config {
    INIT.call_once(|| {
        set_default_env("SUMMARIZATION_PROVIDER", "ollama");
        set_default_env("OLLAMA_URL", "http://127.0.0.1:11434");
        set_default_env("SUMMARY_TIMEOUT_SECS", "120");
    });
    config::init_config(None).expect("config from environment");
    config::get_config()
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_ollama_summary_roundtrip() {
    let config = init_config_once();
    assert_eq!(config.summarization_provider, SummarizationProvider::Ollama);

    let client = get_summarization_client(config).expect("summarization client");
    let summary = client
        .summarize_student(&Student {
            id: 1,
            name: "Ann".into(),
            age: 20,
            email: "a@x.com".into(),
        })
        .await
        .expect("failed to request summary from provider");
    assert!(!summary.is_empty(), "summary should not be empty");
}
