
use tsuyaku_config::Config;

/// Config pointing every backend at the mock server
fn config_for(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.deepl.api_key = "deepl-key".into();
    config.deepl.api_url = format!("{server_uri}/v2/translate");
    config.openai.api_key = "sk-test".into();
    config.openai.endpoint = format!("{server_uri}/v1/chat/completions");
    config.openai.model = "test-model".into();
    config
}
