use tsuyaku_config::Config;
use tsuyaku_translator::{Payload, Translation};
use tsuyaku_types::Backend;

use crate::dispatcher::DispatchContext;

pub async fn translate_text(
    ctx: &DispatchContext,
    backend: Backend,
    text: &str,
    config: &Config,
) -> Translation {
    let Some(client) = ctx.backends.get(backend) else {
        tracing::warn!("No client registered for {backend}");
        return Translation::new(backend, format!("{backend} is not available"));
    };

    tracing::debug!(">>> [{backend}] Translating {} chars", text.len());
    client.translate(&Payload::Text(text.to_owned()), config).await
}
