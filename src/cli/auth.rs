use crate::{
    config::Config,
    error, info,
    management::{CredentialsManager, TokenManager},
    spotify, success,
};

/// Prompts for the application credentials and stores them.
pub async fn credentials(config: &Config) {
    let manager = CredentialsManager::new(config.credentials_path.clone());
    match manager.generate().await {
        Ok(_) => success!("Saved to {}", config.credentials_path.display()),
        Err(e) => error!("Failed to store credentials: {}", e),
    }
}

/// Runs the OAuth flow and caches the token in the data directory.
pub async fn auth(config: &Config) {
    let manager = CredentialsManager::new(config.credentials_path.clone());
    let credentials = match manager.load_or_prompt().await {
        Ok(c) => c,
        Err(e) => error!("Failed to load credentials: {}", e),
    };

    info!("Waiting for authorization in the browser...");
    let token = match spotify::auth::authorize(config, credentials.clone()).await {
        Ok(t) => t,
        Err(e) => error!("{}", e),
    };

    let token_manager = TokenManager::new(
        token,
        config.token_path(),
        credentials,
        config.token_url.clone(),
    );
    if let Err(e) = token_manager.persist().await {
        error!("Failed to save token to cache: {}", e);
    }

    success!("Authentication successful!");
}
