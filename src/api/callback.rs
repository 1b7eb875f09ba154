use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{spotify::auth::exchange_code, types::AuthState, warning};

/// Handles the OAuth redirect.
///
/// The `state` parameter must match the one generated for the running
/// authorization; only then is the code exchanged and the token stored in
/// the shared state, where [`crate::spotify::auth::wait_for_token`] picks it up.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthState>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization was denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(auth_state) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if params.get("state") != Some(&auth_state.state) {
        warning!("Ignoring callback with mismatching state");
        return Html("<h4>State mismatch.</h4>");
    }

    let client = Client::new();
    match exchange_code(&client, &auth_state.token_url, &auth_state.credentials, code).await {
        Ok(token) => {
            auth_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
