use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use thiserror::Error;

use crate::{config::DEFAULT_REDIRECT_URI, types::Credentials};

const DASHBOARD_URL: &str = "https://developer.spotify.com/dashboard/";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed credentials file: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("credential prompt failed: {0}")]
    Prompt(io::Error),
    #[error("credential prompt aborted")]
    Aborted,
}

/// Reads and writes the `credentials.json` file.
pub struct CredentialsManager {
    path: PathBuf,
}

impl CredentialsManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub async fn load(&self) -> Result<Credentials, CredentialsError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|source| CredentialsError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn persist(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| CredentialsError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let json = serde_json::to_string_pretty(credentials)?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|source| CredentialsError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads the credentials, asking for them on the terminal when the file is missing.
    pub async fn load_or_prompt(&self) -> Result<Credentials, CredentialsError> {
        if self.exists() {
            return self.load().await;
        }

        self.generate().await
    }

    /// Interactively collects new credentials and writes them to disk.
    pub async fn generate(&self) -> Result<Credentials, CredentialsError> {
        let credentials = {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            prompt_credentials(&mut input, &mut output)?
        };

        self.persist(&credentials).await?;
        Ok(credentials)
    }
}

/// Asks for the client id and secret. The redirect URI is always the local default.
pub fn prompt_credentials<R, W>(
    input: &mut R,
    output: &mut W,
) -> Result<Credentials, CredentialsError>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "\nTo connect to spotify we require some tokens")
        .map_err(CredentialsError::Prompt)?;
    writeln!(output, "Register app to get tokens first at: {DASHBOARD_URL}")
        .map_err(CredentialsError::Prompt)?;

    loop {
        let answer = ask(input, output, "\nHas this been done? (y/n) ")?;
        if answer.trim().eq_ignore_ascii_case("y") {
            break;
        }
    }

    let client_id = ask(input, output, "\nClient ID: ")?;
    let client_secret = ask(input, output, "Client Secret: ")?;

    Ok(Credentials {
        client_id: client_id.trim().to_string(),
        client_secret: client_secret.trim().to_string(),
        redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
    })
}

fn ask<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<String, CredentialsError>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{question}").map_err(CredentialsError::Prompt)?;
    output.flush().map_err(CredentialsError::Prompt)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(CredentialsError::Prompt)?;
    if read == 0 {
        return Err(CredentialsError::Aborted);
    }
    Ok(line)
}
