mod auth;
mod credentials;
mod tracks;

pub use auth::TokenManager;
pub use credentials::CredentialsError;
pub use credentials::CredentialsManager;
pub use credentials::prompt_credentials;
pub use tracks::TrackListError;
pub use tracks::TrackListManager;
pub use tracks::parse_rekordbox_export;
pub use tracks::read_rekordbox_export;
pub use tracks::scan_directory;
