mod auth;
mod playlist;
mod session;

pub use auth::AUTHORIZATION_TTL;
pub use auth::AuthorizationBroker;
pub use playlist::PlaylistAssembler;
pub use session::SessionDirectory;
