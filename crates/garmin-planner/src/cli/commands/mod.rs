pub mod auth;
pub mod download;
pub mod upload;

pub use auth::{login, logout, status};
pub use download::download;
pub use upload::{upload, UploadArgs};
