pub mod archive;
pub mod auth;
pub mod files;
pub mod grants;
