pub mod accounts;
pub mod grants;
pub mod migration;
