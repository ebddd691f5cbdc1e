// Three security tiers:
// public (no auth) -> protected (JWT auth) -> elevated (JWT auth + admin claim)
pub mod elevated;
pub mod protected;
pub mod public;
