/// Git version baked in at build time (see build.rs).
pub const GIT_VERSION: &str = env!("GIT_VERSION");
