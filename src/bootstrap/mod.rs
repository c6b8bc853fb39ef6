//! Process bootstrap helpers run once from `main` before any query work.

pub mod logger;
