//! Правила насыщенности: хранилище, разбор директив и загрузка файла правил.
//!
//! Хранилище полностью пересобирается при каждой перезагрузке конфигурации,
//! поэтому устаревшие правила никогда не переживают reload.

mod directive;
mod loader;
mod store;

pub use loader::load_rules_file;
pub use store::{AppRule, RuleStore};
