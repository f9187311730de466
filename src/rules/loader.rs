use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::directive::DirectiveError;
use super::store::RuleStore;
use crate::error::Result;

/// Ошибка в конкретной строке файла правил
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub keyword: String,
    pub error: DirectiveError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "строка {}: {}: {}", self.line, self.keyword, self.error)
    }
}

/// Итог загрузки файла правил
#[derive(Debug, Default)]
pub struct LoadReport {
    pub applied: usize,
    pub errors: Vec<LineError>,
    pub missing: bool,
}

impl LoadReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Прочитать файл правил и передать каждую директиву в хранилище.
/// Хранилище должно быть очищено вызывающим кодом.
pub fn load_rules_file(path: &Path, namespace: &str, store: &mut RuleStore) -> Result<LoadReport> {
    if !path.exists() {
        warn!("Файл правил {:?} не найден, правила не заданы", path);
        return Ok(LoadReport {
            missing: true,
            ..LoadReport::default()
        });
    }

    let text = fs::read_to_string(path)?;
    let report = load_rules_str(&text, namespace, store);

    info!(
        "Загружено директив: {} из {:?} (правил: {}, глобальная насыщенность: {})",
        report.applied,
        path,
        store.len(),
        store.global_saturation()
    );

    Ok(report)
}

pub(crate) fn load_rules_str(text: &str, namespace: &str, store: &mut RuleStore) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, raw) in text.lines().enumerate() {
        let stripped = strip_comment(raw);
        let line = stripped.trim();
        if line.is_empty() {
            continue;
        }

        let line_no = index + 1;
        let Some((keyword, value)) = line.split_once('=') else {
            report.errors.push(LineError {
                line: line_no,
                keyword: line.to_string(),
                error: DirectiveError::Line,
            });
            continue;
        };

        let keyword = keyword.trim();
        match store.apply_directive(namespace, keyword, value.trim()) {
            Ok(()) => {
                debug!("Строка {}: {} = {}", line_no, keyword, value.trim());
                report.applied += 1;
            }
            Err(error) => {
                let err = LineError {
                    line: line_no,
                    keyword: keyword.to_string(),
                    error,
                };
                warn!("Ошибка в файле правил, {}", err);
                report.errors.push(err);
            }
        }
    }

    report
}

// `##` экранирует решётку, как в hyprlang
fn strip_comment(line: &str) -> std::borrow::Cow<'_, str> {
    if !line.contains('#') {
        return line.into();
    }

    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' {
            if chars.peek() == Some(&'#') {
                chars.next();
                out.push('#');
                continue;
            }
            break;
        }
        out.push(c);
    }
    out.into()
}
