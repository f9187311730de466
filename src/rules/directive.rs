use thiserror::Error;

use super::store::{AppRule, RuleStore};

/// Ошибки разбора директив. Текст ошибки уходит пользователю как есть.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("failed to parse saturation value")]
    Saturation,

    #[error("requires 2-5 params: class,sat[,resX,resY[,refreshRate]]")]
    ParamCount(usize),

    #[error("failed to parse line")]
    Line,

    #[error("unknown keyword '{0}'")]
    UnknownKeyword(String),
}

pub fn parse_global_saturation(value: &str) -> Result<f32, DirectiveError> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|_| DirectiveError::Saturation)
}

/// `class,sat[,resX,resY[,refreshRate]]`
pub fn parse_app_rule(value: &str) -> Result<AppRule, DirectiveError> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();

    if !(2..=5).contains(&fields.len()) {
        return Err(DirectiveError::ParamCount(fields.len()));
    }

    let mut rule = AppRule::new(fields[0], parse_number::<f32>(fields[1])?);

    match fields.len() {
        3 => {
            // Одиночное поле разрешения: проверяем число, но набор считаем отсутствующим
            parse_number::<i32>(fields[2])?;
        }
        4 | 5 => {
            rule = rule.with_resolution(parse_number(fields[2])?, parse_number(fields[3])?);
            if let Some(rate) = fields.get(4) {
                rule = rule.with_refresh_rate(parse_number(rate)?);
            }
        }
        _ => {}
    }

    Ok(rule)
}

fn parse_number<T: std::str::FromStr>(field: &str) -> Result<T, DirectiveError> {
    field.parse::<T>().map_err(|_| DirectiveError::Line)
}

impl RuleStore {
    /// Обработать одну директиву `<namespace>-saturation` / `<namespace>-app`.
    /// При ошибке хранилище не меняется.
    pub fn apply_directive(
        &mut self,
        namespace: &str,
        keyword: &str,
        value: &str,
    ) -> Result<(), DirectiveError> {
        let suffix = keyword
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('-'));

        match suffix {
            Some("saturation") => {
                self.set_global_saturation(parse_global_saturation(value)?);
            }
            Some("app") => {
                self.add_rule(parse_app_rule(value)?);
            }
            _ => return Err(DirectiveError::UnknownKeyword(keyword.to_string())),
        }

        Ok(())
    }
}
