use crate::events::Resolution;

/// Правило для одного класса приложений
#[derive(Debug, Clone, PartialEq)]
pub struct AppRule {
    pub class: String,
    pub saturation: f32,
    pub resolution: Option<Resolution>,
    pub refresh_rate: Option<f32>,
}

impl AppRule {
    pub fn new(class: impl Into<String>, saturation: f32) -> Self {
        Self {
            class: class.into(),
            saturation,
            resolution: None,
            refresh_rate: None,
        }
    }

    pub fn with_resolution(mut self, width: i32, height: i32) -> Self {
        self.resolution = Some(Resolution::new(width, height));
        self
    }

    pub fn with_refresh_rate(mut self, refresh_rate: f32) -> Self {
        self.refresh_rate = Some(refresh_rate);
        self
    }

    /// Разрешение, которое действительно будет применено (обе стороны > 0)
    pub fn resolution_override(&self) -> Option<Resolution> {
        self.resolution.filter(Resolution::is_valid)
    }
}

/// Упорядоченный список правил плюс глобальная насыщенность (0 = выключена)
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<AppRule>,
    global_saturation: f32,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.global_saturation = 0.0;
    }

    pub fn add_rule(&mut self, rule: AppRule) {
        self.rules.push(rule);
    }

    pub fn set_global_saturation(&mut self, saturation: f32) {
        self.global_saturation = saturation;
    }

    pub fn global_saturation(&self) -> f32 {
        self.global_saturation
    }

    pub fn global_enabled(&self) -> bool {
        self.global_saturation > 0.0
    }

    /// Первое правило с точно совпадающим классом
    pub fn lookup(&self, class: &str) -> Option<&AppRule> {
        self.rules.iter().find(|rule| rule.class == class)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
