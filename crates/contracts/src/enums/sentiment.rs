use serde::{Deserialize, Serialize};

/// Тональность отзыва, размеченная моделью (колонка `sentimento_ia`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Метка в исходных данных
    pub fn code(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positivo",
            Sentiment::Negative => "Negativo",
            Sentiment::Neutral => "Neutro",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn all() -> Vec<Sentiment> {
        vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    }

    /// Парсинг из строки (португальские и английские метки, без учета регистра).
    /// Пустые и неизвестные значения дают `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Sentiment::all().into_iter().find(|s| {
            label.eq_ignore_ascii_case(s.code()) || label.eq_ignore_ascii_case(s.display_name())
        })
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
