use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::workflows::licensing::domain::DocumentCategory;

/// Stored status codes that select the conclusion branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodes {
    pub approved: i32,
    pub rejected: i32,
    pub revoked: i32,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            approved: 3,
            rejected: 4,
            revoked: 5,
        }
    }
}

/// Category value → expert role title used in expert lines and report signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpertTitles(BTreeMap<String, String>);

impl Default for ExpertTitles {
    fn default() -> Self {
        let titles = [
            ("legal-documents", "Эксперт по правовым критериям"),
            ("financial-documents", "Эксперт по финансовым критериям"),
            ("sport-documents", "Эксперт по спортивным критериям"),
            (
                "infrastrukturnye-kriterii",
                "Эксперт по инфраструктурным критериям",
            ),
            (
                "kriteriy-socialnoy-i-ekologicheskoy-otvetstvennosti",
                "Эксперт по критериям социальной и экологической ответственности",
            ),
            (
                "kadrovye-i-administrativnye-kriterii",
                "Эксперт по кадровым и административным критериям",
            ),
        ];
        Self(
            titles
                .into_iter()
                .map(|(value, title)| (value.to_string(), title.to_string()))
                .collect(),
        )
    }
}

impl ExpertTitles {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn insert(&mut self, value: impl Into<String>, title: impl Into<String>) {
        self.0.insert(value.into(), title.into());
    }

    /// Entries of `overrides` win over existing ones.
    pub fn merge(&mut self, overrides: ExpertTitles) {
        self.0.extend(overrides.0);
    }

    pub fn get(&self, value: &str) -> Option<&str> {
        self.0.get(value).map(String::as_str)
    }

    pub fn resolve<'a>(&'a self, category: &'a DocumentCategory) -> &'a str {
        self.get(&category.value).unwrap_or(&category.title)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fallback values printed on a solution when the stored snapshot leaves them blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionDefaults {
    pub meeting_place: String,
    pub department_name: String,
    pub secretary_name: String,
    pub control_position: String,
}

impl Default for SolutionDefaults {
    fn default() -> Self {
        Self {
            meeting_place: "г.Астана, пр. Бауыржана Момышулы 5а.".to_string(),
            department_name: "Комиссия по лицензированию футбольных клубов КФФ".to_string(),
            secretary_name: "Н.Еламанов".to_string(),
            control_position: "Председатель КЛФК".to_string(),
        }
    }
}

/// Rule set shared by the decision aggregator and the report builders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub status_codes: StatusCodes,
    pub expert_titles: ExpertTitles,
    pub solution_defaults: SolutionDefaults,
}
