use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::DatabaseError;

/// Pipeline position of a deal. Any stage may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    New,
    Qualified,
    Won,
    Lost,
}

impl Stage {
    pub const NAMES: &'static [&'static str] = &["new", "qualified", "won", "lost"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Qualified => "qualified",
            Stage::Won => "won",
            Stage::Lost => "lost",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Stage::New),
            "qualified" => Ok(Stage::Qualified),
            "won" => Ok(Stage::Won),
            "lost" => Ok(Stage::Lost),
            other => Err(format!(
                "invalid stage '{}', expected one of: {}",
                other,
                Stage::NAMES.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub stage: Stage,
}

#[derive(Debug, FromRow)]
pub(crate) struct DealRow {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub stage: String,
}

impl TryFrom<DealRow> for Deal {
    type Error = DatabaseError;

    fn try_from(row: DealRow) -> Result<Self, Self::Error> {
        let stage = row.stage.parse().map_err(|_| DatabaseError::InvalidColumn {
            column: "deals.stage",
            value: row.stage.clone(),
        })?;
        Ok(Deal {
            id: row.id,
            title: row.title,
            amount: row.amount,
            stage,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDeal {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChange {
    pub stage: Stage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_round_trip_through_from_str() {
        for name in Stage::NAMES {
            let stage: Stage = name.parse().unwrap();
            assert_eq!(stage.as_str(), *name);
        }
        assert!("closed".parse::<Stage>().is_err());
    }

    #[test]
    fn unknown_stored_stage_is_an_error() {
        let row = DealRow {
            id: 1,
            title: "X".to_string(),
            amount: 0.0,
            stage: "archived".to_string(),
        };
        assert!(matches!(
            Deal::try_from(row),
            Err(DatabaseError::InvalidColumn { column: "deals.stage", .. })
        ));
    }

    #[test]
    fn new_deal_defaults_to_new_stage() {
        assert_eq!(Stage::default(), Stage::New);
        let body: NewDeal = serde_json::from_value(serde_json::json!({ "title": "Project X" })).unwrap();
        assert_eq!(body.stage, None);
        assert_eq!(body.amount, None);
    }
}
