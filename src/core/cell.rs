use crate::core::rule_helper;
use serde::{Deserialize, Serialize};
use std::fmt;
use tsify::Tsify;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    Normal,
    Snake,
    Ladder,
    Finish,
}

impl CellType {
    pub fn as_str(self) -> &'static str {
        match self {
            CellType::Normal => "normal",
            CellType::Snake => "snake",
            CellType::Ladder => "ladder",
            CellType::Finish => "finish",
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self, CellType::Snake | CellType::Ladder)
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub number: u32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    pub connects_to: Option<u32>,
}

impl Cell {
    pub fn normal(number: u32) -> Self {
        Self {
            number,
            cell_type: CellType::Normal,
            connects_to: None,
        }
    }

    pub fn finish(number: u32) -> Self {
        Self {
            number,
            cell_type: CellType::Finish,
            connects_to: None,
        }
    }

    pub fn snake(number: u32, connects_to: u32) -> Self {
        Self {
            number,
            cell_type: CellType::Snake,
            connects_to: Some(connects_to),
        }
    }

    pub fn ladder(number: u32, connects_to: u32) -> Self {
        Self {
            number,
            cell_type: CellType::Ladder,
            connects_to: Some(connects_to),
        }
    }

    /// Cell used for numbers the board does not configure.
    pub fn synthetic(number: u32) -> Self {
        if number == rule_helper::FINISH_CELL {
            Self::finish(number)
        } else {
            Self::normal(number)
        }
    }

    pub fn is_special(&self) -> bool {
        self.cell_type.is_special()
    }

    /// Where a piece landing on this cell ends up.
    pub fn destination(&self) -> u32 {
        if self.is_special() {
            self.connects_to.unwrap_or(self.number)
        } else {
            self.number
        }
    }

    pub fn check(&self) -> Result<(), String> {
        if !rule_helper::is_cell_number(self.number) {
            return Err(format!("cell {} is outside the board", self.number));
        }

        match (self.cell_type, self.connects_to) {
            (CellType::Snake, Some(dest)) if dest >= self.number => Err(format!(
                "snake at {} must lead down but leads to {dest}",
                self.number
            )),
            (CellType::Ladder, Some(dest)) if dest <= self.number => Err(format!(
                "ladder at {} must lead up but leads to {dest}",
                self.number
            )),
            (CellType::Snake | CellType::Ladder, Some(dest)) if !rule_helper::is_cell_number(dest) => {
                Err(format!(
                    "{} at {} leads off the board to {dest}",
                    self.cell_type, self.number
                ))
            }
            (CellType::Snake | CellType::Ladder, None) => Err(format!(
                "{} at {} has no destination",
                self.cell_type, self.number
            )),
            (CellType::Normal | CellType::Finish, Some(dest)) => Err(format!(
                "{} cell {} must not lead anywhere but leads to {dest}",
                self.cell_type, self.number
            )),
            (CellType::Finish, None) if self.number != rule_helper::FINISH_CELL => Err(format!(
                "finish cell must be {} but is {}",
                rule_helper::FINISH_CELL,
                self.number
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connects_to {
            Some(dest) => write!(f, "{};{}->{}", self.number, self.cell_type, dest),
            None => write!(f, "{};{}", self.number, self.cell_type),
        }
    }
}
