use crate::core::{
    cell::{Cell, CellType},
    rule_helper,
};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};
use thiserror::Error;

const CLASSIC_SNAKES: [(u32, u32); 10] = [
    (16, 6),
    (47, 26),
    (49, 11),
    (56, 53),
    (62, 19),
    (64, 60),
    (87, 24),
    (93, 73),
    (95, 75),
    (98, 78),
];

const CLASSIC_LADDERS: [(u32, u32); 9] = [
    (1, 38),
    (4, 14),
    (9, 31),
    (21, 42),
    (28, 84),
    (36, 44),
    (51, 67),
    (71, 91),
    (80, 100),
];

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[readonly::make]
pub struct BoardSpecification {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl BoardSpecification {
    /// Accepts either `{ "name": ..., "cells": [...] }` or a bare cell list.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Named(BoardSpecification),
            Cells(Vec<Cell>),
        }

        Ok(match serde_json::from_str::<Document>(json)? {
            Document::Named(spec) => spec,
            Document::Cells(cells) => BoardSpecification {
                name: "BoardCustom".to_string(),
                cells,
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[readonly::make]
pub struct Board {
    pub name: String,
    pub cells: BTreeMap<u32, Cell>, // only configured cells, keyed by number
}

impl Board {
    pub fn new(name: impl Into<String>, cells: impl IntoIterator<Item = Cell>) -> Self {
        Board {
            name: name.into(),
            cells: cells.into_iter().map(|cell| (cell.number, cell)).collect(),
        }
    }

    pub fn classic() -> Self {
        let snakes = CLASSIC_SNAKES
            .iter()
            .map(|&(number, dest)| Cell::snake(number, dest));
        let ladders = CLASSIC_LADDERS
            .iter()
            .map(|&(number, dest)| Cell::ladder(number, dest));
        let finish = std::iter::once(Cell::finish(rule_helper::FINISH_CELL));

        Board::new(rule_helper::DEFAULT_BOARD_NAME, snakes.chain(ladders).chain(finish))
    }

    pub fn from_json_str(json: &str) -> Result<Self, BoardLoadError> {
        let spec = BoardSpecification::from_json_str(json)?;
        Self::from_spec(spec)
    }

    pub fn from_json_file<P: AsRef<Path>>(board_path: P) -> Result<Self, BoardLoadError> {
        let board_text = fs::read_to_string(board_path)?;
        Self::from_json_str(&board_text)
    }

    fn from_spec(spec: BoardSpecification) -> Result<Self, BoardLoadError> {
        let mut seen = HashSet::new();
        let duplicates = spec
            .cells
            .iter()
            .filter(|cell| !seen.insert(cell.number))
            .map(|cell| format!("cell {} is configured more than once", cell.number))
            .collect::<Vec<_>>();
        if !duplicates.is_empty() {
            return Err(BoardLoadError::Invalid(duplicates));
        }

        let board = Board::new(spec.name.clone(), spec.cells.iter().copied());
        board.is_valid().map_err(BoardLoadError::Invalid)?;
        Ok(board)
    }

    pub fn is_valid(&self) -> Result<(), Vec<String>> {
        let mistakes = self
            .cells
            .values()
            .filter_map(|cell| cell.check().err())
            .collect::<Vec<_>>();

        if mistakes.is_empty() {
            Ok(())
        } else {
            Err(mistakes)
        }
    }

    /// Cell for `number`, configured or synthetic.
    ///
    /// Every number resolves to a cell: numbers the board does not configure,
    /// including ones outside `1..=100`, yield a synthetic `normal` cell with no
    /// destination (cell 100 yields `finish`). The turn engine never asks for a
    /// number outside the board because overshooting moves are discarded first.
    pub fn lookup_cell(&self, number: u32) -> Cell {
        self.cells
            .get(&number)
            .copied()
            .unwrap_or_else(|| Cell::synthetic(number))
    }

    /// Configured cell only, like the board service.
    pub fn cell_by_number(&self, number: u32) -> Option<Cell> {
        self.cells.get(&number).copied()
    }

    /// All 100 cells in ascending order, synthetic ones filled in.
    pub fn all_cells(&self) -> Vec<Cell> {
        rule_helper::cell_numbers()
            .map(|number| self.lookup_cell(number))
            .collect()
    }

    pub fn snakes_and_ladders(&self) -> Vec<Cell> {
        self.cells
            .values()
            .filter(|cell| cell.connects_to.is_some())
            .copied()
            .collect()
    }

    pub fn count_of(&self, cell_type: CellType) -> usize {
        self.cells
            .values()
            .filter(|cell| cell.cell_type == cell_type)
            .count()
    }

    /// Cell numbers as drawn on the board, top row first.
    ///
    /// Row 1 (cells 1..=10) runs left to right, row 2 right to left, and so on.
    pub fn grid_rows() -> Vec<Vec<u32>> {
        let width = rule_helper::BOARD_WIDTH;
        let num_rows = rule_helper::FINISH_CELL / width;

        (0..num_rows)
            .rev()
            .map(|row| {
                let row_cells = (0..width).map(|col| row * width + col + 1);
                if row % 2 == 0 {
                    row_cells.collect::<Vec<_>>()
                } else {
                    row_cells.rev().collect::<Vec<_>>()
                }
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Error)]
pub enum BoardLoadError {
    #[error("failed to read board file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse board json")]
    Json(#[from] serde_json::Error),
    #[error("invalid board: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
