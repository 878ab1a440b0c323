use super::{Availability, ServiceError, simulate_latency};
use crate::config::ServiceLatency;
use crate::core::{board::Board, cell::Cell};
use std::sync::Arc;
use tracing::debug;

pub struct BoardService {
    board: Arc<Board>,
    latency: ServiceLatency,
    availability: Availability,
}

impl BoardService {
    pub fn new(board: Arc<Board>, latency: ServiceLatency) -> Self {
        Self {
            board,
            latency,
            availability: Availability::new("board"),
        }
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set_online(online);
    }

    /// Configured cells in ascending order.
    pub async fn get_all(&self) -> Result<Vec<Cell>, ServiceError> {
        simulate_latency(self.latency.board_list()).await;
        self.availability.check()?;
        Ok(self.board.cells.values().copied().collect())
    }

    pub async fn get_cell_by_number(&self, number: u32) -> Result<Option<Cell>, ServiceError> {
        simulate_latency(self.latency.cell_lookup()).await;
        self.availability.check()?;
        let cell = self.board.cell_by_number(number);
        debug!(number, ?cell, "cell lookup");
        Ok(cell)
    }

    pub async fn get_snakes_and_ladders(&self) -> Result<Vec<Cell>, ServiceError> {
        simulate_latency(self.latency.board_list()).await;
        self.availability.check()?;
        Ok(self.board.snakes_and_ladders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> BoardService {
        let board = Board::new("test", [Cell::snake(17, 4), Cell::finish(100)]);
        BoardService::new(Arc::new(board), ServiceLatency::none())
    }

    #[tokio::test]
    async fn lookups_only_return_configured_cells() {
        let service = service();
        assert_eq!(service.get_all().await.unwrap().len(), 2);
        assert_eq!(
            service.get_cell_by_number(17).await.unwrap(),
            Some(Cell::snake(17, 4))
        );
        assert_eq!(service.get_cell_by_number(18).await.unwrap(), None);
        assert_eq!(
            service.get_snakes_and_ladders().await.unwrap(),
            vec![Cell::snake(17, 4)]
        );
    }

    #[tokio::test]
    async fn offline_service_fails_retryably() {
        let service = service();
        service.set_online(false);
        let err = service.get_all().await.unwrap_err();
        assert!(err.is_retryable());

        service.set_online(true);
        assert!(service.get_all().await.is_ok());
    }
}
