use super::{Availability, ServiceError, simulate_latency};
use crate::config::ServiceLatency;
use crate::core::player::{Player, PlayerId, PlayerUpdate};
use tokio::sync::Mutex;
use tracing::info;

/// Roster of players that new games are started from.
pub struct PlayerService {
    roster: Mutex<Roster>,
    latency: ServiceLatency,
    availability: Availability,
}

struct Roster {
    players: Vec<Player>,
    next_id: u32,
}

impl PlayerService {
    pub fn new(players: Vec<Player>, latency: ServiceLatency) -> Self {
        let next_id = players
            .iter()
            .map(|player| player.id.0 + 1)
            .max()
            .unwrap_or(0);

        Self {
            roster: Mutex::new(Roster { players, next_id }),
            latency,
            availability: Availability::new("player"),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set_online(online);
    }

    pub async fn get_all(&self) -> Result<Vec<Player>, ServiceError> {
        simulate_latency(self.latency.player_read()).await;
        self.availability.check()?;
        Ok(self.roster.lock().await.players.clone())
    }

    pub async fn get_by_id(&self, id: PlayerId) -> Result<Option<Player>, ServiceError> {
        simulate_latency(self.latency.player_read()).await;
        self.availability.check()?;
        let roster = self.roster.lock().await;
        Ok(roster.players.iter().find(|player| player.id == id).cloned())
    }

    /// Adds `player` under a fresh id; the id it carries is ignored.
    pub async fn create(&self, player: Player) -> Result<Player, ServiceError> {
        simulate_latency(self.latency.player_write()).await;
        self.availability.check()?;
        let mut roster = self.roster.lock().await;
        let created = player.with_id(PlayerId(roster.next_id));
        roster.next_id += 1;
        roster.players.push(created.clone());
        info!(id = %created.id, name = %created.name, is_ai = created.is_ai, "player created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: PlayerId,
        update: PlayerUpdate,
    ) -> Result<Option<Player>, ServiceError> {
        simulate_latency(self.latency.player_write()).await;
        self.availability.check()?;
        let mut roster = self.roster.lock().await;
        let Some(player) = roster.players.iter_mut().find(|player| player.id == id) else {
            return Ok(None);
        };
        *player = update.apply_to(player);
        Ok(Some(player.clone()))
    }

    pub async fn delete(&self, id: PlayerId) -> Result<Option<Player>, ServiceError> {
        simulate_latency(self.latency.player_read()).await;
        self.availability.check()?;
        let mut roster = self.roster.lock().await;
        let Some(idx) = roster.players.iter().position(|player| player.id == id) else {
            return Ok(None);
        };
        let deleted = roster.players.remove(idx);
        info!(id = %deleted.id, name = %deleted.name, "player deleted");
        Ok(Some(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::default_roster;

    fn service() -> PlayerService {
        PlayerService::new(default_roster(), ServiceLatency::none())
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let service = service();
        let created = service
            .create(Player::ai(PlayerId(0), "Dot", "#FFE66D"))
            .await
            .unwrap();

        assert_eq!(created.id, PlayerId(2));
        assert_eq!(service.get_all().await.unwrap().len(), 3);
        assert_eq!(service.get_by_id(PlayerId(2)).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_players() {
        let service = service();
        let update = PlayerUpdate {
            name: Some("Ann".to_string()),
            ..PlayerUpdate::default()
        };

        let updated = service.update(PlayerId(0), update.clone()).await.unwrap();
        assert_eq!(updated.map(|player| player.name), Some("Ann".to_string()));
        assert_eq!(service.update(PlayerId(9), update).await.unwrap(), None);

        let deleted = service.delete(PlayerId(1)).await.unwrap();
        assert_eq!(deleted.map(|player| player.id), Some(PlayerId(1)));
        assert_eq!(service.delete(PlayerId(1)).await.unwrap(), None);
        assert_eq!(service.get_all().await.unwrap().len(), 1);
    }
}
