//! In-memory stand-ins for the game backend.
//!
//! Each service owns its data outright and sleeps for a configured latency
//! before answering, so callers see the same asynchronous shape a network
//! backend would give them. Services can be taken offline to exercise the
//! retry path of their callers.

mod board_service;
mod error;
mod game_service;
mod player_service;

pub use board_service::BoardService;
pub use error::ServiceError;
pub use game_service::GameService;
pub use player_service::PlayerService;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Online/offline switch shared by the services.
#[derive(Debug)]
struct Availability {
    service: &'static str,
    online: AtomicBool,
}

impl Availability {
    fn new(service: &'static str) -> Self {
        Self {
            service,
            online: AtomicBool::new(true),
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::Unavailable {
                service: self.service,
            })
        }
    }
}
