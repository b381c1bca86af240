/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone は安い (中身は Arc)
 */
use std::sync::Arc;

use crate::services::{gatekeeper::Gatekeeper, upstream::UpstreamClient};

#[derive(Clone, Debug)]
pub struct AppState {
    pub gatekeeper: Gatekeeper,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(gatekeeper: Gatekeeper, upstream: Arc<UpstreamClient>) -> Self {
        Self {
            gatekeeper,
            upstream,
        }
    }
}
