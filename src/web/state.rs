use std::sync::Arc;

use crate::query::QueryEngine;
use crate::refresh::Refresher;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
    pub refresher: Arc<Refresher>,
}
