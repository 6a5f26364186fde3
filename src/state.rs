use crate::storage::HabitStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HabitStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self { store }
    }
}
