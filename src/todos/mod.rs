//! Todo list: model, operations, HTTP routes and the list view.

pub mod actions;
pub mod model;
pub mod routes;
pub mod view;

pub use model::{TodoId, TodoItem};
pub use routes::todo_routes;
