/// egui rendering of the application state and view model.
pub mod panels;
pub mod plot;
pub mod table;
