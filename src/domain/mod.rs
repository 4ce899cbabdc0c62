pub mod field;
pub mod format;
pub mod heuristic;
pub mod record;
pub mod tags;
pub mod template;
pub mod track;
